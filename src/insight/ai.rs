//! Groq chat-completion client and insight interpretation.
//!
//! Small models do not reliably honor the JSON response format, so the
//! content goes through a parsing ladder: whole-content JSON, then the first
//! embedded `{...}` span, then a keyword scan over the plain text.

use crate::insight::coingecko::TokenData;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Default Groq model for insight generation.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

const MAX_REASONING_CHARS: usize = 500;

/// Market sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parse an explicit label, case-insensitively.
    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    /// Best-effort classification of free-form text.
    fn scan_text(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("positive") || lower.contains("bullish") {
            Some(Sentiment::Positive)
        } else if lower.contains("negative") || lower.contains("bearish") {
            Some(Sentiment::Negative)
        } else {
            None
        }
    }
}

/// Which provider/model produced an insight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub provider: String,
    pub model: String,
}

/// An AI-generated token insight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub reasoning: String,
    pub sentiment: Sentiment,
    pub model: ModelInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("AI API key is not configured; set GROQ_API_KEY")]
    MissingApiKey,
    #[error("AI API error: {0}")]
    Api(String),
    #[error("empty response from AI model")]
    EmptyResponse,
}

/// Groq-backed insight generator.
#[derive(Debug, Clone)]
pub struct InsightGenerator {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl InsightGenerator {
    /// Create a generator. A missing API key makes `generate` fail fast,
    /// which the handler converts into a fallback insight.
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    /// Generate a sentiment insight for the given token.
    pub async fn generate(&self, token: &TokenData) -> Result<Insight, InsightError> {
        let api_key = self.api_key.as_deref().ok_or(InsightError::MissingApiKey)?;
        let prompt = build_prompt(token);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": 200,
            "temperature": 0.7,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InsightError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InsightError::Api(format!("{} - {}", status, detail)));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| InsightError::Api(e.to_string()))?;
        let content = value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or("");
        if content.trim().is_empty() {
            return Err(InsightError::EmptyResponse);
        }

        debug!(model = %self.model, "interpreting AI content");
        Ok(self.interpret(content))
    }

    /// Turn raw model content into an Insight via the parsing ladder.
    fn interpret(&self, content: &str) -> Insight {
        let mut sentiment = Sentiment::Neutral;
        let mut reasoning = String::from("Market analysis based on available data");

        if let Some(parsed) = extract_json(content) {
            if let Some(label) = parsed.get("sentiment").and_then(Value::as_str) {
                if let Some(s) = Sentiment::from_label(label) {
                    sentiment = s;
                }
            }
            if let Some(r) = parsed.get("reasoning").and_then(Value::as_str) {
                reasoning = r.to_string();
            }
        } else {
            if let Some(s) = Sentiment::scan_text(content) {
                sentiment = s;
            }
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                reasoning = trimmed.chars().take(MAX_REASONING_CHARS).collect();
            }
        }

        Insight {
            reasoning,
            sentiment,
            model: ModelInfo {
                provider: "groq".to_string(),
                model: self.model.clone(),
            },
            error: None,
        }
    }

    /// Neutral insight carrying the failure reason, used when generation
    /// fails so the token endpoint still responds.
    pub fn fallback(&self, error: &str) -> Insight {
        Insight {
            reasoning: format!("Unable to generate AI insight: {}", error),
            sentiment: Sentiment::Neutral,
            model: ModelInfo {
                provider: "groq".to_string(),
                model: "error".to_string(),
            },
            error: Some(error.to_string()),
        }
    }
}

/// Compose the analyst prompt from token market data.
pub fn build_prompt(token: &TokenData) -> String {
    let market = &token.market_data;
    let mut prompt = format!(
        "You are a cryptocurrency market analyst. Analyze this token and provide insights in JSON format.\n\n\
         Token: {} ({})\n\
         Current Price (USD): ${}\n\
         Market Cap (USD): ${}\n\
         24h Volume: ${}\n\
         24h Change: {}%\n",
        token.name,
        token.symbol.to_uppercase(),
        fmt_stat(market.current_price_usd),
        fmt_stat(market.market_cap_usd),
        fmt_stat(market.total_volume_usd),
        fmt_stat(market.price_change_percentage_24h),
    );
    if let Some(change) = market.price_change_percentage_7d {
        prompt.push_str(&format!("7d Change: {}%\n", change));
    }
    if let Some(change) = market.price_change_percentage_30d {
        prompt.push_str(&format!("30d Change: {}%\n", change));
    }
    prompt.push_str(
        "\nProvide a brief analysis (2-3 sentences) in the \"reasoning\" field and a sentiment \
         (\"Positive\", \"Negative\", or \"Neutral\") in the \"sentiment\" field.\n\n\
         Respond with valid JSON only:\n\
         {\n  \"reasoning\": \"Your analysis here\",\n  \"sentiment\": \"Positive|Negative|Neutral\"\n}",
    );
    prompt
}

fn fmt_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

/// Parse the whole content as JSON, or the first `{...}` span inside it.
fn extract_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if value.is_object() {
            return Some(value);
        }
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
