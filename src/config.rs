use std::collections::HashMap;
use thiserror::Error;

use crate::insight::ai::DEFAULT_MODEL;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub hyperliquid_api_url: String,
    pub coingecko_api_url: String,
    pub groq_api_url: String,
    /// Optional; when absent, token insight degrades to a fallback message.
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    /// Maximum PnL date-range span in days (end minus start).
    pub max_range_days: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let hyperliquid_api_url = env_map
            .get("HYPERLIQUID_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.hyperliquid.xyz".to_string());

        let coingecko_api_url = env_map
            .get("COINGECKO_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.coingecko.com/api/v3".to_string());

        let groq_api_url = env_map
            .get("GROQ_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.groq.com/openai/v1/chat/completions".to_string());

        let groq_api_key = env_map
            .get("GROQ_API_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let groq_model = env_map
            .get("GROQ_MODEL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_range_days = env_map
            .get("MAX_RANGE_DAYS")
            .map(|s| s.as_str())
            .unwrap_or("365")
            .parse::<i64>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MAX_RANGE_DAYS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Config {
            port,
            hyperliquid_api_url,
            coingecko_api_url,
            groq_api_url,
            groq_api_key,
            groq_model,
            max_range_days,
        })
    }
}
