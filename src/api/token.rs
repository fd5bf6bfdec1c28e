use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::AppState;
use crate::error::AppError;
use crate::insight::{Insight, TokenData};

#[derive(Debug, Default, Deserialize)]
pub struct InsightRequest {
    pub vs_currency: Option<String>,
    pub history_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub source: &'static str,
    pub token: TokenData,
    pub insight: Insight,
}

pub async fn get_token_insight(
    Path(token_id): Path<String>,
    State(state): State<AppState>,
    body: Option<Json<InsightRequest>>,
) -> Result<Json<InsightResponse>, AppError> {
    let token_id = token_id.trim().to_lowercase();
    if token_id.is_empty() {
        return Err(AppError::BadRequest("Token ID is required".to_string()));
    }

    let request = body.map(|Json(b)| b).unwrap_or_default();
    let vs_currency = request
        .vs_currency
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("usd")
        .to_lowercase();
    let history_days = request.history_days.unwrap_or(30);

    let token = state
        .token_client
        .fetch_token(&token_id, &vs_currency, Some(history_days))
        .await?;

    // AI failures degrade to a fallback insight; the market data is still
    // worth returning.
    let insight = match state.insight_generator.generate(&token).await {
        Ok(insight) => insight,
        Err(e) => {
            warn!(token_id = %token.id, error = %e, "insight generation failed");
            state.insight_generator.fallback(&e.to_string())
        }
    };

    Ok(Json(InsightResponse {
        source: "coingecko",
        token,
        insight,
    }))
}
