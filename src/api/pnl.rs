use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::AppState;
use crate::domain::{Address, DateKey};
use crate::engine::{compute_daily_pnl, DailyBucket, PnlSummary};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct PnlQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PnlResponse {
    pub wallet: String,
    pub start: DateKey,
    pub end: DateKey,
    pub daily: Vec<DailyBucket>,
    pub summary: PnlSummary,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub data_source: &'static str,
    pub last_api_call: DateTime<Utc>,
    pub data_available: DataAvailability,
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct DataAvailability {
    pub positions: bool,
    pub trades: bool,
    pub funding: bool,
}

pub async fn get_wallet_pnl(
    Path(wallet): Path<String>,
    Query(params): Query<PnlQuery>,
    State(state): State<AppState>,
) -> Result<Json<PnlResponse>, AppError> {
    let address = Address::parse(&wallet).map_err(|_| {
        AppError::BadRequest(
            "Wallet address must be a valid Ethereum address (0x...)".to_string(),
        )
    })?;

    let (Some(start_raw), Some(end_raw)) = (params.start, params.end) else {
        return Err(AppError::BadRequest(
            "Please provide both start and end dates as query parameters \
             (start=YYYY-MM-DD&end=YYYY-MM-DD)"
                .to_string(),
        ));
    };
    let start = DateKey::parse(&start_raw)
        .map_err(|_| AppError::BadRequest("Dates must be in YYYY-MM-DD format".to_string()))?;
    let end = DateKey::parse(&end_raw)
        .map_err(|_| AppError::BadRequest("Dates must be in YYYY-MM-DD format".to_string()))?;

    if start > end {
        return Err(AppError::BadRequest(
            "Start date must be before or equal to end date".to_string(),
        ));
    }
    let span_days = start.days_through(end) - 1;
    if span_days > state.config.max_range_days {
        return Err(AppError::BadRequest(format!(
            "Date range cannot exceed {} days",
            state.config.max_range_days
        )));
    }

    let data = state
        .wallet_source
        .fetch_wallet_data(&address, start, end)
        .await?;

    info!(
        wallet = %address,
        trades = data.trades.len(),
        funding = data.funding.len(),
        positions = data.user_state.positions.len(),
        "wallet data fetched"
    );

    let as_of = DateKey::today_utc();
    let report = compute_daily_pnl(&data, start, end, as_of)?;

    let has_positions = !data.user_state.positions.is_empty();
    let has_trades = !data.trades.is_empty();
    let has_funding = !data.funding.is_empty();

    let mut notes = String::from(
        "Equity reconstructed from net PnL deltas anchored on the current account value; \
         external deposits and withdrawals are not modeled.",
    );
    if !has_trades {
        notes.push_str(
            " Note: Trade history not available - realized PnL may be incomplete.",
        );
    }
    if !has_funding {
        notes.push_str(" Funding data not available for this wallet.");
    }

    Ok(Json(PnlResponse {
        wallet: address.to_string(),
        start,
        end,
        daily: report.daily,
        summary: report.summary,
        diagnostics: Diagnostics {
            data_source: "hyperliquid_api",
            last_api_call: data.fetched_at,
            data_available: DataAvailability {
                positions: has_positions,
                trades: has_trades,
                funding: has_funding,
            },
            notes,
        },
    }))
}
