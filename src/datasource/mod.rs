//! Data source abstraction for fetching wallet state, fills, and funding.

use crate::domain::{AccountSnapshot, Address, DateKey, FundingEvent, TimeMs, TradeFill, WalletData};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tracing::warn;

pub mod hyperliquid;
pub mod mock;

pub use hyperliquid::HyperliquidDataSource;
pub use mock::MockDataSource;

/// Error type for data source operations.
#[derive(Debug, Clone, Error)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    #[error("network error: {0}")]
    Network(String),
    /// HTTP error (e.g., 5xx server error)
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    #[error("parse error: {0}")]
    Parse(String),
    /// Rate limit exceeded
    #[error("rate limited")]
    RateLimited,
    /// Requested resource does not exist upstream
    #[error("not found: {0}")]
    NotFound(String),
}

/// Data source for a wallet's account snapshot, trade fills, and funding
/// events.
///
/// Implementations must handle pagination, retry/backoff, and rate limiting.
#[async_trait]
pub trait WalletDataSource: Send + Sync + fmt::Debug {
    /// Fetch the point-in-time account snapshot for a wallet.
    async fn fetch_user_state(&self, user: &Address) -> Result<AccountSnapshot, DataSourceError>;

    /// Fetch trade fills within `[from_ms, to_ms]` inclusive.
    async fn fetch_fills(
        &self,
        user: &Address,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<Vec<TradeFill>, DataSourceError>;

    /// Fetch funding events within `[from_ms, to_ms]` inclusive.
    async fn fetch_funding(
        &self,
        user: &Address,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<Vec<FundingEvent>, DataSourceError>;

    /// Fetch everything the engine needs for one request, concurrently.
    ///
    /// The account snapshot is required and its failure propagates. Fills and
    /// funding degrade to empty collections; their absence is reported via
    /// response diagnostics rather than failing the request.
    async fn fetch_wallet_data(
        &self,
        user: &Address,
        start: DateKey,
        end: DateKey,
    ) -> Result<WalletData, DataSourceError> {
        let from_ms = start.start_of_day_ms();
        let to_ms = end.end_of_day_ms();

        let (user_state, trades, funding) = futures::join!(
            self.fetch_user_state(user),
            self.fetch_fills(user, from_ms, to_ms),
            self.fetch_funding(user, from_ms, to_ms),
        );

        let user_state = user_state?;
        let trades = trades.unwrap_or_else(|e| {
            warn!(user = %user, error = %e, "could not fetch fills, continuing without them");
            Vec::new()
        });
        let funding = funding.unwrap_or_else(|e| {
            warn!(user = %user, error = %e, "could not fetch funding, continuing without it");
            Vec::new()
        });

        Ok(WalletData {
            user_state,
            trades,
            funding,
            fetched_at: chrono::Utc::now(),
        })
    }
}
