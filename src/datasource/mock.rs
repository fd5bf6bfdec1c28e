//! Mock data source for testing without network calls.

use super::{DataSourceError, WalletDataSource};
use crate::domain::{AccountSnapshot, Address, FundingEvent, TimeMs, TradeFill};
use async_trait::async_trait;

/// Mock data source that returns predefined test data.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    snapshot: AccountSnapshot,
    fills: Vec<TradeFill>,
    funding: Vec<FundingEvent>,
    user_state_error: Option<DataSourceError>,
}

impl MockDataSource {
    /// Create a new mock data source with empty data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the account snapshot returned by fetch_user_state.
    pub fn with_snapshot(mut self, snapshot: AccountSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Add a fill to the mock data source.
    pub fn with_fill(mut self, fill: TradeFill) -> Self {
        self.fills.push(fill);
        self
    }

    /// Add multiple fills to the mock data source.
    pub fn with_fills(mut self, fills: Vec<TradeFill>) -> Self {
        self.fills.extend(fills);
        self
    }

    /// Add a funding event to the mock data source.
    pub fn with_funding_event(mut self, event: FundingEvent) -> Self {
        self.funding.push(event);
        self
    }

    /// Make fetch_user_state fail with the given error.
    pub fn with_user_state_error(mut self, error: DataSourceError) -> Self {
        self.user_state_error = Some(error);
        self
    }
}

#[async_trait]
impl WalletDataSource for MockDataSource {
    async fn fetch_user_state(&self, _user: &Address) -> Result<AccountSnapshot, DataSourceError> {
        match &self.user_state_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.snapshot.clone()),
        }
    }

    async fn fetch_fills(
        &self,
        _user: &Address,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<Vec<TradeFill>, DataSourceError> {
        Ok(self
            .fills
            .iter()
            .filter(|f| f.time_ms >= from_ms && f.time_ms <= to_ms)
            .cloned()
            .collect())
    }

    async fn fetch_funding(
        &self,
        _user: &Address,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<Vec<FundingEvent>, DataSourceError> {
        Ok(self
            .funding
            .iter()
            .filter(|f| f.time_ms >= from_ms && f.time_ms <= to_ms)
            .cloned()
            .collect())
    }
}
