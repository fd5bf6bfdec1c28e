//! Hyperliquid info-API client and raw payload decoding.
//!
//! The decode functions own every loose-shape quirk of the upstream
//! payloads (numeric strings, optional sections, competing funding fields),
//! so normalized domain types leave this module.

use super::{DataSourceError, WalletDataSource};
use crate::domain::{
    AccountSnapshot, Address, Decimal, FundingEvent, PositionPnl, TimeMs, TradeFill,
};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Upstream page size; a short page means the window is exhausted.
const PAGE_LIMIT: usize = 2000;

/// Hyperliquid data source using the public Info API.
#[derive(Debug, Clone)]
pub struct HyperliquidDataSource {
    client: Client,
    base_url: String,
}

impl HyperliquidDataSource {
    /// Create a new Hyperliquid data source.
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post_info(&self, payload: Value) -> Result<Value, DataSourceError> {
        let url = format!("{}/info", self.base_url);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(DataSourceError::Network(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status == 404 {
                return Err(backoff::Error::permanent(DataSourceError::NotFound(
                    "resource not found upstream".to_string(),
                )));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::Http {
                    status: status.as_u16(),
                    message: "server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::Http {
                    status: status.as_u16(),
                    message: "client error".to_string(),
                }));
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::Parse(e.to_string())))
        })
        .await
    }

    /// Page through a time-windowed info request, advancing the cursor past
    /// the last returned event until a short page ends the window.
    async fn fetch_events(
        &self,
        request_type: &str,
        user: &Address,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<Vec<Value>, DataSourceError> {
        let mut events = Vec::new();
        let mut cursor = from_ms.as_i64();

        while cursor <= to_ms.as_i64() {
            let payload = serde_json::json!({
                "type": request_type,
                "user": user.as_str(),
                "startTime": cursor,
                "endTime": to_ms.as_i64(),
            });

            let response = self.post_info(payload).await?;
            let page = response
                .as_array()
                .cloned()
                .ok_or_else(|| DataSourceError::Parse("expected array response".to_string()))?;

            if page.is_empty() {
                break;
            }

            let page_len = page.len();
            let last_time = page
                .last()
                .and_then(|v| v.get("time"))
                .and_then(Value::as_i64);
            events.extend(page);

            if page_len < PAGE_LIMIT {
                break;
            }
            match last_time {
                Some(t) => cursor = t + 1,
                None => break,
            }
        }

        Ok(events)
    }
}

#[async_trait]
impl WalletDataSource for HyperliquidDataSource {
    async fn fetch_user_state(&self, user: &Address) -> Result<AccountSnapshot, DataSourceError> {
        debug!(user = %user, "fetching clearinghouse state");

        let payload = serde_json::json!({
            "type": "clearinghouseState",
            "user": user.as_str(),
        });
        let response = self.post_info(payload).await?;

        // Some gateways nest the body under "data".
        let body = response.get("data").cloned().unwrap_or(response);
        Ok(parse_snapshot(&body))
    }

    async fn fetch_fills(
        &self,
        user: &Address,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<Vec<TradeFill>, DataSourceError> {
        debug!(user = %user, from_ms = from_ms.as_i64(), to_ms = to_ms.as_i64(), "fetching fills");

        let raw = self
            .fetch_events("userFillsByTime", user, from_ms, to_ms)
            .await?;
        let fills: Vec<TradeFill> = raw.iter().filter_map(parse_fill).collect();
        if fills.len() < raw.len() {
            warn!(dropped = raw.len() - fills.len(), "dropped fills without a time field");
        }
        debug!(count = fills.len(), "fetched fills");
        Ok(fills)
    }

    async fn fetch_funding(
        &self,
        user: &Address,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<Vec<FundingEvent>, DataSourceError> {
        debug!(user = %user, from_ms = from_ms.as_i64(), to_ms = to_ms.as_i64(), "fetching funding");

        let raw = self.fetch_events("userFunding", user, from_ms, to_ms).await?;
        let funding: Vec<FundingEvent> = raw.iter().filter_map(parse_funding).collect();
        debug!(count = funding.len(), "fetched funding events");
        Ok(funding)
    }
}

/// Decode one raw fill. Events without a `time` field are discarded.
fn parse_fill(raw: &Value) -> Option<TradeFill> {
    let time_ms = raw.get("time").and_then(Value::as_i64)?;
    Some(TradeFill {
        time_ms: TimeMs::new(time_ms),
        closed_pnl: money_field(raw, "closedPnl"),
        fee: money_field(raw, "fee"),
        builder_fee: money_field(raw, "builderFee"),
    })
}

/// Decode one raw funding event. Events without a `time` field are discarded.
fn parse_funding(raw: &Value) -> Option<FundingEvent> {
    let time_ms = raw.get("time").and_then(Value::as_i64)?;
    Some(FundingEvent {
        time_ms: TimeMs::new(time_ms),
        amount: funding_amount(raw),
    })
}

/// Resolve the signed funding amount from a heterogeneous event shape.
///
/// First present field wins: `usdc`, `delta.usdc`, `delta.funding`,
/// `funding`, `fundingPayment`, `amount`, `fundingAmount`, `fundingFee`.
/// Absence of all of them yields zero.
fn funding_amount(raw: &Value) -> Decimal {
    if let Some(v) = raw.get("usdc") {
        return Decimal::from_json_lossy(v);
    }
    if let Some(delta) = raw.get("delta") {
        if let Some(v) = delta.get("usdc") {
            return Decimal::from_json_lossy(v);
        }
        if let Some(v) = delta.get("funding") {
            return Decimal::from_json_lossy(v);
        }
    }
    for field in ["funding", "fundingPayment", "amount", "fundingAmount", "fundingFee"] {
        if let Some(v) = raw.get(field) {
            return Decimal::from_json_lossy(v);
        }
    }
    Decimal::zero()
}

/// Decode a clearinghouse snapshot. Missing sections degrade to zero/empty.
fn parse_snapshot(raw: &Value) -> AccountSnapshot {
    let account_value = raw
        .pointer("/marginSummary/accountValue")
        .map(Decimal::from_json_lossy)
        .unwrap_or_default();

    let positions = raw
        .get("assetPositions")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.pointer("/position/unrealizedPnl"))
                .map(|v| PositionPnl {
                    unrealized_pnl: Decimal::from_json_lossy(v),
                })
                .collect()
        })
        .unwrap_or_default();

    AccountSnapshot {
        account_value,
        positions,
    }
}

fn money_field(raw: &Value, field: &str) -> Decimal {
    raw.get(field).map(Decimal::from_json_lossy).unwrap_or_default()
}
