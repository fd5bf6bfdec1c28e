//! CoinGecko market-data client.

use crate::datasource::DataSourceError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// How many trailing price points to keep from a market chart.
const HISTORY_POINTS: usize = 10;

/// Token metadata and market stats shaped for display and prompting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenData {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_data: TokenMarketData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_data: Option<TokenHistory>,
}

/// Market stats in the requested quote currency. Fields the upstream
/// response lacks stay None and render as "N/A" downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenMarketData {
    pub current_price_usd: Option<f64>,
    pub market_cap_usd: Option<f64>,
    pub total_volume_usd: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d: Option<f64>,
    pub price_change_percentage_30d: Option<f64>,
}

/// Trailing slice of a price history chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHistory {
    /// (epoch-millis, price) pairs, most recent last.
    pub prices: Vec<(f64, f64)>,
    pub total_days: u32,
}

#[derive(Debug, Deserialize)]
struct RawCoin {
    id: String,
    symbol: String,
    name: String,
    market_data: Option<RawMarketData>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMarketData {
    #[serde(default)]
    current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    market_cap: HashMap<String, Option<f64>>,
    #[serde(default)]
    total_volume: HashMap<String, Option<f64>>,
    price_change_percentage_24h: Option<f64>,
    price_change_percentage_7d: Option<f64>,
    price_change_percentage_30d: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawChart {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

/// CoinGecko REST client.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    /// Create a new client against the given API base URL.
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Fetch market data for a token, plus an optional trailing price
    /// history. History failures are non-fatal; unknown tokens are NotFound.
    pub async fn fetch_token(
        &self,
        token_id: &str,
        vs_currency: &str,
        history_days: Option<u32>,
    ) -> Result<TokenData, DataSourceError> {
        debug!(token_id, vs_currency, "fetching token data");

        let url = format!("{}/coins/{}", self.base_url, token_id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
                ("sparkline", "false"),
            ])
            .send()
            .await
            .map_err(|e| DataSourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Err(DataSourceError::NotFound(format!(
                "Token '{}' not found on CoinGecko",
                token_id
            )));
        }
        if !status.is_success() {
            return Err(DataSourceError::Http {
                status: status.as_u16(),
                message: "CoinGecko request failed".to_string(),
            });
        }

        let raw: RawCoin = response
            .json()
            .await
            .map_err(|e| DataSourceError::Parse(e.to_string()))?;

        let market = raw.market_data.unwrap_or_default();
        let market_data = TokenMarketData {
            current_price_usd: flat_lookup(&market.current_price, vs_currency),
            market_cap_usd: flat_lookup(&market.market_cap, vs_currency),
            total_volume_usd: flat_lookup(&market.total_volume, vs_currency),
            price_change_percentage_24h: market.price_change_percentage_24h,
            price_change_percentage_7d: market.price_change_percentage_7d,
            price_change_percentage_30d: market.price_change_percentage_30d,
        };

        let historical_data = match history_days {
            Some(days) => self.fetch_history(token_id, vs_currency, days).await,
            None => None,
        };

        Ok(TokenData {
            id: raw.id,
            symbol: raw.symbol,
            name: raw.name,
            market_data,
            historical_data,
        })
    }

    async fn fetch_history(
        &self,
        token_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Option<TokenHistory> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, token_id);
        let result = self
            .client
            .get(&url)
            .query(&[("vs_currency", vs_currency), ("days", &days.to_string())])
            .send()
            .await;

        let response = match result {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(token_id, status = %r.status(), "history request failed");
                return None;
            }
            Err(e) => {
                warn!(token_id, error = %e, "history request failed");
                return None;
            }
        };

        match response.json::<RawChart>().await {
            Ok(chart) => {
                let skip = chart.prices.len().saturating_sub(HISTORY_POINTS);
                Some(TokenHistory {
                    prices: chart.prices.into_iter().skip(skip).collect(),
                    total_days: days,
                })
            }
            Err(e) => {
                warn!(token_id, error = %e, "could not decode history chart");
                None
            }
        }
    }
}

fn flat_lookup(map: &HashMap<String, Option<f64>>, key: &str) -> Option<f64> {
    map.get(key).copied().flatten()
}
