//! Token market data and AI-generated sentiment insight.

pub mod ai;
pub mod coingecko;

pub use ai::{Insight, InsightError, InsightGenerator, Sentiment};
pub use coingecko::{CoinGeckoClient, TokenData, TokenHistory, TokenMarketData};
