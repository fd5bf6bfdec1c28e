pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod insight;

pub use config::Config;
pub use datasource::{
    DataSourceError, HyperliquidDataSource, MockDataSource, WalletDataSource,
};
pub use domain::{
    AccountSnapshot, Address, DateKey, Decimal, FundingEvent, PositionPnl, TimeMs, TradeFill,
    WalletData,
};
pub use engine::{compute_daily_pnl, DailyBucket, LedgerError, PnlReport, PnlSummary};
pub use error::AppError;
