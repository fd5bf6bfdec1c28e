//! Domain types for the wallet-analytics service.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: TimeMs, Address, DateKey
//! - Normalized wallet data types (fills, funding, account snapshot)

pub mod decimal;
pub mod primitives;
pub mod wallet;

pub use decimal::Decimal;
pub use primitives::{Address, AddressParseError, DateKey, TimeMs};
pub use wallet::{AccountSnapshot, FundingEvent, PositionPnl, TradeFill, WalletData};
