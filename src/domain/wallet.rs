//! Normalized wallet data types consumed by the PnL engine.
//!
//! The raw Hyperliquid payloads are loosely shaped (numeric strings, optional
//! sections, several competing funding-amount fields). The datasource decode
//! step normalizes them into these types so the engine only ever sees a
//! well-typed `WalletData`.

use crate::domain::{Decimal, TimeMs};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single executed trade, reduced to the fields the ledger needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFill {
    /// Time of the fill in milliseconds since Unix epoch.
    pub time_ms: TimeMs,
    /// Realized PnL locked in by this fill.
    pub closed_pnl: Decimal,
    /// Trading fee for this fill (sign as reported upstream).
    pub fee: Decimal,
    /// Builder fee, zero when not charged.
    pub builder_fee: Decimal,
}

/// A periodic funding payment, signed (positive = received).
///
/// The signed amount is resolved from the upstream field-priority cascade at
/// decode time; see `datasource::hyperliquid::funding_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingEvent {
    /// Time of the payment in milliseconds since Unix epoch.
    pub time_ms: TimeMs,
    /// Signed net funding amount in the quote currency.
    pub amount: Decimal,
}

/// Mark-to-market PnL of one open position at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionPnl {
    pub unrealized_pnl: Decimal,
}

/// Point-in-time account state from the clearinghouse snapshot.
///
/// Missing upstream sections decode to zero/empty rather than erroring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Current total account value; zero when the snapshot had none.
    pub account_value: Decimal,
    /// Open positions carrying unrealized PnL.
    pub positions: Vec<PositionPnl>,
}

impl AccountSnapshot {
    /// Sum of unrealized PnL across all open positions.
    pub fn total_unrealized_pnl(&self) -> Decimal {
        self.positions
            .iter()
            .fold(Decimal::zero(), |acc, p| acc + p.unrealized_pnl)
    }
}

/// Everything the engine needs for one wallet, fully materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletData {
    pub user_state: AccountSnapshot,
    pub trades: Vec<TradeFill>,
    pub funding: Vec<FundingEvent>,
    /// When the upstream fetch completed; echoed in response diagnostics.
    pub fetched_at: DateTime<Utc>,
}

impl WalletData {
    /// Wallet data with no activity, useful as a test fixture.
    pub fn empty() -> Self {
        WalletData {
            user_state: AccountSnapshot::default(),
            trades: Vec::new(),
            funding: Vec::new(),
            fetched_at: Utc::now(),
        }
    }
}
