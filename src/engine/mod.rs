//! Pure computation engine for the daily PnL ledger.
//!
//! The engine is synchronous, performs no I/O, and holds no shared state.
//! All inputs must be fully materialized before it runs; the processing date
//! is the explicit `as_of` parameter so one call is deterministic end to end.

pub mod equity;
pub mod ledger;

pub use equity::reconstruct_equity;
pub use ledger::{compute_daily_pnl, DailyBucket, LedgerError, PnlReport, PnlSummary};
