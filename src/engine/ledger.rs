//! Daily PnL ledger: bucket construction, event reconciliation, and the
//! summary reduction.

use crate::domain::{DateKey, Decimal, FundingEvent, TradeFill, WalletData};
use crate::engine::equity::reconstruct_equity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One ledger row per UTC calendar day in the requested range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: DateKey,
    /// Sum of closed-position realized PnL from fills dated this day.
    pub realized_pnl_usd: Decimal,
    /// Open-position mark-to-market PnL; non-zero only for the `as_of` day.
    pub unrealized_pnl_usd: Decimal,
    /// Sum of absolute trading and builder fees. Never negative.
    pub fees_usd: Decimal,
    /// Signed net funding for this day (positive = received).
    pub funding_usd: Decimal,
    /// Derived: realized + unrealized - fees + funding. Never set directly.
    pub net_pnl_usd: Decimal,
    /// Derived end-of-day account value, rounded to 2 dp in final output.
    pub equity_usd: Decimal,
}

impl DailyBucket {
    /// A zero-valued bucket for the given day.
    pub fn new(date: DateKey) -> Self {
        DailyBucket {
            date,
            realized_pnl_usd: Decimal::zero(),
            unrealized_pnl_usd: Decimal::zero(),
            fees_usd: Decimal::zero(),
            funding_usd: Decimal::zero(),
            net_pnl_usd: Decimal::zero(),
            equity_usd: Decimal::zero(),
        }
    }

    /// Recompute the derived net PnL from the four component fields.
    pub fn recompute_net(&mut self) {
        self.net_pnl_usd =
            self.realized_pnl_usd + self.unrealized_pnl_usd - self.fees_usd + self.funding_usd;
    }
}

/// Reduction over the whole bucket range.
///
/// `net_pnl_usd` is intentionally not a sum: it is the final bucket's net
/// PnL, i.e. point-in-time net performance at the end of the range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlSummary {
    pub total_realized_usd: Decimal,
    pub total_unrealized_usd: Decimal,
    pub total_fees_usd: Decimal,
    pub total_funding_usd: Decimal,
    pub net_pnl_usd: Decimal,
}

/// The engine's output: the chronological ledger plus its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlReport {
    pub daily: Vec<DailyBucket>,
    pub summary: PnlSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: DateKey, end: DateKey },
}

/// Build the date-bucketed daily PnL ledger for `[start, end]` inclusive.
///
/// `as_of` is the processing date: it selects the bucket that receives
/// unrealized PnL and anchors equity reconstruction. Callers pass the current
/// UTC date; tests pass a fixed one.
///
/// # Errors
/// Fails only when `start > end`. Malformed or missing upstream sub-fields
/// never error; they contribute zero.
pub fn compute_daily_pnl(
    data: &WalletData,
    start: DateKey,
    end: DateKey,
    as_of: DateKey,
) -> Result<PnlReport, LedgerError> {
    if start > end {
        return Err(LedgerError::InvalidRange { start, end });
    }

    let mut buckets = build_buckets(start, end);

    apply_fills(&mut buckets, &data.trades);
    apply_funding(&mut buckets, &data.funding);

    // Unrealized PnL is only known for the present; historical buckets stay
    // at zero because a point-in-time snapshot cannot reconstruct past marks.
    if let Some(bucket) = buckets.get_mut(&as_of) {
        bucket.unrealized_pnl_usd = data.user_state.total_unrealized_pnl();
    }

    for bucket in buckets.values_mut() {
        bucket.recompute_net();
    }

    let mut daily: Vec<DailyBucket> = buckets.into_values().collect();
    reconstruct_equity(&mut daily, data.user_state.account_value, as_of);

    let summary = summarize(&daily);
    Ok(PnlReport { daily, summary })
}

/// One zero-initialized bucket per calendar day, keyed chronologically.
fn build_buckets(start: DateKey, end: DateKey) -> BTreeMap<DateKey, DailyBucket> {
    let mut buckets = BTreeMap::new();
    let mut day = start;
    while day <= end {
        buckets.insert(day, DailyBucket::new(day));
        match day.succ() {
            Some(next) => day = next,
            None => break,
        }
    }
    buckets
}

/// Bucket realized PnL and fees by each fill's UTC calendar date.
///
/// Fills dated outside the range are dropped silently: the upstream fetch
/// over-fetches at day boundaries.
fn apply_fills(buckets: &mut BTreeMap<DateKey, DailyBucket>, fills: &[TradeFill]) {
    for fill in fills {
        let Some(day) = DateKey::from_ms(fill.time_ms) else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.realized_pnl_usd += fill.closed_pnl;
            bucket.fees_usd += fill.fee.abs() + fill.builder_fee.abs();
        }
    }
}

/// Bucket signed funding amounts by each event's UTC calendar date.
fn apply_funding(buckets: &mut BTreeMap<DateKey, DailyBucket>, funding: &[FundingEvent]) {
    for event in funding {
        let Some(day) = DateKey::from_ms(event.time_ms) else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.funding_usd += event.amount;
        }
    }
}

/// Fold the per-day ledger into range totals, all rounded to 2 dp.
fn summarize(daily: &[DailyBucket]) -> PnlSummary {
    let mut summary = PnlSummary::default();
    for bucket in daily {
        summary.total_realized_usd += bucket.realized_pnl_usd;
        summary.total_unrealized_usd += bucket.unrealized_pnl_usd;
        summary.total_fees_usd += bucket.fees_usd;
        summary.total_funding_usd += bucket.funding_usd;
    }
    if let Some(last) = daily.last() {
        summary.net_pnl_usd = last.net_pnl_usd;
    }

    summary.total_realized_usd = summary.total_realized_usd.round_2();
    summary.total_unrealized_usd = summary.total_unrealized_usd.round_2();
    summary.total_fees_usd = summary.total_fees_usd.round_2();
    summary.total_funding_usd = summary.total_funding_usd.round_2();
    summary.net_pnl_usd = summary.net_pnl_usd.round_2();
    summary
}
