//! End-of-day equity reconstruction.
//!
//! Only the present account value is known precisely; every other day's
//! equity is derived by walking net-PnL deltas out from that single anchor.
//! The model assumes net PnL fully explains day-over-day equity change,
//! which holds when no external deposits or withdrawals occur in the range;
//! the HTTP layer notes the approximation in response diagnostics.

use crate::domain::{DateKey, Decimal};
use crate::engine::ledger::DailyBucket;

/// Fill in `equity_usd` for every bucket, then round all equities to 2 dp.
///
/// Cases:
/// - `account_value > 0` and a bucket for `as_of` exists: anchor it at
///   `account_value`, walk backward (`equity[i] = equity[i+1] - net[i+1]`)
///   and forward (`equity[i] = equity[i-1] + net[i]`).
/// - `account_value > 0` with no anchor in range: back-solve the starting
///   equity as `account_value - sum(net)`, fall back to `account_value` when
///   the back-solved base is not positive, then accumulate forward.
/// - `account_value <= 0`: cumulative net PnL from zero.
pub fn reconstruct_equity(buckets: &mut [DailyBucket], account_value: Decimal, as_of: DateKey) {
    if buckets.is_empty() {
        return;
    }

    // Construction order is already ascending; re-sort anyway so a caller
    // that reordered buckets cannot corrupt the walk.
    buckets.sort_unstable_by_key(|b| b.date);

    if account_value.is_positive() {
        if let Some(anchor) = buckets.iter().position(|b| b.date == as_of) {
            buckets[anchor].equity_usd = account_value;
            for i in (0..anchor).rev() {
                buckets[i].equity_usd = buckets[i + 1].equity_usd - buckets[i + 1].net_pnl_usd;
            }
            for i in anchor + 1..buckets.len() {
                buckets[i].equity_usd = buckets[i - 1].equity_usd + buckets[i].net_pnl_usd;
            }
        } else {
            // Range entirely in the past: back-solve where the account must
            // have started for the net deltas to land on today's value.
            let total_net = buckets
                .iter()
                .fold(Decimal::zero(), |acc, b| acc + b.net_pnl_usd);
            let mut running = account_value - total_net;
            if !running.is_positive() {
                running = account_value;
            }
            for bucket in buckets.iter_mut() {
                running += bucket.net_pnl_usd;
                bucket.equity_usd = running;
            }
        }
    } else {
        // No trustworthy balance: equity is purely cumulative net PnL.
        let mut running = Decimal::zero();
        for bucket in buckets.iter_mut() {
            running += bucket.net_pnl_usd;
            bucket.equity_usd = running;
        }
    }

    for bucket in buckets.iter_mut() {
        bucket.equity_usd = bucket.equity_usd.round_2();
    }
}
