use hyperlens::domain::{
    AccountSnapshot, DateKey, Decimal, FundingEvent, PositionPnl, TimeMs, TradeFill, WalletData,
};
use hyperlens::engine::{compute_daily_pnl, DailyBucket, LedgerError};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}

/// A timestamp `offset_ms` into the given UTC day.
fn at(day: &str, offset_ms: i64) -> TimeMs {
    TimeMs::new(date(day).start_of_day_ms().as_i64() + offset_ms)
}

fn fill(day: &str, closed_pnl: &str, fee: &str, builder_fee: &str) -> TradeFill {
    TradeFill {
        time_ms: at(day, 36_000_000),
        closed_pnl: dec(closed_pnl),
        fee: dec(fee),
        builder_fee: dec(builder_fee),
    }
}

fn funding(day: &str, amount: &str) -> FundingEvent {
    FundingEvent {
        time_ms: at(day, 3_600_000),
        amount: dec(amount),
    }
}

fn snapshot(account_value: &str, unrealized: &[&str]) -> AccountSnapshot {
    AccountSnapshot {
        account_value: dec(account_value),
        positions: unrealized
            .iter()
            .map(|u| PositionPnl {
                unrealized_pnl: dec(u),
            })
            .collect(),
    }
}

fn wallet(
    user_state: AccountSnapshot,
    trades: Vec<TradeFill>,
    funding: Vec<FundingEvent>,
) -> WalletData {
    WalletData {
        user_state,
        trades,
        funding,
        fetched_at: chrono::Utc::now(),
    }
}

fn assert_net_identity(daily: &[DailyBucket]) {
    for bucket in daily {
        assert_eq!(
            bucket.net_pnl_usd,
            bucket.realized_pnl_usd + bucket.unrealized_pnl_usd - bucket.fees_usd
                + bucket.funding_usd,
            "net identity violated on {}",
            bucket.date
        );
    }
}

fn assert_equity_continuity(daily: &[DailyBucket]) {
    let tolerance = dec("0.01");
    for pair in daily.windows(2) {
        let drift = (pair[1].equity_usd - pair[0].equity_usd - pair[1].net_pnl_usd).abs();
        assert!(
            drift <= tolerance,
            "equity discontinuity between {} and {}: drift {}",
            pair[0].date,
            pair[1].date,
            drift
        );
    }
}

#[test]
fn empty_wallet_yields_zero_buckets_and_zero_summary() {
    // Scenario: no positions, no trades, no funding.
    let data = wallet(AccountSnapshot::default(), vec![], vec![]);
    let report =
        compute_daily_pnl(&data, date("2024-01-01"), date("2024-01-03"), date("2024-06-01"))
            .unwrap();

    assert_eq!(report.daily.len(), 3);
    for bucket in &report.daily {
        assert!(bucket.realized_pnl_usd.is_zero());
        assert!(bucket.unrealized_pnl_usd.is_zero());
        assert!(bucket.fees_usd.is_zero());
        assert!(bucket.funding_usd.is_zero());
        assert!(bucket.net_pnl_usd.is_zero());
        assert!(bucket.equity_usd.is_zero());
    }
    assert!(report.summary.total_realized_usd.is_zero());
    assert!(report.summary.total_fees_usd.is_zero());
    assert!(report.summary.net_pnl_usd.is_zero());
}

#[test]
fn single_fill_lands_in_its_day_only() {
    let data = wallet(
        AccountSnapshot::default(),
        vec![fill("2024-01-02", "150.5", "2.25", "0")],
        vec![],
    );
    let report =
        compute_daily_pnl(&data, date("2024-01-01"), date("2024-01-03"), date("2024-06-01"))
            .unwrap();

    let target = &report.daily[1];
    assert_eq!(target.date, date("2024-01-02"));
    assert_eq!(target.realized_pnl_usd, dec("150.5"));
    assert_eq!(target.fees_usd, dec("2.25"));
    assert!(report.daily[0].realized_pnl_usd.is_zero());
    assert!(report.daily[2].realized_pnl_usd.is_zero());
    assert_net_identity(&report.daily);
}

#[test]
fn bucket_dates_are_contiguous_ascending_without_gaps() {
    let start = date("2024-02-20");
    let end = date("2024-03-10");
    let data = wallet(AccountSnapshot::default(), vec![], vec![]);
    let report = compute_daily_pnl(&data, start, end, date("2024-06-01")).unwrap();

    assert_eq!(report.daily.len() as i64, start.days_through(end));
    let mut expected = start;
    for bucket in &report.daily {
        assert_eq!(bucket.date, expected);
        expected = expected.succ().unwrap();
    }
}

#[test]
fn anchor_day_equity_walks_both_directions() {
    // Today is the range end; net PnL of 50 accrues today.
    let as_of = date("2024-01-03");
    let data = wallet(
        snapshot("1000", &[]),
        vec![fill("2024-01-03", "50", "0", "0")],
        vec![],
    );
    let report = compute_daily_pnl(&data, date("2024-01-01"), as_of, as_of).unwrap();

    assert_eq!(report.daily[2].equity_usd, dec("1000"));
    assert_eq!(report.daily[1].equity_usd, dec("950"));
    assert_eq!(report.daily[0].equity_usd, dec("950"));
    assert_equity_continuity(&report.daily);
}

#[test]
fn anchor_mid_range_walks_forward_too() {
    let as_of = date("2024-01-02");
    let data = wallet(
        snapshot("1000", &[]),
        vec![
            fill("2024-01-02", "50", "0", "0"),
            fill("2024-01-03", "-20", "0", "0"),
        ],
        vec![],
    );
    let report = compute_daily_pnl(&data, date("2024-01-01"), date("2024-01-03"), as_of).unwrap();

    assert_eq!(report.daily[1].equity_usd, dec("1000"));
    assert_eq!(report.daily[0].equity_usd, dec("950"));
    assert_eq!(report.daily[2].equity_usd, dec("980"));
    assert_equity_continuity(&report.daily);
}

#[test]
fn past_range_back_solves_from_current_value() {
    // Range entirely before as_of; total net over the range is 200.
    let data = wallet(
        snapshot("500", &[]),
        vec![
            fill("2024-01-01", "150", "0", "0"),
            fill("2024-01-02", "50", "0", "0"),
        ],
        vec![],
    );
    let report =
        compute_daily_pnl(&data, date("2024-01-01"), date("2024-01-02"), date("2024-06-01"))
            .unwrap();

    // Base equity 500 - 200 = 300, so day one lands at 450 and the range
    // ends on today's known value.
    assert_eq!(report.daily[0].equity_usd, dec("450"));
    assert_eq!(report.daily[1].equity_usd, dec("500"));
    assert_equity_continuity(&report.daily);
}

#[test]
fn no_account_value_accumulates_from_zero() {
    let data = wallet(
        snapshot("0", &[]),
        vec![
            fill("2024-01-01", "10", "0", "0"),
            fill("2024-01-02", "-4", "0", "0"),
        ],
        vec![],
    );
    let report =
        compute_daily_pnl(&data, date("2024-01-01"), date("2024-01-03"), date("2024-01-03"))
            .unwrap();

    assert_eq!(report.daily[0].equity_usd, dec("10"));
    assert_eq!(report.daily[1].equity_usd, dec("6"));
    assert_eq!(report.daily[2].equity_usd, dec("6"));
    assert_equity_continuity(&report.daily);
}

#[test]
fn funding_is_signed_and_fees_are_absolute() {
    let data = wallet(
        AccountSnapshot::default(),
        vec![fill("2024-01-01", "0", "-3", "-0.5")],
        vec![funding("2024-01-01", "1.5"), funding("2024-01-01", "-0.25")],
    );
    let report =
        compute_daily_pnl(&data, date("2024-01-01"), date("2024-01-01"), date("2024-06-01"))
            .unwrap();

    let bucket = &report.daily[0];
    assert_eq!(bucket.fees_usd, dec("3.5"));
    assert_eq!(bucket.funding_usd, dec("1.25"));
    assert_eq!(bucket.net_pnl_usd, dec("-2.25"));
}

#[test]
fn unrealized_pnl_hits_only_the_as_of_bucket() {
    let as_of = date("2024-01-02");
    let data = wallet(snapshot("0", &["25.5", "-10"]), vec![], vec![]);
    let report = compute_daily_pnl(&data, date("2024-01-01"), date("2024-01-03"), as_of).unwrap();

    let non_zero: Vec<_> = report
        .daily
        .iter()
        .filter(|b| !b.unrealized_pnl_usd.is_zero())
        .collect();
    assert_eq!(non_zero.len(), 1);
    assert_eq!(non_zero[0].date, as_of);
    assert_eq!(non_zero[0].unrealized_pnl_usd, dec("15.5"));
    assert_net_identity(&report.daily);
}

#[test]
fn events_outside_the_range_are_ignored() {
    let data = wallet(
        AccountSnapshot::default(),
        vec![fill("2023-12-31", "999", "9", "0"), fill("2024-01-04", "999", "9", "0")],
        vec![funding("2024-01-09", "77")],
    );
    let report =
        compute_daily_pnl(&data, date("2024-01-01"), date("2024-01-03"), date("2024-06-01"))
            .unwrap();

    for bucket in &report.daily {
        assert!(bucket.realized_pnl_usd.is_zero());
        assert!(bucket.fees_usd.is_zero());
        assert!(bucket.funding_usd.is_zero());
    }
}

#[test]
fn summary_totals_sum_components_but_net_is_range_end() {
    let as_of = date("2024-01-03");
    let data = wallet(
        snapshot("1000", &["5"]),
        vec![
            fill("2024-01-01", "100", "2", "0"),
            fill("2024-01-03", "40", "1", "0.5"),
        ],
        vec![funding("2024-01-02", "-3")],
    );
    let report = compute_daily_pnl(&data, date("2024-01-01"), as_of, as_of).unwrap();

    assert_eq!(report.summary.total_realized_usd, dec("140"));
    assert_eq!(report.summary.total_unrealized_usd, dec("5"));
    assert_eq!(report.summary.total_fees_usd, dec("3.5"));
    assert_eq!(report.summary.total_funding_usd, dec("-3"));
    // Point-in-time: the last bucket's net (40 + 5 - 1.5), not the range sum.
    assert_eq!(report.summary.net_pnl_usd, dec("43.5"));
    assert_net_identity(&report.daily);
}

#[test]
fn identical_inputs_produce_identical_reports() {
    let as_of = date("2024-01-03");
    let data = wallet(
        snapshot("750", &["12"]),
        vec![fill("2024-01-02", "30", "1", "0")],
        vec![funding("2024-01-01", "0.5")],
    );

    let first = compute_daily_pnl(&data, date("2024-01-01"), as_of, as_of).unwrap();
    let second = compute_daily_pnl(&data, date("2024-01-01"), as_of, as_of).unwrap();
    assert_eq!(first, second);
}

#[test]
fn reversed_range_is_rejected() {
    let data = wallet(AccountSnapshot::default(), vec![], vec![]);
    let err =
        compute_daily_pnl(&data, date("2024-01-03"), date("2024-01-01"), date("2024-01-03"))
            .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRange { .. }));
}

#[test]
fn single_day_range_with_anchor() {
    let as_of = date("2024-01-01");
    let data = wallet(
        snapshot("321.987", &[]),
        vec![fill("2024-01-01", "10", "0", "0")],
        vec![],
    );
    let report = compute_daily_pnl(&data, as_of, as_of, as_of).unwrap();

    assert_eq!(report.daily.len(), 1);
    // Equity is the anchor value, rounded to 2 decimal places.
    assert_eq!(report.daily[0].equity_usd, dec("321.99"));
}
