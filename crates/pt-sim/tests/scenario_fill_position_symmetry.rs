//! Scenario: fills and position counters move in lockstep.
//!
//! For any event sequence, the number of buy fills equals the number
//! of open-position increments and the number of sell fills equals the
//! number of decrements; the metrics sample exactly one entry per
//! fill.

use chrono::{TimeZone, Utc};
use pt_schemas::{Bar, OrderRequest, Side, MICROS_SCALE};
use pt_sim::ExecutionSimulator;

fn bar(minute: u32, high: i64, close: i64) -> Bar {
    Bar {
        symbol: "SPY".to_string(),
        ts: Utc.with_ymd_and_hms(2024, 1, 2, 14, 30 + minute, 0).unwrap(),
        open_micros: close,
        high_micros: high,
        low_micros: close,
        close_micros: close,
        volume: 1_000,
    }
}

#[test]
fn buy_and_sell_fill_counts_match_position_deltas() {
    let mut sim = ExecutionSimulator::new(100_000 * MICROS_SCALE);
    let mut fills = Vec::new();

    fills.extend(sim.on_bar(bar(0, 101 * MICROS_SCALE, 100 * MICROS_SCALE)));
    fills.extend(sim.on_order(OrderRequest::market_buy("SPY", MICROS_SCALE)));
    fills.extend(sim.on_order(OrderRequest::market_buy("SPY", MICROS_SCALE)));
    fills.extend(sim.on_order(OrderRequest::limit_sell("SPY", MICROS_SCALE, 103 * MICROS_SCALE)));
    fills.extend(sim.on_bar(bar(1, 104 * MICROS_SCALE, 102 * MICROS_SCALE)));
    fills.extend(sim.on_order(OrderRequest::market_buy("SPY", MICROS_SCALE)));

    let buys = fills.iter().filter(|f| f.side == Side::Buy).count() as i64;
    let sells = fills.iter().filter(|f| f.side == Side::Sell).count() as i64;
    assert_eq!(buys, 3);
    assert_eq!(sells, 1);
    assert_eq!(sim.portfolio().open_positions(), buys - sells);
    assert_eq!(sim.metrics().trade_count(), fills.len() as u64);
    assert_eq!(sim.metrics().samples().len(), fills.len());

    // Each sample is the post-fill open-position count.
    assert_eq!(sim.metrics().samples(), &[1, 2, 1, 2]);
}

#[test]
fn unguarded_short_sell_goes_negative() {
    // Selling more than held is intentionally not guarded; the counter
    // and the share ledger both go negative.
    let mut sim = ExecutionSimulator::new(0);
    sim.on_bar(bar(0, 100 * MICROS_SCALE, 100 * MICROS_SCALE));
    sim.on_order(OrderRequest::limit_sell("SPY", MICROS_SCALE, 90 * MICROS_SCALE));
    let fills = sim.on_bar(bar(1, 100 * MICROS_SCALE, 99 * MICROS_SCALE));

    assert_eq!(fills.len(), 1);
    assert_eq!(sim.portfolio().open_positions(), -1);
    assert_eq!(sim.portfolio().shares_held_micros(), -MICROS_SCALE);
    assert_eq!(sim.metrics().samples(), &[-1]);
}
