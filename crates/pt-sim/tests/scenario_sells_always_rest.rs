//! Scenario: the resting-sell execution model.
//!
//! Invariants under test:
//! 1. A sell never fills on arrival, even when the last observed bar
//!    already satisfies its limit (intentional model simplification).
//! 2. A resting sell never fills using the bar that created it.
//! 3. It fills on the first subsequent bar whose high >= limit, at
//!    exactly the limit price — never the bar's high.
//! 4. The book is scanned in insertion order every bar; an order may
//!    rest across many bars.
//! 5. Unfilled resting orders are discarded at session end, and a sell
//!    without a limit price is rejected.

use chrono::{TimeZone, Utc};
use pt_schemas::{Bar, OrderKind, OrderRequest, OrderSize, Side, TimeInForce, MICROS_SCALE};
use pt_sim::ExecutionSimulator;
use uuid::Uuid;

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

const CASH: i64 = 100_000 * MICROS_SCALE;

#[test]
fn marketable_sell_still_rests() {
    let mut sim = ExecutionSimulator::new(CASH);
    // High already exceeds the limit we are about to place.
    sim.on_bar(bar(0, 110 * MICROS_SCALE, 108 * MICROS_SCALE));

    let none = sim.on_order(OrderRequest::limit_sell("SPY", MICROS_SCALE, 105 * MICROS_SCALE));
    assert!(none.is_none(), "sells are never immediate fills");
    assert_eq!(sim.open_order_count(), 1);
    assert_eq!(sim.portfolio().shares_held_micros(), 0);
}

#[test]
fn no_same_bar_fill_even_when_high_reaches_limit() {
    let mut sim = ExecutionSimulator::new(CASH);
    sim.on_bar(bar(0, 110 * MICROS_SCALE, 108 * MICROS_SCALE));
    sim.on_order(OrderRequest::limit_sell("SPY", MICROS_SCALE, 105 * MICROS_SCALE));

    // Next bar triggers; the creating bar could not have.
    let fills = sim.on_bar(bar(1, 106 * MICROS_SCALE, 104 * MICROS_SCALE));
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].side, Side::Sell);
    assert_eq!(fills[0].price_micros, 105 * MICROS_SCALE);
}

#[test]
fn fills_on_first_qualifying_bar_at_exactly_the_limit() {
    let mut sim = ExecutionSimulator::new(CASH);
    sim.on_bar(bar(0, 100 * MICROS_SCALE, 100 * MICROS_SCALE));
    sim.on_order(OrderRequest::limit_sell("SPY", MICROS_SCALE, 107 * MICROS_SCALE));

    // Highs below the limit leave the order resting.
    assert!(sim.on_bar(bar(1, 105 * MICROS_SCALE, 104 * MICROS_SCALE)).is_empty());
    assert!(sim.on_bar(bar(2, 106_999_999, 104 * MICROS_SCALE)).is_empty());
    assert_eq!(sim.open_order_count(), 1);

    // First bar whose high reaches 107 fills at 107, not at the high.
    let fills = sim.on_bar(bar(3, 112 * MICROS_SCALE, 110 * MICROS_SCALE));
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].price_micros, 107 * MICROS_SCALE);
    assert_eq!(fills[0].notional_micros, 107 * MICROS_SCALE);
    assert_eq!(sim.open_order_count(), 0);
}

#[test]
fn book_scans_in_insertion_order() {
    let mut sim = ExecutionSimulator::new(CASH);
    sim.on_bar(bar(0, 100 * MICROS_SCALE, 100 * MICROS_SCALE));

    let first = OrderRequest::limit_sell("SPY", MICROS_SCALE, 106 * MICROS_SCALE);
    let second = OrderRequest::limit_sell("SPY", MICROS_SCALE, 103 * MICROS_SCALE);
    let (first_id, second_id) = (first.id, second.id);
    sim.on_order(first);
    sim.on_order(second);

    // Both trigger on the same bar; fills come back in insertion
    // order, not limit-price order.
    let fills = sim.on_bar(bar(1, 108 * MICROS_SCALE, 107 * MICROS_SCALE));
    assert_eq!(fills.len(), 2);
    assert_eq!(fills[0].order_id, first_id);
    assert_eq!(fills[1].order_id, second_id);
    assert_eq!(fills[0].price_micros, 106 * MICROS_SCALE);
    assert_eq!(fills[1].price_micros, 103 * MICROS_SCALE);
}

#[test]
fn partial_trigger_leaves_the_rest_resting() {
    let mut sim = ExecutionSimulator::new(CASH);
    sim.on_bar(bar(0, 100 * MICROS_SCALE, 100 * MICROS_SCALE));
    sim.on_order(OrderRequest::limit_sell("SPY", MICROS_SCALE, 120 * MICROS_SCALE));
    sim.on_order(OrderRequest::limit_sell("SPY", MICROS_SCALE, 103 * MICROS_SCALE));

    let fills = sim.on_bar(bar(1, 104 * MICROS_SCALE, 103 * MICROS_SCALE));
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].price_micros, 103 * MICROS_SCALE);
    assert_eq!(sim.open_order_count(), 1, "the 120 limit keeps resting");
}

#[test]
fn sell_without_limit_price_is_rejected() {
    let mut sim = ExecutionSimulator::new(CASH);
    sim.on_bar(bar(0, 100 * MICROS_SCALE, 100 * MICROS_SCALE));

    let market_sell = OrderRequest {
        id: Uuid::new_v4(),
        symbol: "SPY".to_string(),
        side: Side::Sell,
        size: OrderSize::Quantity(MICROS_SCALE),
        kind: OrderKind::Market,
        limit_price_micros: None,
        time_in_force: TimeInForce::Day,
    };
    assert!(sim.on_order(market_sell).is_none());
    assert_eq!(sim.open_order_count(), 0);
    assert_eq!(sim.portfolio().cash_micros(), CASH);
}

#[test]
fn unfilled_resting_orders_are_discarded_at_session_end() {
    let mut sim = ExecutionSimulator::new(CASH);
    sim.on_bar(bar(0, 100 * MICROS_SCALE, 100 * MICROS_SCALE));
    sim.on_order(OrderRequest::limit_sell("SPY", MICROS_SCALE, 200 * MICROS_SCALE));

    let outcome = sim.into_outcome();
    // No forced liquidation: the discarded order left no trace in the
    // ledger or the metrics.
    assert_eq!(outcome.portfolio.shares_held_micros(), 0);
    assert_eq!(outcome.metrics.trade_count(), 0);
}
