//! pt-schemas
//!
//! Shared data model for the backtest pipeline:
//! - [`Bar`]: one OHLCV bar, the unit of replayed market data
//! - [`OrderRequest`]: what a strategy asks for
//! - [`FillEvent`]: what the execution simulator did about it
//!
//! All prices, cash amounts, and share quantities are integer micros
//! (1 unit = 1_000_000 micros). See [`money`] for parsing/formatting
//! helpers. No `f64` appears anywhere in this crate.

pub mod money;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use money::{format_micros, parse_micros, MICROS_SCALE};

/// One OHLCV bar for a single symbol.
///
/// Immutable once produced by the bar source; timestamps are strictly
/// increasing across a replayed sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub ts: DateTime<Utc>,
    pub open_micros: i64,
    pub high_micros: i64,
    pub low_micros: i64,
    pub close_micros: i64,
    pub volume: u64,
}

/// BUY or SELL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order kind. Buys execute as market orders regardless; sells rest on
/// a limit price.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit,
}

/// Time-in-force. Carried on the request for broker-shape parity; the
/// backtest simulator does not expire resting orders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    Day,
    Gtc,
}

/// Order sizing: exactly one of share quantity or cash notional.
///
/// A tagged variant instead of two optional fields, so "both set" and
/// "neither set" are unrepresentable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSize {
    /// Share quantity in micro-shares (1 share = 1_000_000).
    Quantity(i64),
    /// Cash value in micros; the fill quantity is derived from the
    /// execution price.
    Notional(i64),
}

/// A strategy's request to trade, consumed exactly once by the
/// execution simulator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub id: Uuid,
    pub symbol: String,
    pub side: Side,
    pub size: OrderSize,
    pub kind: OrderKind,
    /// Required for sells (they rest until a bar's high reaches it).
    pub limit_price_micros: Option<i64>,
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    /// A market buy sized by share quantity.
    pub fn market_buy(symbol: impl Into<String>, qty_micros: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            side: Side::Buy,
            size: OrderSize::Quantity(qty_micros),
            kind: OrderKind::Market,
            limit_price_micros: None,
            time_in_force: TimeInForce::Day,
        }
    }

    /// A market buy sized by cash notional.
    pub fn notional_buy(symbol: impl Into<String>, notional_micros: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            side: Side::Buy,
            size: OrderSize::Notional(notional_micros),
            kind: OrderKind::Market,
            limit_price_micros: None,
            time_in_force: TimeInForce::Day,
        }
    }

    /// A sell that rests until a bar's high reaches `limit_price_micros`.
    pub fn limit_sell(
        symbol: impl Into<String>,
        qty_micros: i64,
        limit_price_micros: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            side: Side::Sell,
            size: OrderSize::Quantity(qty_micros),
            kind: OrderKind::Limit,
            limit_price_micros: Some(limit_price_micros),
            time_in_force: TimeInForce::Gtc,
        }
    }
}

/// An [`OrderRequest`] stamped with the number of bars its author had
/// observed when emitting it.
///
/// The stamp is what keeps order pricing honest across tasks: the
/// execution simulator refuses to act on the request until it has
/// consumed at least that many bars itself, so an order is never
/// evaluated against market state older than what its author was
/// looking at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedOrder {
    pub observed_bar_seq: u64,
    pub request: OrderRequest,
}

impl SequencedOrder {
    pub fn new(observed_bar_seq: u64, request: OrderRequest) -> Self {
        Self {
            observed_bar_seq,
            request,
        }
    }
}

/// A simulated execution.
///
/// `notional_micros` is always exactly `price × qty` at micro
/// precision, so cash and share ledgers move in lockstep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    pub order_id: Uuid,
    pub symbol: String,
    pub side: Side,
    pub price_micros: i64,
    pub qty_micros: i64,
    pub notional_micros: i64,
}
