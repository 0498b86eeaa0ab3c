//! pt-sim
//!
//! The execution simulator: the matching engine that stands in for a
//! live broker during a backtest.
//!
//! Two event sources (bars, order requests) are multiplexed into one
//! serialized loop that is the sole writer of the portfolio ledger.
//! Semantics:
//! - a BUY fills immediately at the last observed bar's close
//! - a SELL always rests in the open order book, even when it is
//!   immediately marketable, and fills at exactly its limit price on
//!   the first later bar whose high reaches it
//! - a resting order never fills on the bar that created it
//!
//! The "sells always rest" rule is an intentional simplification of
//! the execution model, not a gap to optimize away.

mod book;
mod engine;

pub use book::{OpenOrderBook, RestingOrder};
pub use engine::{ExecutionSimulator, SimOutcome};
