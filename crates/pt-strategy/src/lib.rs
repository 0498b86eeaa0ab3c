//! Strategy port: the trait a trading algorithm implements and the
//! runner task that feeds it from the session's channels.
//!
//! Strategies are synchronous and deterministic: bars and fills in,
//! order requests out. No IO handles, no clock access. Everything
//! time-like a strategy sees arrives through the events themselves.

mod buy_sell;
mod rsi;
mod runner;

pub use buy_sell::BuyThenSellLimit;
pub use rsi::RsiBullish;
pub use runner::StrategyRunner;

use pt_schemas::{Bar, FillEvent, OrderRequest};

/// A trading algorithm driven by the replayed event stream.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    /// Called once per bar, in replay order.
    fn on_bar(&mut self, bar: &Bar) -> Vec<OrderRequest>;

    /// Called once per fill of this session's orders. Optional; a
    /// strategy that does not track its executions ignores fills.
    fn on_fill(&mut self, _fill: &FillEvent) -> Vec<OrderRequest> {
        Vec::new()
    }
}
