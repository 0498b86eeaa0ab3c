//! pt-portfolio
//!
//! The mutable financial ledger of a backtest session.
//!
//! - Fill-driven: [`PortfolioState::apply_fill`] is the only mutator
//! - Pure deterministic logic (no IO, no time, no channels)
//! - Exclusively owned by the execution simulator's event loop; that
//!   single-owner discipline is what replaces locks
//!
//! There is deliberately no short-selling guard: a sell fill for more
//! shares than held drives `shares_held_micros` and `open_positions`
//! negative.

use serde::{Deserialize, Serialize};

use pt_schemas::{format_micros, FillEvent, Side};

/// Cash, share, and position ledger for a single-symbol session.
///
/// Fields are private: no component other than the owning simulator
/// can construct a conflicting mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortfolioState {
    cash_micros: i64,
    shares_held_micros: i64,
    open_positions: i64,
}

impl PortfolioState {
    pub fn new(initial_cash_micros: i64) -> Self {
        Self {
            cash_micros: initial_cash_micros,
            shares_held_micros: 0,
            open_positions: 0,
        }
    }

    /// Apply one fill. Cash and shares move by the fill's notional and
    /// quantity in lockstep; `open_positions` moves by exactly one in
    /// the direction of the side.
    pub fn apply_fill(&mut self, fill: &FillEvent) {
        debug_assert!(fill.qty_micros > 0, "fill qty must be > 0");
        debug_assert!(fill.notional_micros >= 0, "fill notional must be >= 0");
        match fill.side {
            Side::Buy => {
                self.cash_micros = self.cash_micros.saturating_sub(fill.notional_micros);
                self.shares_held_micros = self.shares_held_micros.saturating_add(fill.qty_micros);
                self.open_positions += 1;
            }
            Side::Sell => {
                self.cash_micros = self.cash_micros.saturating_add(fill.notional_micros);
                self.shares_held_micros = self.shares_held_micros.saturating_sub(fill.qty_micros);
                self.open_positions -= 1;
            }
        }
    }

    pub fn cash_micros(&self) -> i64 {
        self.cash_micros
    }

    pub fn shares_held_micros(&self) -> i64 {
        self.shares_held_micros
    }

    pub fn open_positions(&self) -> i64 {
        self.open_positions
    }

    /// Report fragment. Only meaningful once the owning simulator has
    /// fully drained and returned the state.
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            cash: format_micros(self.cash_micros),
            shares_held: format_micros(self.shares_held_micros),
            open_positions: self.open_positions,
        }
    }
}

/// Serializable point-in-time view of the portfolio, with monetary
/// fields rendered as 6-decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub cash: String,
    pub shares_held: String,
    pub open_positions: i64,
}

/// Per-session execution metrics, appended to on every fill.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionMetrics {
    open_positions_samples: Vec<i64>,
    trade_count: u64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fill: sample the post-fill open-position count and
    /// bump the trade counter.
    pub fn record_fill(&mut self, open_positions: i64) {
        self.open_positions_samples.push(open_positions);
        self.trade_count += 1;
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    pub fn samples(&self) -> &[i64] {
        &self.open_positions_samples
    }

    /// Floor-divided integer average of the samples; 0 when empty.
    /// `div_euclid` keeps the floor semantics for negative sums.
    pub fn average_open_positions(&self) -> i64 {
        if self.open_positions_samples.is_empty() {
            return 0;
        }
        let sum: i64 = self.open_positions_samples.iter().sum();
        sum.div_euclid(self.open_positions_samples.len() as i64)
    }
}
