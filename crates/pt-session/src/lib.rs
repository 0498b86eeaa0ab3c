//! pt-session
//!
//! The session coordinator: wires the bar replay, the strategy runner,
//! and the execution simulator together over bounded channels, waits
//! for the pipeline to drain, and assembles the final report.
//!
//! Channel topology for one session:
//!
//! ```text
//!   BarSource ──bounded(1)──► ExecutionSimulator ──fills──► StrategyRunner
//!       │                          ▲                            │
//!       └────────bounded(1)────────┼────────────────────────────┘
//!                                  └───────orders, bounded──────┘
//! ```
//!
//! Tasks are spawned simulator first, then strategy runner, then
//! replay. Every channel is bounded, every task terminates when its
//! inputs close, and the report is only read after the simulator has
//! returned its outcome.

mod report;

pub use report::{write_report, SessionReport};

use std::path::PathBuf;

use tokio::sync::{mpsc, watch};
use tracing::info;

use pt_feed::{BarSource, FeedError};
use pt_sim::ExecutionSimulator;
use pt_strategy::{Strategy, StrategyRunner};

/// Everything a single backtest session needs to start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub symbol: String,
    pub data_path: PathBuf,
    pub initial_cash_micros: i64,
    /// Capacity of the strategy-to-simulator order channel.
    pub order_buffer: usize,
}

impl SessionConfig {
    pub fn new(
        symbol: impl Into<String>,
        data_path: impl Into<PathBuf>,
        initial_cash_micros: i64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            data_path: data_path.into(),
            initial_cash_micros,
            order_buffer: 100,
        }
    }
}

/// Session-level failures. Everything here is fatal to the session;
/// per-event problems (bad rows, rejected orders) are handled inside
/// the components and never surface as errors.
#[derive(Debug)]
pub enum SessionError {
    /// The bar source could not be materialized.
    Feed(FeedError),
    /// A pipeline task panicked or was aborted.
    Task(String),
    /// The report could not be serialized or written.
    Report(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Feed(e) => write!(f, "bar source unavailable: {e}"),
            SessionError::Task(what) => write!(f, "session task failed: {what}"),
            SessionError::Report(what) => write!(f, "session report not written: {what}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Feed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FeedError> for SessionError {
    fn from(e: FeedError) -> Self {
        SessionError::Feed(e)
    }
}

/// Run one backtest session to completion.
///
/// Loads the bar record, replays it through the strategy and the
/// simulator, and returns the report once the pipeline has fully
/// drained. A cancelled session is not an error: the report reflects
/// every fill applied before the cancellation was observed.
pub async fn run_session(
    config: SessionConfig,
    strategy: Box<dyn Strategy>,
    cancel: watch::Receiver<bool>,
) -> Result<SessionReport, SessionError> {
    let source = BarSource::from_csv_file(&config.symbol, &config.data_path)?;
    info!(
        symbol = %config.symbol,
        bars = source.len(),
        "session starting"
    );

    let (exec_bar_tx, exec_bar_rx) = mpsc::channel(1);
    let (strat_bar_tx, strat_bar_rx) = mpsc::channel(1);
    let (order_tx, order_rx) = mpsc::channel(config.order_buffer);
    let (fill_tx, fill_rx) = mpsc::channel(128);

    // Consumers before producer, so the first bar already has both
    // sides listening.
    let sim = tokio::spawn(
        ExecutionSimulator::new(config.initial_cash_micros).run(
            exec_bar_rx,
            order_rx,
            fill_tx,
            cancel.clone(),
        ),
    );
    let runner = tokio::spawn(StrategyRunner::new(strategy).run(strat_bar_rx, fill_rx, order_tx));
    let replay = tokio::spawn(source.replay(exec_bar_tx, strat_bar_tx, cancel));

    replay
        .await
        .map_err(|e| SessionError::Task(format!("bar replay: {e}")))?;
    runner
        .await
        .map_err(|e| SessionError::Task(format!("strategy runner: {e}")))?;
    let outcome = sim
        .await
        .map_err(|e| SessionError::Task(format!("execution simulator: {e}")))?;

    let report = SessionReport {
        state: outcome.portfolio.snapshot(),
        average_num_positions: outcome.metrics.average_open_positions(),
        num_trades: outcome.metrics.trade_count(),
    };
    info!(
        trades = report.num_trades,
        cash = %report.state.cash,
        "session complete"
    );
    Ok(report)
}
