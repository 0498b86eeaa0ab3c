//! Bar replay: one source, two lockstep consumers.
//!
//! Each bar is delivered twice over bounded(1) channels — execution
//! side first, then strategy side. The tight bound gives natural
//! backpressure: the replay cannot outrun either consumer, and a bar
//! always reaches the simulator before any order derived from it can
//! exist. Dropping the senders at the end signals end-of-sequence to
//! both consumers exactly once.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use pt_schemas::Bar;

use crate::{load_csv_file, FeedError};

/// A finite, time-ordered bar sequence.
///
/// `replay` consumes the source: a fresh replay requires a fresh
/// instance, so mid-session restarts are unrepresentable.
#[derive(Debug)]
pub struct BarSource {
    bars: Vec<Bar>,
}

impl BarSource {
    /// Materialize a source from a CSV record on disk.
    pub fn from_csv_file(symbol: &str, path: impl AsRef<std::path::Path>) -> Result<Self, FeedError> {
        Ok(Self {
            bars: load_csv_file(symbol, path)?,
        })
    }

    /// Wrap an already-materialized sequence (tests, alternate loaders).
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Replay every bar to both consumers, then close both feeds.
    ///
    /// Cancellation is observed between bars. A closed receiver ends
    /// the replay early (the consumer is gone; nothing left to feed).
    pub async fn replay(
        self,
        exec_tx: mpsc::Sender<Bar>,
        strat_tx: mpsc::Sender<Bar>,
        cancel: watch::Receiver<bool>,
    ) {
        info!(bars = self.bars.len(), "starting bar replay");

        for bar in self.bars {
            if *cancel.borrow() {
                info!("bar replay cancelled");
                break;
            }

            // Execution side first: the simulator must observe a bar
            // before any order request that depends on it.
            if exec_tx.send(bar.clone()).await.is_err() {
                debug!("execution feed receiver dropped, stopping replay");
                break;
            }
            if strat_tx.send(bar).await.is_err() {
                debug!("strategy feed receiver dropped, stopping replay");
                break;
            }
        }

        // Senders drop here: end-of-sequence, signalled exactly once.
        info!("bar replay finished, closing feeds");
    }
}
