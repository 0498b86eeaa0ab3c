//! The task that owns a strategy for the length of a session.

use tokio::sync::mpsc;
use tracing::{debug, info};

use pt_schemas::{Bar, FillEvent, SequencedOrder};

use crate::Strategy;

/// Owns the strategy and bridges it onto the session's channels.
///
/// Every forwarded order is stamped with the number of bars the
/// strategy has observed so far, so the simulator can refuse to price
/// it against older market state. Fills are drained before the next
/// bar is taken, so a position-aware strategy always sees its
/// execution before the market moves again. When the bar feed closes
/// the runner returns and drops its order sender, which is what
/// bounds the simulator's drain phase.
pub struct StrategyRunner {
    strategy: Box<dyn Strategy>,
}

impl StrategyRunner {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self { strategy }
    }

    pub async fn run(
        mut self,
        mut bar_rx: mpsc::Receiver<Bar>,
        mut fill_rx: mpsc::Receiver<FillEvent>,
        order_tx: mpsc::Sender<SequencedOrder>,
    ) {
        info!(strategy = self.strategy.name(), "strategy runner started");
        let mut fills_open = true;
        let mut bars_seen: u64 = 0;

        loop {
            let orders = tokio::select! {
                biased;
                maybe_fill = fill_rx.recv(), if fills_open => match maybe_fill {
                    Some(fill) => self.strategy.on_fill(&fill),
                    None => {
                        fills_open = false;
                        continue;
                    }
                },
                maybe_bar = bar_rx.recv() => match maybe_bar {
                    Some(bar) => {
                        bars_seen += 1;
                        self.strategy.on_bar(&bar)
                    }
                    None => break,
                },
            };

            for order in orders {
                debug!(
                    strategy = self.strategy.name(),
                    order_id = %order.id,
                    side = %order.side,
                    bars_seen,
                    "strategy emitted order"
                );
                if order_tx
                    .send(SequencedOrder::new(bars_seen, order))
                    .await
                    .is_err()
                {
                    // Simulator is gone; nothing left to trade against.
                    return;
                }
            }
        }

        info!(strategy = self.strategy.name(), "bar feed closed, strategy runner done");
    }
}
