//! The execution simulator's event handlers and serialized loop.
//!
//! The handlers (`on_bar`, `on_order`) are synchronous and pure with
//! respect to IO, so every matching rule is unit-testable without a
//! runtime. `run` drives them from the session's channels.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use pt_portfolio::{PortfolioState, SessionMetrics};
use pt_schemas::money::{notional_micros, qty_from_notional};
use pt_schemas::{Bar, FillEvent, OrderRequest, OrderSize, SequencedOrder, Side};

use crate::book::{OpenOrderBook, RestingOrder};

/// What the simulator hands back when its loop terminates: the final
/// ledger and the per-fill metrics. Snapshot reads of portfolio state
/// only ever happen through this value, after the loop has fully
/// drained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimOutcome {
    pub portfolio: PortfolioState,
    pub metrics: SessionMetrics,
}

/// The matching engine. Sole owner and sole writer of the portfolio
/// ledger for the whole session.
#[derive(Debug)]
pub struct ExecutionSimulator {
    last_bar: Option<Bar>,
    bar_seq: u64,
    book: OpenOrderBook,
    portfolio: PortfolioState,
    metrics: SessionMetrics,
}

impl ExecutionSimulator {
    pub fn new(initial_cash_micros: i64) -> Self {
        Self {
            last_bar: None,
            bar_seq: 0,
            book: OpenOrderBook::new(),
            portfolio: PortfolioState::new(initial_cash_micros),
            metrics: SessionMetrics::new(),
        }
    }

    pub fn portfolio(&self) -> &PortfolioState {
        &self.portfolio
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn open_order_count(&self) -> usize {
        self.book.len()
    }

    /// Consume the simulator; unfilled resting orders are discarded
    /// (no forced liquidation at session end).
    pub fn into_outcome(self) -> SimOutcome {
        if !self.book.is_empty() {
            debug!(
                resting = self.book.len(),
                "discarding unfilled resting orders at session end"
            );
        }
        SimOutcome {
            portfolio: self.portfolio,
            metrics: self.metrics,
        }
    }

    /// Process one bar: scan the book in insertion order, fill every
    /// armed resting order whose limit the bar's high reaches, then
    /// record the bar as the last observed one.
    pub fn on_bar(&mut self, bar: Bar) -> Vec<FillEvent> {
        self.bar_seq += 1;
        let seq = self.bar_seq;

        let mut fills = Vec::new();
        let mut i = 0;
        while i < self.book.len() {
            let Some(resting) = self.book.get(i) else {
                break;
            };
            // An order never triggers on the bar that created it, even
            // if that bar's high already reaches the limit.
            let armed = seq > resting.armed_after_seq;
            if armed && bar.high_micros >= resting.limit_price_micros {
                let resting = self.book.remove(i);
                // Favorable-price resolution: fill at the limit price,
                // not at the bar's high.
                fills.push(self.apply(
                    resting.order_id,
                    resting.symbol,
                    Side::Sell,
                    resting.limit_price_micros,
                    resting.qty_micros,
                ));
            } else {
                i += 1;
            }
        }

        self.last_bar = Some(bar);
        fills
    }

    /// Process one order request. Invalid requests are rejected with a
    /// warning and no state mutation. A valid buy fills immediately; a
    /// valid sell always rests.
    pub fn on_order(&mut self, req: OrderRequest) -> Option<FillEvent> {
        match req.side {
            Side::Buy => self.handle_buy(req),
            Side::Sell => {
                self.handle_sell(req);
                None
            }
        }
    }

    fn handle_buy(&mut self, req: OrderRequest) -> Option<FillEvent> {
        let Some(last) = &self.last_bar else {
            warn!(order_id = %req.id, "rejecting buy: no bar observed yet");
            return None;
        };
        // Immediate market fill at the most recent close available,
        // regardless of the declared order kind.
        let price = last.close_micros;

        let qty = match req.size {
            OrderSize::Quantity(q) => q,
            OrderSize::Notional(n) => {
                if n <= 0 {
                    warn!(order_id = %req.id, notional = n, "rejecting buy: non-positive notional");
                    return None;
                }
                match qty_from_notional(n, price) {
                    Some(q) => q,
                    None => {
                        warn!(order_id = %req.id, price, "rejecting buy: unpriceable at last close");
                        return None;
                    }
                }
            }
        };
        if qty <= 0 {
            warn!(order_id = %req.id, qty, "rejecting buy: non-positive quantity");
            return None;
        }

        Some(self.apply(req.id, req.symbol, Side::Buy, price, qty))
    }

    fn handle_sell(&mut self, req: OrderRequest) {
        let Some(limit) = req.limit_price_micros else {
            warn!(order_id = %req.id, "rejecting sell: missing limit price");
            return;
        };

        let qty = match req.size {
            OrderSize::Quantity(q) => q,
            OrderSize::Notional(n) => match qty_from_notional(n, limit) {
                Some(q) => q,
                None => {
                    warn!(order_id = %req.id, limit, "rejecting sell: unpriceable at limit");
                    return;
                }
            },
        };
        if qty <= 0 {
            warn!(order_id = %req.id, qty, "rejecting sell: non-positive quantity");
            return;
        }

        // Sells always rest, even when already marketable against the
        // last observed bar. They may only trigger on later bars.
        self.book.push(RestingOrder {
            order_id: req.id,
            symbol: req.symbol,
            qty_micros: qty,
            limit_price_micros: limit,
            armed_after_seq: self.bar_seq,
        });
    }

    /// Build a fill, apply it to the ledger, and sample the metrics.
    /// The one place where financial state mutates.
    fn apply(
        &mut self,
        order_id: uuid::Uuid,
        symbol: String,
        side: Side,
        price_micros: i64,
        qty_micros: i64,
    ) -> FillEvent {
        let fill = FillEvent {
            order_id,
            symbol,
            side,
            price_micros,
            qty_micros,
            notional_micros: notional_micros(price_micros, qty_micros),
        };
        self.portfolio.apply_fill(&fill);
        self.metrics.record_fill(self.portfolio.open_positions());
        debug!(
            order_id = %fill.order_id,
            side = %fill.side,
            price = fill.price_micros,
            qty = fill.qty_micros,
            "fill"
        );
        fill
    }

    /// The serialized event loop.
    ///
    /// Each incoming order carries the number of bars its author had
    /// observed when emitting it. Before the order is applied, the
    /// loop consumes bars until its own `bar_seq` has caught up, so an
    /// order is never priced against market state older than what the
    /// strategy was looking at — regardless of which channel the
    /// scheduler happens to poll first. Select is biased —
    /// cancellation, then orders, then bars — so every queued order is
    /// applied before the clock advances further. After emitting fills
    /// the loop yields once, giving a fill-reactive strategy a
    /// scheduling step before the next event is consumed.
    ///
    /// Terminates when both inputs are closed (the order drain after
    /// bar exhaustion is explicit and bounded by the strategy runner
    /// closing its sender) or on cancellation. Fills applied before
    /// cancellation are always reflected in the outcome.
    pub async fn run(
        mut self,
        mut bar_rx: mpsc::Receiver<Bar>,
        mut order_rx: mpsc::Receiver<SequencedOrder>,
        fill_tx: mpsc::Sender<FillEvent>,
        mut cancel: watch::Receiver<bool>,
    ) -> SimOutcome {
        info!("execution simulator started");
        let mut bars_open = true;
        let mut orders_open = true;
        let mut cancel_open = true;

        while bars_open || orders_open {
            let mut emitted: Vec<FillEvent> = Vec::new();

            tokio::select! {
                biased;
                changed = cancel.changed(), if cancel_open => match changed {
                    Ok(()) => {
                        if *cancel.borrow() {
                            info!("execution simulator cancelled");
                            break;
                        }
                    }
                    // Cancel handle dropped: this session can no longer
                    // be cancelled externally.
                    Err(_) => cancel_open = false,
                },
                maybe_order = order_rx.recv(), if orders_open => match maybe_order {
                    Some(order) => {
                        // Catch up on bars the order's author had
                        // already seen. The replay delivers to this
                        // side first, so they are in the channel.
                        while bars_open && self.bar_seq < order.observed_bar_seq {
                            match bar_rx.recv().await {
                                Some(bar) => emitted.extend(self.on_bar(bar)),
                                None => bars_open = false,
                            }
                        }
                        if let Some(fill) = self.on_order(order.request) {
                            emitted.push(fill);
                        }
                    }
                    None => orders_open = false,
                },
                maybe_bar = bar_rx.recv(), if bars_open => match maybe_bar {
                    Some(bar) => emitted.extend(self.on_bar(bar)),
                    None => bars_open = false,
                },
            }

            if !emitted.is_empty() {
                for fill in emitted {
                    if fill_tx.send(fill).await.is_err() {
                        // Strategy side is gone; the ledger mutation
                        // already happened and stays.
                        break;
                    }
                }
                tokio::task::yield_now().await;
            }
        }

        info!(
            trades = self.metrics.trade_count(),
            resting = self.book.len(),
            "execution simulator draining complete"
        );
        self.into_outcome()
    }
}
