//! The open order book: resting sells awaiting a triggering bar.
//!
//! An ordered sequence in insertion order, not a priority queue. Every
//! bar scans the whole book front to back; an order may rest across
//! many bars. No deduplication — two identical sells are two orders.

use uuid::Uuid;

/// A sell that did not fill on arrival.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestingOrder {
    pub order_id: Uuid,
    pub symbol: String,
    pub qty_micros: i64,
    pub limit_price_micros: i64,
    /// Sequence number of the bar during/after which this order was
    /// queued; the order may only trigger on bars with a strictly
    /// greater sequence. This is what rules out same-bar fills.
    pub armed_after_seq: u64,
}

/// Insertion-ordered book of resting orders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpenOrderBook {
    orders: Vec<RestingOrder>,
}

impl OpenOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: RestingOrder) {
        self.orders.push(order);
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&RestingOrder> {
        self.orders.get(i)
    }

    /// Remove and return the order at `i`, preserving the relative
    /// order of everything behind it.
    pub fn remove(&mut self, i: usize) -> RestingOrder {
        self.orders.remove(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestingOrder> {
        self.orders.iter()
    }
}
