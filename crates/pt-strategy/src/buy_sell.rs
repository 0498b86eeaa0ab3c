//! Buy once, then ask for a fixed markup.

use pt_schemas::{Bar, FillEvent, OrderRequest, Side};

use crate::Strategy;

/// Buys a fixed quantity on the first bar it sees, then places a sell
/// limit at the buy's fill price plus a configured offset as soon as
/// that fill arrives. One round trip per session.
pub struct BuyThenSellLimit {
    qty_micros: i64,
    offset_micros: i64,
    bought: bool,
    sell_placed: bool,
}

impl BuyThenSellLimit {
    pub fn new(qty_micros: i64, offset_micros: i64) -> Self {
        Self {
            qty_micros,
            offset_micros,
            bought: false,
            sell_placed: false,
        }
    }
}

impl Strategy for BuyThenSellLimit {
    fn name(&self) -> &str {
        "buy-then-sell-limit"
    }

    fn on_bar(&mut self, bar: &Bar) -> Vec<OrderRequest> {
        if self.bought {
            return Vec::new();
        }
        self.bought = true;
        vec![OrderRequest::market_buy(bar.symbol.clone(), self.qty_micros)]
    }

    fn on_fill(&mut self, fill: &FillEvent) -> Vec<OrderRequest> {
        if fill.side != Side::Buy || self.sell_placed {
            return Vec::new();
        }
        self.sell_placed = true;
        let limit = fill.price_micros.saturating_add(self.offset_micros);
        vec![OrderRequest::limit_sell(
            fill.symbol.clone(),
            fill.qty_micros,
            limit,
        )]
    }
}
