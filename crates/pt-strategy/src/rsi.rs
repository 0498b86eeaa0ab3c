//! RSI mean-reversion entry with a fixed take-profit exit.

use pt_schemas::{Bar, FillEvent, OrderRequest, Side};

use crate::Strategy;

/// Wilder-smoothed RSI over bar closes. Floating point stays inside
/// the indicator; every price and size that reaches an order is
/// integer micros.
#[derive(Debug, Default)]
struct WilderRsi {
    period: u32,
    prev_close: Option<i64>,
    seed_gains: f64,
    seed_losses: f64,
    seeded: u32,
    avg_gain: f64,
    avg_loss: f64,
}

impl WilderRsi {
    fn new(period: u32) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// Feed one close; returns the RSI once `period` deltas have been
    /// observed.
    fn update(&mut self, close_micros: i64) -> Option<f64> {
        let prev = match self.prev_close.replace(close_micros) {
            Some(p) => p,
            None => return None,
        };
        let delta = (close_micros - prev) as f64;
        let (gain, loss) = if delta >= 0.0 { (delta, 0.0) } else { (0.0, -delta) };

        if self.seeded < self.period {
            self.seed_gains += gain;
            self.seed_losses += loss;
            self.seeded += 1;
            if self.seeded < self.period {
                return None;
            }
            self.avg_gain = self.seed_gains / self.period as f64;
            self.avg_loss = self.seed_losses / self.period as f64;
        } else {
            let n = self.period as f64;
            self.avg_gain = (self.avg_gain * (n - 1.0) + gain) / n;
            self.avg_loss = (self.avg_loss * (n - 1.0) + loss) / n;
        }

        if self.avg_loss == 0.0 {
            return Some(100.0);
        }
        let rs = self.avg_gain / self.avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

/// Enters with a fixed notional when RSI crosses up through the
/// oversold threshold, exits with a sell limit at the entry price
/// marked up by `take_profit_bps` basis points. At most one position
/// open at a time; re-arms after the exit fills.
pub struct RsiBullish {
    rsi: WilderRsi,
    oversold: f64,
    notional_micros: i64,
    take_profit_bps: i64,
    prev_rsi: Option<f64>,
    in_position: bool,
}

impl RsiBullish {
    pub fn new(period: u32, oversold: f64, notional_micros: i64, take_profit_bps: i64) -> Self {
        Self {
            rsi: WilderRsi::new(period),
            oversold,
            notional_micros,
            take_profit_bps,
            prev_rsi: None,
            in_position: false,
        }
    }

    fn take_profit_limit(&self, entry_micros: i64) -> i64 {
        let markup = (entry_micros as i128 * self.take_profit_bps as i128) / 10_000;
        (entry_micros as i128 + markup).clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

impl Strategy for RsiBullish {
    fn name(&self) -> &str {
        "rsi-bullish"
    }

    fn on_bar(&mut self, bar: &Bar) -> Vec<OrderRequest> {
        let Some(rsi) = self.rsi.update(bar.close_micros) else {
            return Vec::new();
        };
        let prev = self.prev_rsi.replace(rsi);

        let crossed_up = matches!(prev, Some(p) if p < self.oversold && rsi >= self.oversold);
        if crossed_up && !self.in_position {
            self.in_position = true;
            return vec![OrderRequest::notional_buy(
                bar.symbol.clone(),
                self.notional_micros,
            )];
        }
        Vec::new()
    }

    fn on_fill(&mut self, fill: &FillEvent) -> Vec<OrderRequest> {
        match fill.side {
            Side::Buy => {
                let limit = self.take_profit_limit(fill.price_micros);
                vec![OrderRequest::limit_sell(
                    fill.symbol.clone(),
                    fill.qty_micros,
                    limit,
                )]
            }
            Side::Sell => {
                self.in_position = false;
                Vec::new()
            }
        }
    }
}
