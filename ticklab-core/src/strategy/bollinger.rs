//! Band-crossing strategy: buy above the upper Bollinger band, sell below the lower.

use super::{Signal, Strategy};
use crate::domain::{OrderSide, Tick};
use crate::BoxError;

#[derive(Debug, Clone)]
pub struct BollingerStrategy {
    period: usize,
    width: f64,
    name: String,
}

impl BollingerStrategy {
    /// `period` is the moving-average window, `width` the band half-width in
    /// standard deviations.
    pub fn new(period: usize, width: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            width,
            name: format!("bollinger_{period}_{width}"),
        }
    }

    /// Pure evaluation. An immature window gives NaN bands, and every
    /// comparison against NaN is false, so no signal fires before `period` ticks.
    pub fn evaluate(&self, tick: Tick<'_>) -> Signal {
        if tick.close > tick.upper_band(self.period, self.width) {
            Some(OrderSide::Buy)
        } else if tick.close < tick.lower_band(self.period, self.width) {
            Some(OrderSide::Sell)
        } else {
            None
        }
    }
}

impl Strategy for BollingerStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn signal(&mut self, tick: Tick<'_>) -> Result<Signal, BoxError> {
        Ok(self.evaluate(tick))
    }
}
