//! Bollinger bands: moving average +/- `width` standard deviations.
//!
//! Uses population stddev (divide by N). NaN until the window is mature.

use super::moving::{moving_average, moving_std_dev};
use crate::domain::Bar;

pub fn upper_band(bars: &[Bar], index: usize, period: usize, width: f64) -> f64 {
    moving_average(bars, index, period) + width * moving_std_dev(bars, index, period)
}

pub fn lower_band(bars: &[Bar], index: usize, period: usize, width: f64) -> f64 {
    moving_average(bars, index, period) - width * moving_std_dev(bars, index, period)
}

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

/// Whole-series band computation, for reporting and charting.
///
/// Values are computed point by point with the same functions strategies use,
/// so a band column always agrees exactly with what a strategy saw.
#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    width: f64,
}

impl Bollinger {
    pub fn new(period: usize, width: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self { period, width }
    }

    pub fn compute(&self, bars: &[Bar], band: BollingerBand) -> Vec<f64> {
        (0..bars.len())
            .map(|i| match band {
                BollingerBand::Upper => upper_band(bars, i, self.period, self.width),
                BollingerBand::Middle => moving_average(bars, i, self.period),
                BollingerBand::Lower => lower_band(bars, i, self.period, self.width),
            })
            .collect()
    }
}
