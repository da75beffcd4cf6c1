//! Trailing-window mean and standard deviation of close prices.
//!
//! The window for `(index, period)` is `bars[index + 1 - period ..= index]`.
//! When fewer than `period` bars exist up to `index` (or `period` is zero) the
//! result is NaN: there is data, just not enough of it.

use crate::domain::Bar;

/// The trailing window ending at `index`, or `None` if it is immature.
pub(crate) fn window(bars: &[Bar], index: usize, period: usize) -> Option<&[Bar]> {
    if period == 0 || index >= bars.len() || index + 1 < period {
        return None;
    }
    Some(&bars[index + 1 - period..=index])
}

fn mean(window: &[Bar]) -> f64 {
    let sum: f64 = window.iter().map(|bar| bar.close).sum();
    sum / window.len() as f64
}

/// Mean close over the trailing `period` bars ending at `index`.
pub fn moving_average(bars: &[Bar], index: usize, period: usize) -> f64 {
    window(bars, index, period).map_or(f64::NAN, mean)
}

/// Population standard deviation (divide by N) of close over the trailing window.
pub fn moving_std_dev(bars: &[Bar], index: usize, period: usize) -> f64 {
    let Some(window) = window(bars, index, period) else {
        return f64::NAN;
    };
    let mean = mean(window);
    let variance = window
        .iter()
        .map(|bar| {
            let diff = bar.close - mean;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn immature_window_is_nan() {
        let bars = make_bars(&[4.0, 8.0, 12.0]);
        assert!(moving_average(&bars, 0, 2).is_nan());
        assert!(moving_std_dev(&bars, 0, 2).is_nan());
        assert!(moving_average(&bars, 2, 4).is_nan());
        assert!(moving_std_dev(&bars, 2, 4).is_nan());
    }

    #[test]
    fn zero_period_is_nan() {
        let bars = make_bars(&[4.0, 8.0]);
        assert!(moving_average(&bars, 1, 0).is_nan());
        assert!(moving_std_dev(&bars, 1, 0).is_nan());
    }

    #[test]
    fn index_past_end_is_nan() {
        let bars = make_bars(&[4.0, 8.0]);
        assert!(moving_average(&bars, 2, 1).is_nan());
    }

    #[test]
    fn average_over_trailing_window() {
        let bars = make_bars(&[4.0, 8.0, 12.0]);
        assert_eq!(moving_average(&bars, 1, 2), 6.0);
        assert_eq!(moving_average(&bars, 2, 2), 10.0);
        assert_eq!(moving_average(&bars, 2, 3), 8.0);
    }

    #[test]
    fn std_dev_is_population() {
        let bars = make_bars(&[4.0, 8.0, 12.0]);
        // population std of [4, 8] and [8, 12] is 2, sample std would be ~2.83
        assert_eq!(moving_std_dev(&bars, 1, 2), 2.0);
        assert_eq!(moving_std_dev(&bars, 2, 2), 2.0);
        assert_approx(
            moving_std_dev(&bars, 2, 3),
            (32.0_f64 / 3.0).sqrt(),
            DEFAULT_EPSILON,
        );
    }

    #[test]
    fn period_one_is_close_with_zero_spread() {
        let bars = make_bars(&[100.0, 200.0]);
        assert_eq!(moving_average(&bars, 0, 1), 100.0);
        assert_eq!(moving_std_dev(&bars, 1, 1), 0.0);
    }
}
