//! PriceSeries and the Tick handle.
//!
//! A `PriceSeries` owns its bars in chronological order; bar `i` is the tick with
//! index `i`. Ticks are borrowed handles (`&PriceSeries` + index), so the borrow
//! checker guarantees the series outlives every tick taken from it, and the
//! series cannot be mutated while any tick is alive.

use std::fmt;
use std::ops::Deref;

use chrono::NaiveDate;

use super::bar::Bar;
use crate::data::{DataError, RawQuote};
use crate::indicators;

/// Ordered, immutable daily price history for a single instrument.
///
/// # Invariants
/// - never empty
/// - dates strictly ascending, so index order and date order agree
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from bars already in chronological order.
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(DataError::Empty { symbol });
        }
        for (row, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(DataError::OutOfOrder {
                    row: row + 1,
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    /// Build a series from raw provider records delivered newest-first.
    ///
    /// Records are cast, reversed into chronological order and indexed.
    /// Row numbers in errors refer to the position in `raw`.
    pub fn from_raw(symbol: impl Into<String>, raw: &[RawQuote]) -> Result<Self, DataError> {
        let symbol = symbol.into();
        if raw.is_empty() {
            return Err(DataError::Empty { symbol });
        }
        let bars = raw
            .iter()
            .enumerate()
            .rev()
            .map(|(row, quote)| quote.cast(row))
            .collect::<Result<Vec<_>, _>>()?;

        // Report ordering problems against raw row numbers.
        let last_row = raw.len() - 1;
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(DataError::OutOfOrder {
                    row: last_row - (i + 1),
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Index of the most recent tick.
    pub fn last_index(&self) -> usize {
        self.bars.len().saturating_sub(1)
    }

    /// The underlying bars, oldest first.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Tick at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<Tick<'_>> {
        (index < self.bars.len()).then(|| Tick {
            series: self,
            index,
        })
    }

    pub fn first(&self) -> Option<Tick<'_>> {
        self.get(0)
    }

    pub fn last(&self) -> Option<Tick<'_>> {
        self.get(self.last_index())
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Iterate ticks in chronological order.
    pub fn ticks(&self) -> Ticks<'_> {
        Ticks {
            series: self,
            range: 0..self.bars.len(),
        }
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = Tick<'a>;
    type IntoIter = Ticks<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.ticks()
    }
}

/// Iterator over the ticks of a series.
#[derive(Debug, Clone)]
pub struct Ticks<'a> {
    series: &'a PriceSeries,
    range: std::ops::Range<usize>,
}

impl<'a> Iterator for Ticks<'a> {
    type Item = Tick<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        Some(Tick {
            series: self.series,
            index,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for Ticks<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.range.next_back()?;
        Some(Tick {
            series: self.series,
            index,
        })
    }
}

impl ExactSizeIterator for Ticks<'_> {}

/// A price point: one bar plus its position in the owning series.
///
/// Derefs to the underlying [`Bar`], so `tick.close` reads the close price.
/// Windowed statistics look back through the owning series, never forward.
#[derive(Clone, Copy)]
pub struct Tick<'a> {
    series: &'a PriceSeries,
    index: usize,
}

impl<'a> Tick<'a> {
    /// Zero-based position within the owning series.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn series(&self) -> &'a PriceSeries {
        self.series
    }

    pub fn bar(&self) -> &'a Bar {
        &self.series.bars[self.index]
    }

    /// Mean close over the trailing `period` ticks ending here. NaN while the
    /// window is immature.
    pub fn moving_average(&self, period: usize) -> f64 {
        indicators::moving_average(&self.series.bars, self.index, period)
    }

    /// Population standard deviation of close over the trailing window.
    pub fn moving_std_dev(&self, period: usize) -> f64 {
        indicators::moving_std_dev(&self.series.bars, self.index, period)
    }

    pub fn upper_band(&self, period: usize, width: f64) -> f64 {
        indicators::upper_band(&self.series.bars, self.index, period, width)
    }

    pub fn lower_band(&self, period: usize, width: f64) -> f64 {
        indicators::lower_band(&self.series.bars, self.index, period, width)
    }
}

impl Deref for Tick<'_> {
    type Target = Bar;

    fn deref(&self) -> &Bar {
        self.bar()
    }
}

impl fmt::Debug for Tick<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bar = self.bar();
        f.debug_struct("Tick")
            .field("series", &self.series.symbol)
            .field("index", &self.index)
            .field("date", &bar.date)
            .field("open", &bar.open)
            .field("high", &bar.high)
            .field("low", &bar.low)
            .field("close", &bar.close)
            .field("volume", &bar.volume)
            .field("adj_close", &bar.adj_close)
            .finish()
    }
}

impl PartialEq for Tick<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.series, other.series) && self.index == other.index
    }
}
