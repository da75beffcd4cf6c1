//! Bar: one day of OHLCV data for the series' instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar, typed and in chronological position within its series.
///
/// The `adj_close` column is carried for reference; every calculation in the
/// engine runs on `close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}
