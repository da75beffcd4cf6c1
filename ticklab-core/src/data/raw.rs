//! Raw quote records as delivered by a quote provider.
//!
//! Providers hand back text rows in the `Date,Open,High,Low,Close,Volume,Adj Close`
//! layout, newest first. Casting to typed bars happens here; ordering and
//! indexing happen in `PriceSeries::from_raw`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// One raw daily record, fields kept as the provider's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: String,
    #[serde(rename = "High")]
    pub high: String,
    #[serde(rename = "Low")]
    pub low: String,
    #[serde(rename = "Close")]
    pub close: String,
    #[serde(rename = "Volume")]
    pub volume: String,
    #[serde(rename = "Adj Close")]
    pub adj_close: String,
}

/// Errors building a price series from raw records.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no price data for '{symbol}'")]
    Empty { symbol: String },

    #[error("malformed {field} in row {row}: {value:?}")]
    Malformed {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("row {row}: date {current} does not follow {previous}")]
    OutOfOrder {
        row: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
}

impl RawQuote {
    /// Cast the text fields into a typed bar. `row` is only used for error reporting.
    pub fn cast(&self, row: usize) -> Result<Bar, DataError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            DataError::Malformed {
                row,
                field: "date",
                value: self.date.clone(),
            }
        })?;
        Ok(Bar {
            date,
            open: parse_price(row, "open", &self.open)?,
            high: parse_price(row, "high", &self.high)?,
            low: parse_price(row, "low", &self.low)?,
            close: parse_price(row, "close", &self.close)?,
            volume: parse_volume(row, &self.volume)?,
            adj_close: parse_price(row, "adj_close", &self.adj_close)?,
        })
    }
}

fn parse_price(row: usize, field: &'static str, value: &str) -> Result<f64, DataError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::Malformed {
            row,
            field,
            value: value.to_string(),
        })
}

/// Volumes are integers, but some providers emit them as `"1200.0"`.
fn parse_volume(row: usize, value: &str) -> Result<u64, DataError> {
    let trimmed = value.trim();
    if let Ok(v) = trimmed.parse::<u64>() {
        return Ok(v);
    }
    trimmed
        .parse::<f64>()
        .ok()
        // u64::MAX rounds up to 2^64 as f64, so the bound is exclusive.
        .filter(|v| v.is_finite() && *v >= 0.0 && *v < u64::MAX as f64 && v.fract() == 0.0)
        .map(|v| v as u64)
        .ok_or_else(|| DataError::Malformed {
            row,
            field: "volume",
            value: value.to_string(),
        })
}
