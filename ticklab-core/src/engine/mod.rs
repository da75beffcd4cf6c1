//! Backtest engine: replay a series through a strategy, then answer
//! position / PnL / cost questions at any tick.

pub mod accounting;
pub mod backtest;
pub mod report;

pub use backtest::Backtest;
pub use report::{BacktestSummary, TimelinePoint};

use thiserror::Error;

use crate::BoxError;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("tick index {index} out of range (series has {len} ticks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot record trade at tick {index}: {reason}")]
    InvalidTrade { index: usize, reason: String },

    #[error("strategy '{strategy}' failed at tick {index}: {source}")]
    Strategy {
        strategy: String,
        index: usize,
        #[source]
        source: BoxError,
    },

    #[error("cost model failed on trade at tick {index}: {source}")]
    Cost {
        index: usize,
        #[source]
        source: BoxError,
    },
}
