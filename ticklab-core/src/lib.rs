//! TickLab Core: price series, moving statistics, strategies, backtest engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, price series and tick handles, trades, positions)
//! - Raw provider records and their conversion into a series
//! - Trailing-window moving statistics and Bollinger bands
//! - Strategy contract plus two reference strategies
//! - Pluggable per-trade cost models
//! - Replay engine with point-in-time position / PnL / cost queries
//!
//! No I/O happens here; loading, caching and exporting live in `ticklab-runner`.

pub mod cost;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;

/// Error type returned by pluggable strategies and cost models.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use cost::{CostModel, FixedPlusPercent, PercentOfNotional, ZeroCost};
pub use data::{DataError, RawQuote};
pub use domain::{Bar, OrderSide, Position, PriceSeries, Tick, Trade, TradeRecord};
pub use engine::{Backtest, BacktestError, BacktestSummary, TimelinePoint};
pub use strategy::{BollingerStrategy, Monkey, Signal, Strategy};
