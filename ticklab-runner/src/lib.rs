//! TickLab Runner: config, quote loading, orchestration, sweeps and exports.
//!
//! This crate builds on `ticklab-core` to provide:
//! - TOML backtest configs with content-addressed run ids
//! - Quote sources and a dated on-disk quote cache
//! - Single-backtest runner producing a serializable result
//! - Parallel Bollinger parameter sweeps
//! - JSON / CSV / Markdown artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, BacktestSection, ConfigError, CostConfig, RunId, StrategyConfig};
pub use data_loader::{
    load_series, read_raw_csv, write_raw_csv, CacheEntry, CsvDirSource, LoadError, QuoteCache,
    QuoteSource,
};
pub use export::{
    export_json, export_timeline_csv, export_trades_csv, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{run_backtest, run_from_config, BacktestResult, BandColumns, RunError, SCHEMA_VERSION};
pub use sweep::{run_sweep, BollingerGrid, ParamSweep, SweepResults};
