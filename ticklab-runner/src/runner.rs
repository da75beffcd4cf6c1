//! Backtest runner: wires config, quote loading and the engine together.
//!
//! Two entry points:
//! - `run_backtest()`: takes an already loaded series. Used by sweeps.
//! - `run_from_config()`: loads the series through the cache, then runs. Used by the CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use ticklab_core::indicators::{Bollinger, BollingerBand};
use ticklab_core::{
    Backtest, BacktestError, BacktestSummary, PriceSeries, TimelinePoint, Trade, TradeRecord,
};

use crate::config::{BacktestConfig, ConfigError, RunId, StrategyConfig};
use crate::data_loader::{load_series, CsvDirSource, LoadError, QuoteCache};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
    #[error("config is for '{expected}' but the series is '{actual}'")]
    SymbolMismatch { expected: String, actual: String },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: BacktestConfig,
    pub symbol: String,
    pub strategy: String,
    pub cost_model: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub points: usize,
    pub summary: BacktestSummary,
    pub trades: Vec<TradeRecord>,
    pub timeline: Vec<TimelinePoint>,
    /// Band columns the strategy traded against, when it trades bands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<BandColumns>,
}

/// Per-tick Bollinger bands. `None` where the window is immature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandColumns {
    pub period: usize,
    pub width: f64,
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

impl BandColumns {
    fn compute(series: &PriceSeries, period: usize, width: f64) -> Self {
        let bollinger = Bollinger::new(period, width);
        let column = |band| -> Vec<Option<f64>> {
            bollinger
                .compute(series.bars(), band)
                .into_iter()
                .map(|v| (!v.is_nan()).then_some(v))
                .collect()
        };
        Self {
            period,
            width,
            middle: column(BollingerBand::Middle),
            upper: column(BollingerBand::Upper),
            lower: column(BollingerBand::Lower),
        }
    }
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run one backtest over a pre-loaded series, without I/O.
///
/// The series is only borrowed, so many runs (e.g. a sweep) can share it.
pub fn run_backtest(
    config: &BacktestConfig,
    series: &PriceSeries,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    if config.backtest.symbol != series.symbol() {
        return Err(RunError::SymbolMismatch {
            expected: config.backtest.symbol.clone(),
            actual: series.symbol().to_string(),
        });
    }

    let mut strategy = config.strategy.build();
    let mut backtest = Backtest::new(series)?;
    backtest.set_boxed_cost(config.cost.build());
    backtest.run(strategy.as_mut())?;

    let summary = backtest.summary()?;
    let timeline = backtest.timeline()?;
    let trades = backtest.trades().iter().map(Trade::to_record).collect();
    let bands = match config.strategy {
        StrategyConfig::Bollinger { period, width } => {
            Some(BandColumns::compute(series, period, width))
        }
        StrategyConfig::Monkey { .. } => None,
    };

    let result = BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        config: config.clone(),
        symbol: series.symbol().to_string(),
        strategy: strategy.name().to_string(),
        cost_model: backtest.cost_model().name().to_string(),
        first_date: series.bars()[0].date,
        last_date: series.bars()[series.last_index()].date,
        points: series.len(),
        summary,
        trades,
        timeline,
        bands,
    };

    info!(
        run_id = %result.run_id,
        symbol = %result.symbol,
        strategy = %result.strategy,
        cost = %result.cost_model,
        trades = result.summary.trades,
        net = result.summary.net,
        "backtest complete"
    );
    Ok(result)
}

/// Load the configured series through today's cache entry, then run.
pub fn run_from_config(
    config: &BacktestConfig,
    day: NaiveDate,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let source = CsvDirSource::new(&config.backtest.data_dir);
    let cache = QuoteCache::new(&config.backtest.cache_dir);
    let series = load_series(&config.backtest.symbol, &source, &cache, day)?;
    run_backtest(config, &series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BacktestSection, CostConfig};
    use ticklab_core::Bar;

    fn series(closes: &[f64]) -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2012, 5, 25).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: base + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 100,
                adj_close: close,
            })
            .collect();
        PriceSeries::from_bars("GOOG", bars).unwrap()
    }

    fn config(strategy: StrategyConfig) -> BacktestConfig {
        BacktestConfig {
            backtest: BacktestSection {
                symbol: "GOOG".into(),
                data_dir: "quotes".into(),
                cache_dir: "cache".into(),
            },
            strategy,
            cost: CostConfig::Zero,
        }
    }

    #[test]
    fn result_captures_reporting_contract() {
        let series = series(&[10.0, 10.0, 10.0, 20.0, 5.0, 10.0]);
        let config = config(StrategyConfig::Bollinger {
            period: 3,
            width: 1.0,
        });
        let result = run_backtest(&config, &series).unwrap();

        assert_eq!(result.schema_version, SCHEMA_VERSION);
        assert_eq!(result.symbol, "GOOG");
        assert_eq!(result.strategy, "bollinger_3_1");
        assert_eq!(result.cost_model, "zero");
        assert_eq!(result.points, 6);
        assert_eq!(result.timeline.len(), 6);
        assert_eq!(result.trades.len(), result.summary.trades);
        assert_eq!(result.first_date, NaiveDate::from_ymd_opt(2012, 5, 25).unwrap());
        assert_eq!(result.last_date, NaiveDate::from_ymd_opt(2012, 5, 30).unwrap());
        assert_eq!(result.timeline.last().unwrap().net, result.summary.net);

        let bands = result.bands.unwrap();
        assert_eq!(bands.upper.len(), 6);
        assert_eq!(bands.upper[1], None);
        assert_eq!(bands.middle[2], Some(10.0));
    }

    #[test]
    fn monkey_results_have_no_bands() {
        let series = series(&[1.0, 2.0, 3.0]);
        let config = config(StrategyConfig::Monkey {
            frequency: 1,
            seed: Some(7),
        });
        let result = run_backtest(&config, &series).unwrap();
        assert!(result.bands.is_none());
        assert_eq!(result.strategy, "monkey_1");
    }

    #[test]
    fn rejects_symbol_mismatch() {
        let series = series(&[1.0, 2.0]);
        let mut config = config(StrategyConfig::Bollinger {
            period: 2,
            width: 1.0,
        });
        config.backtest.symbol = "AAPL".into();
        assert!(matches!(
            run_backtest(&config, &series).unwrap_err(),
            RunError::SymbolMismatch { .. }
        ));
    }

    #[test]
    fn rejects_invalid_config_before_running() {
        let series = series(&[1.0, 2.0]);
        let config = config(StrategyConfig::Bollinger {
            period: 0,
            width: 1.0,
        });
        assert!(matches!(
            run_backtest(&config, &series).unwrap_err(),
            RunError::Config(_)
        ));
    }
}
