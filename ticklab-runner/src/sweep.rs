//! Parameter sweep over Bollinger (period, width) grids.
//!
//! Every run shares one immutable `PriceSeries`; each owns its own
//! `Backtest`, strategy and cost model, so runs are independent and can be
//! evaluated in parallel.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ticklab_core::PriceSeries;

use crate::config::{BacktestConfig, StrategyConfig};
use crate::runner::{run_backtest, BacktestResult, RunError};

/// Bollinger parameter grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BollingerGrid {
    pub periods: Vec<usize>,
    pub widths: Vec<f64>,
}

impl BollingerGrid {
    /// Periods 10..=50 step 10, widths 1.0, 1.5, 2.0.
    pub fn default_grid() -> Self {
        Self {
            periods: vec![10, 20, 30, 40, 50],
            widths: vec![1.0, 1.5, 2.0],
        }
    }

    /// Returns the total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.periods.len() * self.widths.len()
    }

    /// One config per (period, width), period-major. Everything other than
    /// the strategy is copied from `base`.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &period in &self.periods {
            for &width in &self.widths {
                let mut config = base.clone();
                config.strategy = StrategyConfig::Bollinger { period, width };
                configs.push(config);
            }
        }
        configs
    }
}

/// Parameter sweep executor.
pub struct ParamSweep<'a> {
    series: &'a PriceSeries,
    parallel: bool,
}

impl<'a> ParamSweep<'a> {
    pub fn new(series: &'a PriceSeries) -> Self {
        Self {
            series,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every config in the grid. The first failing run aborts the sweep.
    pub fn sweep(
        &self,
        grid: &BollingerGrid,
        base: &BacktestConfig,
    ) -> Result<SweepResults, RunError> {
        let configs = grid.generate_configs(base);
        info!(
            symbol = self.series.symbol(),
            runs = configs.len(),
            parallel = self.parallel,
            "starting sweep"
        );

        let run = |config: &BacktestConfig| -> Result<BacktestResult, RunError> {
            let result = run_backtest(config, self.series)?;
            debug!(strategy = %result.strategy, net = result.summary.net, "sweep run done");
            Ok(result)
        };
        let results: Vec<BacktestResult> = if self.parallel {
            configs.par_iter().map(run).collect::<Result<_, RunError>>()?
        } else {
            configs.iter().map(run).collect::<Result<_, RunError>>()?
        };

        let results = SweepResults::new(results);
        if let Some(best) = results.best() {
            info!(
                best = %best.strategy,
                net = best.summary.net,
                "sweep complete"
            );
        }
        Ok(results)
    }
}

/// Sweep a grid in parallel over `series`.
pub fn run_sweep(
    grid: &BollingerGrid,
    base: &BacktestConfig,
    series: &PriceSeries,
) -> Result<SweepResults, RunError> {
    ParamSweep::new(series).sweep(grid, base)
}

/// Results from a parameter sweep, ordered by net PnL (best first).
///
/// Ties keep grid order.
#[derive(Debug)]
pub struct SweepResults {
    results: Vec<BacktestResult>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(mut results: Vec<BacktestResult>) -> Self {
        results.sort_by(|a, b| b.summary.net.total_cmp(&a.summary.net));
        let by_run_id = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { results, by_run_id }
    }

    /// All results, best first.
    pub fn all(&self) -> &[BacktestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Gets a result by RunId.
    pub fn get(&self, run_id: &str) -> Option<&BacktestResult> {
        self.by_run_id.get(run_id).map(|&i| &self.results[i])
    }

    /// Returns the top N results by net PnL.
    pub fn top_n(&self, n: usize) -> &[BacktestResult] {
        &self.results[..n.min(self.results.len())]
    }

    pub fn best(&self) -> Option<&BacktestResult> {
        self.results.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BacktestSection, CostConfig};
    use chrono::NaiveDate;
    use ticklab_core::Bar;

    fn make_base_config() -> BacktestConfig {
        BacktestConfig {
            backtest: BacktestSection {
                symbol: "GOOG".into(),
                data_dir: "quotes".into(),
                cache_dir: "cache".into(),
            },
            strategy: StrategyConfig::Monkey {
                frequency: 1,
                seed: Some(1),
            },
            cost: CostConfig::Percent { percent: 0.5 },
        }
    }

    fn make_series() -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2012, 1, 2).unwrap();
        let bars = (0..120)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin() * 5.0;
                Bar {
                    date: base + chrono::Duration::days(i),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 100,
                    adj_close: close,
                }
            })
            .collect();
        PriceSeries::from_bars("GOOG", bars).unwrap()
    }

    #[test]
    fn test_grid_size() {
        let grid = BollingerGrid {
            periods: vec![10, 20],
            widths: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(grid.size(), 6);
        assert_eq!(BollingerGrid::default_grid().size(), 15);
    }

    #[test]
    fn test_generate_configs_keeps_base() {
        let grid = BollingerGrid {
            periods: vec![10, 20],
            widths: vec![1.0],
        };
        let base = make_base_config();
        let configs = grid.generate_configs(&base);
        assert_eq!(configs.len(), 2);
        assert_eq!(
            configs[1].strategy,
            StrategyConfig::Bollinger {
                period: 20,
                width: 1.0
            }
        );
        assert!(configs.iter().all(|c| c.cost == base.cost));
        assert!(configs.iter().all(|c| c.backtest == base.backtest));
    }

    #[test]
    fn test_results_sorted_by_net_descending() {
        let series = make_series();
        let grid = BollingerGrid {
            periods: vec![5, 10, 20],
            widths: vec![0.5, 1.0],
        };
        let results = run_sweep(&grid, &make_base_config(), &series).unwrap();
        assert_eq!(results.len(), 6);
        for pair in results.all().windows(2) {
            assert!(pair[0].summary.net >= pair[1].summary.net);
        }
        assert_eq!(results.top_n(2).len(), 2);
        assert_eq!(results.top_n(100).len(), 6);

        let best = results.best().unwrap();
        assert_eq!(results.get(&best.run_id).unwrap(), best);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let series = make_series();
        let grid = BollingerGrid {
            periods: vec![5, 10],
            widths: vec![1.0, 2.0],
        };
        let base = make_base_config();
        let parallel = ParamSweep::new(&series).sweep(&grid, &base).unwrap();
        let sequential = ParamSweep::new(&series)
            .with_parallelism(false)
            .sweep(&grid, &base)
            .unwrap();
        assert_eq!(parallel.all(), sequential.all());
    }

    #[test]
    fn test_invalid_grid_point_fails_sweep() {
        let series = make_series();
        let grid = BollingerGrid {
            periods: vec![0],
            widths: vec![1.0],
        };
        assert!(matches!(
            run_sweep(&grid, &make_base_config(), &series).unwrap_err(),
            RunError::Config(_)
        ));
    }
}
