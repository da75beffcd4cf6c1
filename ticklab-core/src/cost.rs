//! Trading cost models.
//!
//! A cost model maps the absolute notional of one trade to the cost charged
//! for it. Costs are applied per trade, never to aggregate volume.
//!
//! Any `Fn(f64) -> f64` is a cost model, so
//! `backtest.set_cost(|notional: f64| 0.5 * notional / 100.0)` works directly.

use crate::BoxError;

pub trait CostModel {
    /// Cost of a single trade with absolute notional `notional`.
    fn cost(&self, notional: f64) -> Result<f64, BoxError>;

    /// Name for summaries and logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> CostModel for F
where
    F: Fn(f64) -> f64,
{
    fn cost(&self, notional: f64) -> Result<f64, BoxError> {
        Ok(self(notional))
    }
}

/// Frictionless trading. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCost;

impl CostModel for ZeroCost {
    fn cost(&self, _notional: f64) -> Result<f64, BoxError> {
        Ok(0.0)
    }

    fn name(&self) -> &str {
        "zero"
    }
}

/// Cost as a percentage of notional: `percent * notional / 100`.
#[derive(Debug, Clone)]
pub struct PercentOfNotional {
    pub percent: f64,
    name: String,
}

impl PercentOfNotional {
    pub fn new(percent: f64) -> Self {
        Self {
            percent,
            name: format!("percent_{percent}"),
        }
    }
}

impl CostModel for PercentOfNotional {
    fn cost(&self, notional: f64) -> Result<f64, BoxError> {
        Ok(self.percent * notional / 100.0)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fixed ticket charge plus a percentage of notional.
#[derive(Debug, Clone)]
pub struct FixedPlusPercent {
    pub fixed: f64,
    pub percent: f64,
    name: String,
}

impl FixedPlusPercent {
    pub fn new(fixed: f64, percent: f64) -> Self {
        Self {
            fixed,
            percent,
            name: format!("fixed_{fixed}_plus_percent_{percent}"),
        }
    }
}

impl CostModel for FixedPlusPercent {
    fn cost(&self, notional: f64) -> Result<f64, BoxError> {
        Ok(self.fixed + self.percent * notional / 100.0)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Cost model backed by a fallible closure. Build one with [`try_from_fn`].
pub struct TryCostFn<F> {
    f: F,
}

/// Wrap a fallible closure as a cost model. Errors abort whichever query hit them.
pub fn try_from_fn<F>(f: F) -> TryCostFn<F>
where
    F: Fn(f64) -> Result<f64, BoxError>,
{
    TryCostFn { f }
}

impl<F> CostModel for TryCostFn<F>
where
    F: Fn(f64) -> Result<f64, BoxError>,
{
    fn cost(&self, notional: f64) -> Result<f64, BoxError> {
        (self.f)(notional)
    }
}
