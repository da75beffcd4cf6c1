//! Backtest run state and the replay loop.

use tracing::{debug, info};

use super::BacktestError;
use crate::cost::{CostModel, ZeroCost};
use crate::domain::{OrderSide, Position, PriceSeries, Trade};
use crate::strategy::Strategy;

/// One backtest over one series: trade log plus cost model.
///
/// Created once, populated by [`Backtest::run`], then queried at any point in
/// time (see the accounting methods). Running again replaces the trade log.
pub struct Backtest<'a> {
    series: &'a PriceSeries,
    trades: Vec<Trade<'a>>,
    cost: Box<dyn CostModel + 'a>,
    strategy: Option<String>,
}

impl<'a> Backtest<'a> {
    /// New backtest over `series` with zero trading cost.
    pub fn new(series: &'a PriceSeries) -> Result<Self, BacktestError> {
        if series.is_empty() {
            return Err(BacktestError::InvalidInput(format!(
                "series '{}' has no price points",
                series.symbol()
            )));
        }
        Ok(Self {
            series,
            trades: Vec::new(),
            cost: Box::new(ZeroCost),
            strategy: None,
        })
    }

    /// Builder-style [`Backtest::set_cost`].
    pub fn with_cost(mut self, cost: impl CostModel + 'a) -> Self {
        self.set_cost(cost);
        self
    }

    /// Replace the cost model. Costs are derived on query, so this takes effect
    /// for every subsequent query without re-running.
    pub fn set_cost(&mut self, cost: impl CostModel + 'a) {
        self.cost = Box::new(cost);
    }

    pub fn set_boxed_cost(&mut self, cost: Box<dyn CostModel + 'a>) {
        self.cost = cost;
    }

    pub fn series(&self) -> &'a PriceSeries {
        self.series
    }

    pub fn trades(&self) -> &[Trade<'a>] {
        &self.trades
    }

    pub fn cost_model(&self) -> &dyn CostModel {
        self.cost.as_ref()
    }

    /// Name of the strategy last replayed, if any.
    pub fn strategy_name(&self) -> Option<&str> {
        self.strategy.as_deref()
    }

    /// Drop all trades.
    pub fn reset(&mut self) {
        self.trades.clear();
        self.strategy = None;
    }

    /// Replay the series through `strategy`, oldest tick first.
    ///
    /// A buy signal trades unless already long; a sell signal trades unless
    /// already short. Each trade moves the position by exactly one unit.
    /// A strategy error aborts the replay and leaves the trade log empty.
    pub fn run<S>(&mut self, strategy: &mut S) -> Result<&mut Self, BacktestError>
    where
        S: Strategy + ?Sized,
    {
        self.reset();
        let name = strategy.name().to_string();
        let series = self.series;
        let mut position = Position::Flat;

        for tick in series.ticks() {
            let signal = match strategy.signal(tick) {
                Ok(signal) => signal,
                Err(source) => {
                    self.trades.clear();
                    return Err(BacktestError::Strategy {
                        strategy: name,
                        index: tick.index(),
                        source,
                    });
                }
            };

            let Some(order) = signal else { continue };
            let Some(next) = position.after(order) else {
                continue;
            };
            debug!(
                index = tick.index(),
                date = %tick.date,
                %order,
                close = tick.close,
                position = %next,
                "trade"
            );
            self.trades.push(Trade { order, point: tick });
            position = next;
        }

        info!(
            symbol = series.symbol(),
            strategy = %name,
            points = series.len(),
            trades = self.trades.len(),
            position = %position,
            "replay complete"
        );
        self.strategy = Some(name);
        Ok(self)
    }

    /// Append a trade by hand at tick `index`.
    ///
    /// The trade log stays chronological (no trade before the last one) and the
    /// position stays within one unit; anything else is rejected.
    pub fn record(&mut self, order: OrderSide, index: usize) -> Result<(), BacktestError> {
        let point = self.series.get(index).ok_or(BacktestError::IndexOutOfRange {
            index,
            len: self.series.len(),
        })?;
        if let Some(last) = self.trades.last() {
            if last.point.index() > index {
                return Err(BacktestError::InvalidTrade {
                    index,
                    reason: format!("precedes last trade at index {}", last.point.index()),
                });
            }
        }
        let current = self.position();
        if current.after(order).is_none() {
            return Err(BacktestError::InvalidTrade {
                index,
                reason: format!("{order} while already {current}"),
            });
        }
        self.trades.push(Trade { order, point });
        Ok(())
    }
}

impl std::fmt::Debug for Backtest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtest")
            .field("symbol", &self.series.symbol())
            .field("points", &self.series.len())
            .field("strategy", &self.strategy)
            .field("trades", &self.trades.len())
            .field("cost", &self.cost.name())
            .finish()
    }
}
