//! Reporting views over a finished backtest: headline summary and the
//! per-tick timeline charting layers consume.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Backtest, BacktestError};
use crate::domain::Position;

/// Headline figures as of the last tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub trades: usize,
    pub position: Position,
    pub gross: f64,
    pub cost: f64,
    pub net: f64,
    pub passive: f64,
}

impl fmt::Display for BacktestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Backtest(trades={}, position={}, gross={:.2}, cost={:.2}, net={:.2}, passive={:.2})",
            self.trades, self.position, self.gross, self.cost, self.net, self.passive
        )
    }
}

/// Position and PnL as of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub index: usize,
    pub date: NaiveDate,
    pub close: f64,
    pub position: Position,
    pub gross: f64,
    pub cost: f64,
    pub net: f64,
}

impl Backtest<'_> {
    pub fn summary(&self) -> Result<BacktestSummary, BacktestError> {
        Ok(BacktestSummary {
            trades: self.trades().len(),
            position: self.position(),
            gross: self.gross_pnl(),
            cost: self.trade_cost()?,
            net: self.net_pnl()?,
            passive: self.passive_pnl(),
        })
    }

    /// One point per tick, each computed with the point-in-time queries.
    pub fn timeline(&self) -> Result<Vec<TimelinePoint>, BacktestError> {
        self.series()
            .ticks()
            .map(|tick| {
                let index = tick.index();
                Ok(TimelinePoint {
                    index,
                    date: tick.date,
                    close: tick.close,
                    position: self.position_at(index)?,
                    gross: self.gross_pnl_at(index)?,
                    cost: self.trade_cost_at(index)?,
                    net: self.net_pnl_at(index)?,
                })
            })
            .collect()
    }
}
