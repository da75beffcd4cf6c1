//! Point-in-time accounting over the trade log.
//!
//! Every figure is recomputed from the trade log on each call: a query at
//! `tick_index` only counts trades executed at or before that tick. Nothing is
//! cached, so position and PnL can never drift apart.
//!
//! Identity: `net = gross - cost + mark_to_market(position, close[tick_index])`.

use super::{Backtest, BacktestError};
use crate::domain::{Position, Trade};

impl<'a> Backtest<'a> {
    fn check_index(&self, tick_index: usize) -> Result<(), BacktestError> {
        let len = self.series().len();
        if tick_index >= len {
            return Err(BacktestError::IndexOutOfRange {
                index: tick_index,
                len,
            });
        }
        Ok(())
    }

    /// Trades executed at or before `tick_index`, in order. The log is
    /// chronological, so this is always a prefix of it.
    pub fn trades_through(&self, tick_index: usize) -> &[Trade<'a>] {
        let end = self
            .trades()
            .partition_point(|trade| trade.point.index() <= tick_index);
        &self.trades()[..end]
    }

    /// Position held after the trades up to `tick_index`.
    pub fn position_at(&self, tick_index: usize) -> Result<Position, BacktestError> {
        self.check_index(tick_index)?;
        Ok(net_position(self.trades_through(tick_index)))
    }

    /// Realized cash flow up to `tick_index`: sells add their close, buys subtract it.
    pub fn gross_pnl_at(&self, tick_index: usize) -> Result<f64, BacktestError> {
        self.check_index(tick_index)?;
        Ok(gross_cash_flow(self.trades_through(tick_index)))
    }

    /// Sum of per-trade costs up to `tick_index`.
    pub fn trade_cost_at(&self, tick_index: usize) -> Result<f64, BacktestError> {
        self.check_index(tick_index)?;
        let mut total = 0.0;
        for trade in self.trades_through(tick_index) {
            total += self
                .cost_model()
                .cost(trade.point.close.abs())
                .map_err(|source| BacktestError::Cost {
                    index: trade.point.index(),
                    source,
                })?;
        }
        Ok(total)
    }

    /// Gross minus cost, with any open position valued at this tick's close.
    ///
    /// The mark is a valuation only: no closing trade is registered and no cost
    /// is charged for it.
    pub fn net_pnl_at(&self, tick_index: usize) -> Result<f64, BacktestError> {
        let position = self.position_at(tick_index)?;
        let gross = self.gross_pnl_at(tick_index)?;
        let cost = self.trade_cost_at(tick_index)?;
        let close = self.series().bars()[tick_index].close;
        Ok(gross - cost + position.mark_to_market(close))
    }

    /// Position at the last tick.
    pub fn position(&self) -> Position {
        net_position(self.trades())
    }

    /// Gross PnL at the last tick.
    pub fn gross_pnl(&self) -> f64 {
        gross_cash_flow(self.trades())
    }

    /// Trading cost at the last tick.
    pub fn trade_cost(&self) -> Result<f64, BacktestError> {
        self.trade_cost_at(self.series().last_index())
    }

    /// Net PnL at the last tick.
    pub fn net_pnl(&self) -> Result<f64, BacktestError> {
        self.net_pnl_at(self.series().last_index())
    }

    /// Buy-and-hold benchmark: last close minus first close.
    pub fn passive_pnl(&self) -> f64 {
        let bars = self.series().bars();
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => last.close - first.close,
            _ => 0.0,
        }
    }
}

fn net_position(trades: &[Trade<'_>]) -> Position {
    Position::from_net(trades.iter().map(|trade| trade.order.delta()).sum())
}

fn gross_cash_flow(trades: &[Trade<'_>]) -> f64 {
    let mut gross = 0.0;
    for trade in trades {
        gross += trade.order.cash_flow(trade.point.close);
    }
    gross
}
