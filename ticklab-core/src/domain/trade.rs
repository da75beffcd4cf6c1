//! Trades: one executed order at one tick.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::Tick;

/// Side of an order: a buy is a cash outflow, a sell a cash inflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Change in net position: +1 for a buy, -1 for a sell.
    pub fn delta(self) -> i64 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }

    /// Cash flow of one unit traded at `price`: `-price` for a buy, `+price` for a sell.
    pub fn cash_flow(self, price: f64) -> f64 {
        match self {
            Self::Buy => -price,
            Self::Sell => price,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        })
    }
}

/// An executed trade. Borrows the tick it executed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade<'a> {
    pub order: OrderSide,
    pub point: Tick<'a>,
}

impl Trade<'_> {
    /// Owned, serializable copy for reporting.
    pub fn to_record(&self) -> TradeRecord {
        TradeRecord {
            index: self.point.index(),
            date: self.point.date,
            order: self.order,
            close: self.point.close,
        }
    }
}

/// Detached trade row, as exported to JSON/CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub index: usize,
    pub date: NaiveDate,
    pub order: OrderSide,
    pub close: f64,
}
