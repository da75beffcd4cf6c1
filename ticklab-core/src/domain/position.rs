use std::fmt;

use serde::{Deserialize, Serialize};

use super::trade::OrderSide;

/// Directional exposure: long (+1), flat (0) or short (-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Short,
    #[default]
    Flat,
    Long,
}

impl Position {
    /// Map a net trade count (buys minus sells) to a position.
    ///
    /// Trade logs only ever hold nets in {-1, 0, 1}; the sign is all that is read.
    pub fn from_net(net: i64) -> Self {
        match net.signum() {
            1 => Self::Long,
            -1 => Self::Short,
            _ => Self::Flat,
        }
    }

    pub fn net(self) -> i64 {
        match self {
            Self::Short => -1,
            Self::Flat => 0,
            Self::Long => 1,
        }
    }

    /// Position after one more trade, or `None` if the trade would take the
    /// exposure beyond one unit.
    pub fn after(self, order: OrderSide) -> Option<Self> {
        match (self, order) {
            (Self::Long, OrderSide::Buy) | (Self::Short, OrderSide::Sell) => None,
            (Self::Short, OrderSide::Buy) | (Self::Long, OrderSide::Sell) => Some(Self::Flat),
            (Self::Flat, OrderSide::Buy) => Some(Self::Long),
            (Self::Flat, OrderSide::Sell) => Some(Self::Short),
        }
    }

    /// Sign applied to a close price when marking an open position to market.
    pub fn mark_to_market(self, close: f64) -> f64 {
        match self {
            Self::Long => close,
            Self::Short => -close,
            Self::Flat => 0.0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Short => "short",
            Self::Flat => "flat",
            Self::Long => "long",
        })
    }
}
