//! Domain types: bars, the price series and its ticks, trades, positions.

pub mod bar;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use position::Position;
pub use series::{PriceSeries, Tick, Ticks};
pub use trade::{OrderSide, Trade, TradeRecord};
