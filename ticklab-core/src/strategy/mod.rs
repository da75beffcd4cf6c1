//! Strategy contract: tick in, trading signal out.
//!
//! Strategies see a tick and, through it, the history of its series. They never
//! see the trade log or the current position; the engine alone decides whether
//! a signal becomes a trade.

pub mod bollinger;
pub mod monkey;

pub use bollinger::BollingerStrategy;
pub use monkey::Monkey;

use crate::domain::{OrderSide, Tick};
use crate::BoxError;

/// What a strategy wants at a tick: buy, sell, or nothing (`None`).
pub type Signal = Option<OrderSide>;

/// A trading strategy.
///
/// `signal` takes `&mut self` so strategies may keep private state (an RNG,
/// a counter). Errors are not recovered by the engine: the first one aborts
/// the replay.
pub trait Strategy {
    /// Human-readable name (e.g., "bollinger_30_1").
    fn name(&self) -> &str;

    /// Evaluate the strategy at `tick`. Must only look at `tick` and earlier ticks.
    fn signal(&mut self, tick: Tick<'_>) -> Result<Signal, BoxError>;
}

/// Strategy backed by a closure. Build one with [`from_fn`].
pub struct FnStrategy<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named strategy.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnStrategy<F>
where
    F: FnMut(Tick<'_>) -> Result<Signal, BoxError>,
{
    FnStrategy {
        name: name.into(),
        f,
    }
}

impl<F> Strategy for FnStrategy<F>
where
    F: FnMut(Tick<'_>) -> Result<Signal, BoxError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn signal(&mut self, tick: Tick<'_>) -> Result<Signal, BoxError> {
        (self.f)(tick)
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn signal(&mut self, tick: Tick<'_>) -> Result<Signal, BoxError> {
        (**self).signal(tick)
    }
}
