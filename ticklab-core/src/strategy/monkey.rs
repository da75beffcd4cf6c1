//! Periodic-random strategy.
//!
//! Every `frequency` ticks it draws uniformly from {buy, sell, nothing}; in
//! between it stays silent. Useful as a no-skill baseline.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{Signal, Strategy};
use crate::domain::{OrderSide, Tick};
use crate::BoxError;

const CHOICES: [Signal; 3] = [Some(OrderSide::Buy), Some(OrderSide::Sell), None];

#[derive(Debug, Clone)]
pub struct Monkey {
    frequency: usize,
    rng: StdRng,
    name: String,
}

impl Monkey {
    /// Monkey seeded from OS entropy; every run differs.
    pub fn new(frequency: usize) -> Self {
        Self::with_rng(frequency, StdRng::from_entropy())
    }

    /// Deterministic monkey: the same seed yields the same signals.
    pub fn seeded(frequency: usize, seed: u64) -> Self {
        Self::with_rng(frequency, StdRng::seed_from_u64(seed))
    }

    fn with_rng(frequency: usize, rng: StdRng) -> Self {
        assert!(frequency >= 1, "Monkey frequency must be >= 1");
        Self {
            frequency,
            rng,
            name: format!("monkey_{frequency}"),
        }
    }
}

impl Strategy for Monkey {
    fn name(&self) -> &str {
        &self.name
    }

    fn signal(&mut self, tick: Tick<'_>) -> Result<Signal, BoxError> {
        if tick.index() % self.frequency != 0 {
            return Ok(None);
        }
        Ok(CHOICES.choose(&mut self.rng).copied().flatten())
    }
}
