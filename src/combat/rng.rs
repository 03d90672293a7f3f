//! Seeded random number generator for deterministic simulation.
//!
//! When a seed is provided (e.g., via the scenario config), the same seed will
//! always produce the same run. Without a seed, uses system entropy.

use rand::prelude::*;
use rand::rngs::StdRng;

pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f64 in the range [0.0, 1.0)
    pub fn real(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Bernoulli trial. Chances outside [0, 1] are clamped.
    pub fn roll(&mut self, chance: f64) -> bool {
        if chance <= 0.0 {
            return false;
        }
        if chance >= 1.0 {
            return true;
        }
        self.rng.gen_bool(chance)
    }

    /// Uniform index in `0..=max`.
    pub fn index_inclusive(&mut self, max: usize) -> usize {
        self.rng.gen_range(0..=max)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
