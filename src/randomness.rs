//! Randomness Sources - Winner Draw Indices
//!
//! The pool needs exactly one primitive: draw a single index uniformly over
//! the current entrant count. Two sources are provided:
//! - [`OsRandomness`]: OS entropy, the production default. The value exists
//!   only at draw time, so entrants cannot bias a draw by entry timing.
//! - [`SeededRandomness`]: deterministic sequence from a fixed seed, for
//!   reproducible test runs and draw replays.

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

/// Yields one draw index per winner selection.
///
/// `draw(n)` returns a value uniformly distributed over `[0, n)`.
/// Drawing is infallible; `upper_bound` must be greater than zero (the pool
/// checks its player quorum before drawing).
pub trait RandomnessSource {
    fn draw(&mut self, upper_bound: usize) -> usize;
}

/// OS-entropy randomness for production draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomness;

impl OsRandomness {
    pub fn new() -> Self {
        Self
    }
}

impl RandomnessSource for OsRandomness {
    fn draw(&mut self, upper_bound: usize) -> usize {
        OsRng.gen_range(0..upper_bound)
    }
}

/// Deterministic randomness seeded from a `u64`.
///
/// Identical seeds produce identical draw sequences. Not suitable for
/// production draws.
#[derive(Debug, Clone)]
pub struct SeededRandomness {
    rng: StdRng,
}

impl SeededRandomness {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomnessSource for SeededRandomness {
    fn draw(&mut self, upper_bound: usize) -> usize {
        self.rng.gen_range(0..upper_bound)
    }
}
