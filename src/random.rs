use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Source of randomness for the colony and the worker ants.
///
/// Swapping the generator is how runs are made reproducible: a
/// [`SeededRandomGenerator`] built from the same seed replays the same
/// sequence.
pub trait RandomGenerator {
    /// A uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// A uniform value in `from..to`.
    fn next_range(&mut self, from: usize, to: usize) -> usize;
}

/// Thread-local generator seeded from the operating system.
pub struct StandardRandomGenerator {
    rng: ThreadRng,
}

impl Default for StandardRandomGenerator {
    fn default() -> Self {
        Self { rng: rand::rng() }
    }
}

impl RandomGenerator for StandardRandomGenerator {
    fn next_f64(&mut self) -> f64 {
        self.rng.random()
    }

    fn next_range(&mut self, from: usize, to: usize) -> usize {
        self.rng.random_range(from..to)
    }
}

/// Deterministic generator for reproducible runs.
#[derive(Debug, Clone)]
pub struct SeededRandomGenerator {
    rng: StdRng,
}

impl SeededRandomGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededRandomGenerator {
    fn default() -> Self {
        SeededRandomGenerator::new(DEFAULT_SEED)
    }
}

const DEFAULT_SEED: u64 = 3819201;

impl RandomGenerator for SeededRandomGenerator {
    fn next_f64(&mut self) -> f64 {
        self.rng.random()
    }

    fn next_range(&mut self, from: usize, to: usize) -> usize {
        self.rng.random_range(from..to)
    }
}
