//! Progress increment sources for the loading animation.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies the amount of progress added on each loading tick.
///
/// Implementations should return positive, bounded values; the lifecycle
/// treats anything negative or NaN as zero.
pub trait IncrementSource: Send {
    fn next_increment(&mut self) -> f64;
}

/// Uniform increments over `(0, max]`, for the irregular loading feel.
pub struct UniformIncrements {
    max: f64,
    rng: StdRng,
}

impl UniformIncrements {
    pub fn new(max: f64) -> Self {
        Self {
            max,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(max: f64, seed: u64) -> Self {
        Self {
            max,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IncrementSource for UniformIncrements {
    fn next_increment(&mut self) -> f64 {
        // gen::<f64>() is in [0, 1), so this lands in (0, max].
        self.max * (1.0 - self.rng.gen::<f64>())
    }
}

/// Plays back a fixed list of increments, repeating the last one forever.
#[derive(Debug, Clone)]
pub struct FixedIncrements {
    queue: VecDeque<f64>,
    last: f64,
}

impl FixedIncrements {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let queue: VecDeque<f64> = values.into_iter().collect();
        let last = queue.back().copied().unwrap_or(0.0);
        Self { queue, last }
    }
}

impl IncrementSource for FixedIncrements {
    fn next_increment(&mut self) -> f64 {
        self.queue.pop_front().unwrap_or(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_stays_in_bounds() {
        let mut src = UniformIncrements::seeded(15.0, 7);
        for _ in 0..10_000 {
            let v = src.next_increment();
            assert!(v > 0.0 && v <= 15.0, "out of range: {v}");
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = UniformIncrements::seeded(15.0, 42);
        let mut b = UniformIncrements::seeded(15.0, 42);
        for _ in 0..16 {
            assert_eq!(a.next_increment(), b.next_increment());
        }
    }

    #[test]
    fn test_fixed_repeats_last() {
        let mut src = FixedIncrements::new([10.0, 20.0]);
        assert_eq!(src.next_increment(), 10.0);
        assert_eq!(src.next_increment(), 20.0);
        assert_eq!(src.next_increment(), 20.0);
    }
}
