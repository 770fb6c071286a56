//! Seedable random sources.
//!
//! Every randomized operation in this crate takes `&mut R where R: Rng`.
//! Identical seeds plus identical call sequences reproduce identical states,
//! populations, dependency trees, and samples.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draws an index from a discrete distribution given by `probs`.
///
/// `probs` need not sum exactly to one; the last index with positive mass
/// absorbs floating-point shortfall.
pub(crate) fn sample_categorical<R: Rng>(probs: &[f64], rng: &mut R) -> usize {
    let total: f64 = probs.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.random_range(0..probs.len());
    }

    let threshold = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p > 0.0 {
            last_positive = i;
        }
        cumulative += p;
        if cumulative > threshold {
            return i;
        }
    }
    last_positive
}

/// Picks a value in `0..max_val` different from `current`.
pub(crate) fn other_value<R: Rng>(current: usize, max_val: usize, rng: &mut R) -> usize {
    debug_assert!(max_val >= 2);
    let v = rng.random_range(0..max_val - 1);
    if v >= current {
        v + 1
    } else {
        v
    }
}
