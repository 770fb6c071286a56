//! Crossover strategies.
//!
//! [`Crossover`] is the pluggable strategy a problem consults inside
//! `reproduce` to combine two parents into one child. Problems pick a
//! default from their alphabet and problem type; callers may override it.
//!
//! # Submodules
//!
//! - [`operators`]: the crossover and mutation functions the strategies
//!   dispatch to

pub mod operators;

use rand::Rng;

use operators::{one_point_crossover, permutation_repair_crossover, uniform_crossover};

/// Crossover strategy for combining two parent states.
///
/// # Examples
///
/// ```
/// use u_optprob::crossover::Crossover;
/// use u_optprob::random::create_rng;
///
/// let mut rng = create_rng(42);
/// let child = Crossover::OnePoint.combine(&[0, 0, 0, 0], &[1, 1, 1, 1], &mut rng);
/// assert_eq!(child.len(), 4);
/// assert_eq!(child[0], 0);
/// assert_eq!(child[3], 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// Each position independently from a random parent.
    ///
    /// Default for binary alphabets.
    Uniform,

    /// A single random cut; prefix from parent1, suffix from parent2.
    ///
    /// Default for alphabets larger than two.
    OnePoint,

    /// One-point combination repaired into a valid permutation of `0..L`.
    ///
    /// Default for permutation problems (tours, orderings).
    PermutationRepair,
}

impl Crossover {
    /// Default strategy for a discrete alphabet of size `max_val`.
    pub fn default_for_alphabet(max_val: usize) -> Self {
        if max_val == 2 {
            Crossover::Uniform
        } else {
            Crossover::OnePoint
        }
    }

    /// Combines two parents into one child of the same length.
    ///
    /// # Panics
    /// Panics if parents have different lengths. Problems validate lengths
    /// before calling this.
    pub fn combine<R: Rng>(&self, parent1: &[usize], parent2: &[usize], rng: &mut R) -> Vec<usize> {
        match self {
            Crossover::Uniform => uniform_crossover(parent1, parent2, rng),
            Crossover::OnePoint => one_point_crossover(parent1, parent2, rng),
            Crossover::PermutationRepair => permutation_repair_crossover(parent1, parent2, rng),
        }
    }
}
