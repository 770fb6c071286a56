//! Genetic operators on state vectors.
//!
//! Crossover functions combine two equal-length parents into one child.
//! Uniform and one-point crossover are generic over the element type and
//! serve both discrete and continuous problems; the permutation operators
//! work on `&[usize]` index vectors.
//!
//! # Crossover Operators
//!
//! - [`uniform_crossover`]: each position from a random parent
//! - [`one_point_crossover`]: prefix from parent1, suffix from parent2
//! - [`permutation_repair_crossover`]: one-point, then [`repair_permutation`]
//!
//! # Mutation Operators
//!
//! - [`swap_mutation`]: exchange two distinct positions, O(1)
//!
//! # References
//!
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use rand::Rng;

// ============================================================================
// Crossover operators
// ============================================================================

/// Uniform crossover: every position is copied from a parent chosen by a
/// fair coin flip.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn uniform_crossover<T: Copy, R: Rng>(parent1: &[T], parent2: &[T], rng: &mut R) -> Vec<T> {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    parent1
        .iter()
        .zip(parent2)
        .map(|(&a, &b)| if rng.random_bool(0.5) { a } else { b })
        .collect()
}

/// One-point crossover.
///
/// Picks a cut `c` in `1..n` so both parents contribute at least one
/// position: the child is `parent1[..c]` followed by `parent2[c..]`.
/// For `n < 2` the child is a copy of parent1.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn one_point_crossover<T: Copy, R: Rng>(parent1: &[T], parent2: &[T], rng: &mut R) -> Vec<T> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n < 2 {
        return parent1.to_vec();
    }

    let cut = rng.random_range(1..n);
    let mut child = Vec::with_capacity(n);
    child.extend_from_slice(&parent1[..cut]);
    child.extend_from_slice(&parent2[cut..]);
    child
}

/// One-point crossover followed by permutation repair.
///
/// The child keeps the first occurrence of every value of the one-point
/// combination; every repeated or out-of-range value is replaced by a value missing from
/// the child, taken in the order it appears in `parent2`. The result is
/// always a permutation of `0..n`, even if the parents are not.
///
/// # Complexity
/// O(n) time, O(n) space
pub fn permutation_repair_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let mut child = one_point_crossover(parent1, parent2, rng);
    repair_permutation(&mut child, parent2);
    child
}

/// Repairs `child` in place into a permutation of `0..child.len()`.
///
/// The first occurrence of each in-range value is kept. Remaining slots are
/// filled left to right with the missing values, ordered by their first
/// appearance in `donor`, then ascending for any value `donor` lacks.
pub fn repair_permutation(child: &mut [usize], donor: &[usize]) {
    let n = child.len();
    let mut used = vec![false; n];
    let mut holes = Vec::new();

    for (i, &v) in child.iter().enumerate() {
        if v < n && !used[v] {
            used[v] = true;
        } else {
            holes.push(i);
        }
    }
    if holes.is_empty() {
        return;
    }

    let mut queued = used.clone();
    let mut missing = Vec::with_capacity(holes.len());
    for v in donor.iter().copied().chain(0..n) {
        if v < n && !queued[v] {
            queued[v] = true;
            missing.push(v);
        }
    }

    for (slot, value) in holes.into_iter().zip(missing) {
        child[slot] = value;
    }
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Swap mutation: exchange two distinct random positions.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<T, R: Rng>(perm: &mut [T], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = (i + rng.random_range(1..n)) % n;
    perm.swap(i, j);
}

/// Swaps position `i` with a different random position.
pub(crate) fn swap_with_other<T, R: Rng>(perm: &mut [T], i: usize, rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let j = (i + rng.random_range(1..n)) % n;
    perm.swap(i, j);
}

// ============================================================================
// Tests
// ============================================================================
