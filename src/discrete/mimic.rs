//! MIMIC probabilistic model.
//!
//! The model behind [`DiscreteProblem::eval_node_probs`] and
//! [`DiscreteProblem::sample_pop`]: pairwise mutual information over an
//! elite sample, a maximum spanning dependency tree (Chow-Liu), per-position
//! conditional probability tables, a parents-first traversal order, and
//! ancestral sampling from the tree.
//!
//! Mutual information is estimated through the [`MutualInfoEstimator`]
//! strategy. [`SlowMutualInfo`] recounts every pair from scratch;
//! [`FastMutualInfo`] counts marginals once and visits only the occupied
//! joint cells of each pair, reusing its buffers across calls.
//! Both reduce counts to information with the same routine, so their
//! matrices are identical.
//!
//! # References
//!
//! - De Bonet, Isbell & Viola (1997), "MIMIC: Finding Optima by Estimating
//!   Probability Densities"
//! - Chow & Liu (1968), "Approximating Discrete Probability Distributions
//!   with Dependence Trees"
//!
//! [`DiscreteProblem::eval_node_probs`]: super::DiscreteProblem::eval_node_probs
//! [`DiscreteProblem::sample_pop`]: super::DiscreteProblem::sample_pop

use std::collections::VecDeque;

use rand::Rng;

use crate::random::sample_categorical;

/// Conditional probability tables, shape `L × max_val × max_val`.
///
/// `tables[i][a][b]` is `P(x_i = b | x_parent(i) = a)`.
pub type NodeProbs = Vec<Vec<Vec<f64>>>;

/// Scale used to round mutual information before building the tree.
const MI_SCALE: f64 = 1e10;

// ============================================================================
// Mutual information
// ============================================================================

/// Strategy for computing the pairwise mutual information matrix.
pub trait MutualInfoEstimator: Send + Sync {
    /// Returns the symmetric `length × length` mutual information matrix of
    /// `sample` (natural log). The diagonal is zero.
    ///
    /// Every value in `sample` must lie in `0..max_val`.
    fn estimate(&mut self, sample: &[Vec<usize>], length: usize, max_val: usize) -> Vec<Vec<f64>>;
}

/// Recounts the joint and marginal distributions for every pair.
///
/// O(L² · (N + K²)) time, O(K²) scratch space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlowMutualInfo;

impl MutualInfoEstimator for SlowMutualInfo {
    fn estimate(&mut self, sample: &[Vec<usize>], length: usize, max_val: usize) -> Vec<Vec<f64>> {
        let n = sample.len();
        let mut mi = vec![vec![0.0; length]; length];
        let mut joint = vec![0usize; max_val * max_val];
        let mut left = vec![0usize; max_val];
        let mut right = vec![0usize; max_val];

        for i in 0..length {
            for j in (i + 1)..length {
                joint.fill(0);
                left.fill(0);
                right.fill(0);
                for row in sample {
                    joint[row[i] * max_val + row[j]] += 1;
                    left[row[i]] += 1;
                    right[row[j]] += 1;
                }
                let cells = joint
                    .iter()
                    .enumerate()
                    .filter(|(_, &c)| c > 0)
                    .map(|(cell, &c)| (cell / max_val, cell % max_val, c));
                let value = mutual_info_from_cells(cells, &left, &right, n);
                mi[i][j] = value;
                mi[j][i] = value;
            }
        }
        mi
    }
}

/// Counts marginals once and visits only the occupied joint cells of each
/// pair.
///
/// The upper-triangle pair list, the marginal counts and one `K × K`
/// scratch table survive between calls and are rebuilt only when the length
/// or alphabet size changes. The scratch is cleared cell by cell after each
/// pair, so a pair costs O(N log N) regardless of the alphabet size.
///
/// O(L² · N log N) time, O(L² + L·K + K²) space.
#[derive(Debug, Clone, Default)]
pub struct FastMutualInfo {
    shape: Option<(usize, usize)>,
    pairs: Vec<(usize, usize)>,
    marginals: Vec<usize>,
    joint: Vec<usize>,
    touched: Vec<usize>,
}

impl FastMutualInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether count buffers from a previous call are held.
    pub fn is_cached(&self) -> bool {
        self.shape.is_some()
    }

    fn prepare(&mut self, length: usize, max_val: usize) {
        self.touched.clear();
        if self.shape == Some((length, max_val)) {
            self.marginals.fill(0);
            return;
        }

        self.pairs = (0..length)
            .flat_map(|i| ((i + 1)..length).map(move |j| (i, j)))
            .collect();
        self.marginals = vec![0; length * max_val];
        self.joint = vec![0; max_val * max_val];
        self.shape = Some((length, max_val));
    }
}

impl MutualInfoEstimator for FastMutualInfo {
    fn estimate(&mut self, sample: &[Vec<usize>], length: usize, max_val: usize) -> Vec<Vec<f64>> {
        self.prepare(length, max_val);
        let k = max_val;

        for row in sample {
            for (i, &v) in row.iter().enumerate().take(length) {
                self.marginals[i * k + v] += 1;
            }
        }

        let n = sample.len();
        let mut mi = vec![vec![0.0; length]; length];
        for &(i, j) in &self.pairs {
            for row in sample {
                let cell = row[i] * k + row[j];
                if self.joint[cell] == 0 {
                    self.touched.push(cell);
                }
                self.joint[cell] += 1;
            }
            // Ascending cells match the dense scan order.
            self.touched.sort_unstable();

            let cells = self.touched.iter().map(|&cell| (cell / k, cell % k, self.joint[cell]));
            let value = mutual_info_from_cells(
                cells,
                &self.marginals[i * k..(i + 1) * k],
                &self.marginals[j * k..(j + 1) * k],
                n,
            );
            mi[i][j] = value;
            mi[j][i] = value;

            for &cell in &self.touched {
                self.joint[cell] = 0;
            }
            self.touched.clear();
        }
        mi
    }
}

/// Mutual information of one pair from its occupied joint cells.
///
/// `cells` yields `(left value, right value, count)` with non-zero counts
/// in ascending `(left, right)` order; `left`/`right` are the marginal
/// counts and `n` the sample size. Both estimators feed cells in the same
/// order, so their sums are identical.
fn mutual_info_from_cells(
    cells: impl Iterator<Item = (usize, usize, usize)>,
    left: &[usize],
    right: &[usize],
    n: usize,
) -> f64 {
    let n = n as f64;
    let mut mi = 0.0;
    for (a, b, c) in cells {
        let c = c as f64;
        mi += c / n * (c * n / (left[a] as f64 * right[b] as f64)).ln();
    }
    mi
}

// ============================================================================
// Dependency tree
// ============================================================================

/// Maximum spanning tree over the mutual information matrix, rooted at 0.
///
/// Weights are rounded to ten decimals, then Kruskal's algorithm runs over
/// the complete graph with edges sorted by weight descending. Equal weights
/// keep lexicographic `(i, j)` order. The tree is oriented breadth-first
/// from position 0, whose parent is `None`.
pub fn chow_liu_tree(mi: &[Vec<f64>]) -> Vec<Option<usize>> {
    let n = mi.len();
    if n == 0 {
        return Vec::new();
    }

    let mut edges: Vec<(f64, usize, usize)> = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push(((mi[i][j] * MI_SCALE).round() / MI_SCALE, i, j));
        }
    }
    edges.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut components: Vec<usize> = (0..n).collect();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut added = 0;
    for (_, i, j) in edges {
        let ri = find_root(&mut components, i);
        let rj = find_root(&mut components, j);
        if ri == rj {
            continue;
        }
        components[ri] = rj;
        adjacency[i].push(j);
        adjacency[j].push(i);
        added += 1;
        if added == n - 1 {
            break;
        }
    }

    let mut parents = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::from([0]);
    visited[0] = true;
    while let Some(node) = queue.pop_front() {
        for &next in &adjacency[node] {
            if !visited[next] {
                visited[next] = true;
                parents[next] = Some(node);
                queue.push_back(next);
            }
        }
    }
    parents
}

/// Union-find root lookup with path halving.
fn find_root(components: &mut [usize], mut x: usize) -> usize {
    while components[x] != x {
        components[x] = components[components[x]];
        x = components[x];
    }
    x
}

// ============================================================================
// Conditional tables
// ============================================================================

/// Builds the conditional probability table of every position.
///
/// A position without a usable parent (the root, a self-loop, or an
/// out-of-range index) gets its marginal repeated in every row. A parent
/// value that never occurs in `sample` yields a uniform row. With
/// `noise > 0`, `noise` is added to every cell of a conditional row before
/// renormalizing; marginal rows are left unsmoothed.
pub fn conditional_tables(
    sample: &[Vec<usize>],
    parents: &[Option<usize>],
    max_val: usize,
    noise: f64,
) -> NodeProbs {
    let length = parents.len();
    let mut tables = Vec::with_capacity(length);

    for (i, parent) in parents.iter().enumerate() {
        match *parent {
            Some(p) if p < length && p != i => {
                let mut counts = vec![vec![0usize; max_val]; max_val];
                for row in sample {
                    counts[row[p]][row[i]] += 1;
                }
                tables.push(counts.iter().map(|c| smoothed_distribution(c, noise)).collect());
            }
            _ => {
                let mut counts = vec![0usize; max_val];
                for row in sample {
                    counts[row[i]] += 1;
                }
                tables.push(vec![smoothed_distribution(&counts, 0.0); max_val]);
            }
        }
    }
    tables
}

fn smoothed_distribution(counts: &[usize], noise: f64) -> Vec<f64> {
    let k = counts.len();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![1.0 / k as f64; k];
    }

    let mut probs: Vec<f64> = counts.iter().map(|&c| c as f64 / total as f64).collect();
    if noise > 0.0 {
        probs.iter_mut().for_each(|p| *p += noise);
        let sum: f64 = probs.iter().sum();
        probs.iter_mut().for_each(|p| *p /= sum);
    }
    probs
}

// ============================================================================
// Ordering and sampling
// ============================================================================

/// Breadth-first traversal order of the dependency tree from position 0.
///
/// Children are visited in ascending index order. Self-loops and
/// out-of-range parents are ignored. If the traversal stalls with positions
/// left (a cycle or a forest), the smallest unvisited position starts a new
/// traversal. The result is always a permutation of `0..parents.len()`.
pub fn sample_order(parents: &[Option<usize>]) -> Vec<usize> {
    let length = parents.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); length];
    for (i, parent) in parents.iter().enumerate() {
        if let Some(p) = *parent {
            if p < length && p != i {
                children[p].push(i);
            }
        }
    }

    let mut order = Vec::with_capacity(length);
    let mut visited = vec![false; length];
    let mut queue = VecDeque::new();
    if length > 0 {
        visited[0] = true;
        queue.push_back(0);
    }

    loop {
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &child in &children[node] {
                if !visited[child] {
                    visited[child] = true;
                    queue.push_back(child);
                }
            }
        }

        match visited.iter().position(|&v| !v) {
            Some(next) => {
                log::warn!(
                    "dependency tree does not reach position {next} from the root; \
                     continuing traversal from it"
                );
                visited[next] = true;
                queue.push_back(next);
            }
            None => break,
        }
    }
    order
}

/// Draws `count` states by ancestral sampling in `order`.
///
/// Each position is drawn from the table row selected by its parent's
/// sampled value; positions without a usable parent, or whose parent has
/// not been sampled yet, read row 0.
pub fn sample_states<R: Rng>(
    tables: &[Vec<Vec<f64>>],
    parents: &[Option<usize>],
    order: &[usize],
    count: usize,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let length = tables.len();
    (0..count)
        .map(|_| {
            let mut state = vec![0; length];
            for &i in order {
                let given = match parents.get(i).copied().flatten() {
                    Some(p) if p < length => state[p],
                    _ => 0,
                };
                state[i] = sample_categorical(&tables[i][given], rng);
            }
            state
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn fixture_sample() -> Vec<Vec<usize>> {
        vec![
            vec![0, 0, 0, 0, 1],
            vec![1, 0, 1, 0, 1],
            vec![1, 1, 1, 1, 0],
            vec![1, 0, 0, 0, 1],
            vec![0, 0, 0, 0, 0],
            vec![1, 1, 1, 1, 1],
        ]
    }

    fn fixture_parents() -> Vec<Option<usize>> {
        vec![None, Some(2), Some(0), Some(1), Some(0)]
    }

    fn assert_close(actual: &[Vec<Vec<f64>>], expected: &[Vec<Vec<f64>>]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            for (ra, re) in a.iter().zip(e) {
                for (&x, &y) in ra.iter().zip(re) {
                    assert!((x - y).abs() < 1e-12, "table {i}: {a:?} != {e:?}");
                }
            }
        }
    }

    // ---- Mutual information ----

    #[test]
    fn test_mutual_info_fixture_values() {
        let mi = SlowMutualInfo.estimate(&fixture_sample(), 5, 2);
        assert!((mi[1][3] - 0.636_514_168_294_812_8).abs() < 1e-12);
        assert!((mi[0][2] - 0.318_257_084_147_406_4).abs() < 1e-12);
        assert!((mi[0][1] - 0.174_416_047_921_515_94).abs() < 1e-12);
        assert!((mi[0][4] - 0.030_575_011_695_625_487).abs() < 1e-12);
        assert!(mi[2][4].abs() < 1e-12);
        for i in 0..5 {
            assert_eq!(mi[i][i], 0.0);
            for j in 0..5 {
                assert_eq!(mi[i][j], mi[j][i]);
            }
        }
    }

    #[test]
    fn test_fast_and_slow_estimators_agree() {
        let mut rng = create_rng(42);
        let sample: Vec<Vec<usize>> = (0..40)
            .map(|_| (0..7).map(|_| rng.random_range(0..3)).collect())
            .collect();

        let slow = SlowMutualInfo.estimate(&sample, 7, 3);
        let fast = FastMutualInfo::new().estimate(&sample, 7, 3);
        assert_eq!(slow, fast);
    }

    #[test]
    fn test_fast_estimator_cache_follows_shape() {
        let mut fast = FastMutualInfo::new();
        assert!(!fast.is_cached());

        let first = fast.estimate(&fixture_sample(), 5, 2);
        assert!(fast.is_cached());
        // Reused buffers must be cleared between calls.
        let again = fast.estimate(&fixture_sample(), 5, 2);
        assert_eq!(first, again);

        let small = vec![vec![0, 1, 2], vec![2, 1, 0], vec![1, 1, 1]];
        let resized = fast.estimate(&small, 3, 3);
        assert_eq!(resized, SlowMutualInfo.estimate(&small, 3, 3));
    }

    #[test]
    fn test_fast_estimator_scratch_is_one_pair_table() {
        let mut rng = create_rng(7);
        let sample: Vec<Vec<usize>> = (0..20)
            .map(|_| (0..100).map(|_| rng.random_range(0..100)).collect())
            .collect();

        let mut fast = FastMutualInfo::new();
        let mi = fast.estimate(&sample, 100, 100);
        assert_eq!(fast.joint.len(), 100 * 100);
        assert!(fast.joint.iter().all(|&c| c == 0));
        assert_eq!(fast.marginals.len(), 100 * 100);
        assert_eq!(mi, SlowMutualInfo.estimate(&sample, 100, 100));
    }

    // ---- Dependency tree ----

    #[test]
    fn test_chow_liu_fixture_tree() {
        let mi = FastMutualInfo::new().estimate(&fixture_sample(), 5, 2);
        assert_eq!(chow_liu_tree(&mi), fixture_parents());
    }

    #[test]
    fn test_chow_liu_ties_follow_lexicographic_edges() {
        let mi = vec![vec![0.0; 4]; 4];
        assert_eq!(
            chow_liu_tree(&mi),
            vec![None, Some(0), Some(0), Some(0)]
        );
    }

    #[test]
    fn test_chow_liu_degenerate_sizes() {
        assert!(chow_liu_tree(&[]).is_empty());
        assert_eq!(chow_liu_tree(&[vec![0.0]]), vec![None]);
    }

    // ---- Conditional tables ----

    #[test]
    fn test_conditional_tables_fixture() {
        let tables = conditional_tables(&fixture_sample(), &fixture_parents(), 2, 0.0);
        let third = 1.0 / 3.0;
        let expected = vec![
            vec![vec![third, 2.0 * third], vec![third, 2.0 * third]],
            vec![vec![1.0, 0.0], vec![third, 2.0 * third]],
            vec![vec![1.0, 0.0], vec![0.25, 0.75]],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![vec![0.5, 0.5], vec![0.25, 0.75]],
        ];
        assert_close(&tables, &expected);
    }

    #[test]
    fn test_unseen_parent_value_gives_uniform_row() {
        let sample = vec![vec![0, 1], vec![0, 2], vec![0, 2]];
        let tables = conditional_tables(&sample, &[None, Some(0)], 3, 0.0);
        let third = 1.0 / 3.0;
        assert_close(
            &tables[1..],
            &[vec![
                vec![0.0, third, 2.0 * third],
                vec![third; 3],
                vec![third; 3],
            ]],
        );
    }

    #[test]
    fn test_noise_smooths_conditional_rows_only() {
        let tables = conditional_tables(&fixture_sample(), &fixture_parents(), 2, 0.1);
        for table in &tables {
            for row in table {
                let sum: f64 = row.iter().sum();
                assert!((sum - 1.0).abs() < 1e-12);
                assert!(row.iter().all(|&p| p > 0.0));
            }
        }
        // Root marginal is the raw frequency.
        assert!((tables[0][0][0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((tables[0][1][1] - 2.0 / 3.0).abs() < 1e-12);
        // Conditional row [1, 0] becomes (1.1, 0.1) / 1.2.
        assert!((tables[3][0][0] - 1.1 / 1.2).abs() < 1e-12);
        assert!((tables[3][0][1] - 0.1 / 1.2).abs() < 1e-12);
    }

    // ---- Ordering ----

    #[test]
    fn test_sample_order_fixture() {
        assert_eq!(sample_order(&fixture_parents()), vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn test_sample_order_without_root_reach() {
        let parents = vec![Some(4); 5];
        assert_eq!(sample_order(&parents), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_sample_order_with_cycle_and_bad_indices() {
        let parents = vec![None, Some(2), Some(1), Some(9), Some(0)];
        let mut order = sample_order(&parents);
        assert_eq!(order[0], 0);
        assert_eq!(order[1], 4);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    // ---- Sampling ----

    #[test]
    fn test_sample_states_respect_deterministic_tables() {
        let tables = conditional_tables(&fixture_sample(), &fixture_parents(), 2, 0.0);
        let order = sample_order(&fixture_parents());
        let mut rng = create_rng(42);

        let states = sample_states(&tables, &fixture_parents(), &order, 200, &mut rng);
        assert_eq!(states.len(), 200);
        for s in &states {
            assert_eq!(s.len(), 5);
            // x3 copies x1 and x0 = 0 forces x2 = 0.
            assert_eq!(s[3], s[1]);
            if s[0] == 0 {
                assert_eq!(s[2], 0);
            }
            if s[2] == 0 {
                assert_eq!(s[1], 0);
            }
        }
    }

    #[test]
    fn test_sample_states_root_frequency() {
        let tables = conditional_tables(&fixture_sample(), &fixture_parents(), 2, 0.0);
        let order = sample_order(&fixture_parents());
        let mut rng = create_rng(7);

        let states = sample_states(&tables, &fixture_parents(), &order, 6000, &mut rng);
        let ones = states.iter().filter(|s| s[0] == 1).count() as f64 / 6000.0;
        assert!((ones - 2.0 / 3.0).abs() < 0.03, "root frequency {ones}");
    }
}
