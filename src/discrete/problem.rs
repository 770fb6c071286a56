//! Discrete-state problem.

use rand::seq::SliceRandom;
use rand::Rng;

use super::config::DiscreteConfig;
use super::mimic::{
    chow_liu_tree, conditional_tables, sample_order, sample_states, FastMutualInfo,
    MutualInfoEstimator, NodeProbs, SlowMutualInfo,
};
use crate::crossover::operators::{repair_permutation, swap_mutation, swap_with_other};
use crate::crossover::Crossover;
use crate::error::{check_length, check_probability, ProblemError, ProblemResult};
use crate::fitness::{FitnessFunction, ProblemType};
use crate::problem::{resolve_length, OptimizationProblem, ProblemCore};
use crate::random::other_value;

/// A problem over integer states in `0..max_val`, with the MIMIC model.
///
/// Permutation fitness functions turn it into a permutation problem: states
/// are orderings of `0..L`, `max_val` equals `L`, and every operator keeps
/// states valid permutations.
///
/// # MIMIC sequence
///
/// ```
/// use u_optprob::discrete::{DiscreteConfig, DiscreteProblem};
/// use u_optprob::fitness::{CustomFitness, ProblemType};
/// use u_optprob::problem::OptimizationProblem;
/// use u_optprob::random::create_rng;
///
/// let one_max = CustomFitness::new(
///     |x: &[usize]| x.iter().sum::<usize>() as f64,
///     ProblemType::Discrete,
/// );
/// let mut problem = DiscreteProblem::new(one_max, DiscreteConfig::default().with_length(10))?;
/// let mut rng = create_rng(42);
///
/// problem.random_pop(100, &mut rng)?;
/// problem.find_top_pct(0.2)?;
/// problem.eval_node_probs()?;
/// let samples = problem.sample_pop(100, &mut rng)?;
/// problem.set_population(samples)?;
/// assert_eq!(problem.population().len(), 100);
/// # Ok::<(), u_optprob::error::ProblemError>(())
/// ```
pub struct DiscreteProblem<F> {
    core: ProblemCore<usize, F>,
    max_val: usize,
    permutation: bool,
    crossover: Crossover,
    noise: f64,
    fast_mimic: bool,
    mutual_info: Box<dyn MutualInfoEstimator>,
    keep_sample: Vec<Vec<usize>>,
    node_probs: Option<NodeProbs>,
    parent_nodes: Option<Vec<Option<usize>>>,
    sample_order: Option<Vec<usize>>,
}

impl<F: FitnessFunction<usize>> DiscreteProblem<F> {
    /// Creates a problem and evaluates its initial state.
    ///
    /// The initial state is all zeros, or the identity ordering for
    /// permutation problems.
    ///
    /// # Errors
    /// - `InvalidArgument` if the configuration is invalid or no length can
    ///   be resolved
    /// - `CapabilityMismatch` if the fitness function is tagged continuous
    pub fn new(fitness_fn: F, config: DiscreteConfig) -> ProblemResult<Self> {
        config.validate()?;
        let problem_type = fitness_fn.problem_type();
        if !problem_type.is_discrete_compatible() {
            return Err(ProblemError::CapabilityMismatch(format!(
                "a {problem_type:?} fitness function cannot drive a discrete problem"
            )));
        }
        let length = resolve_length(config.length, &fitness_fn)?;

        let permutation = problem_type == ProblemType::Permutation;
        let (max_val, state) = if permutation {
            (length, (0..length).collect())
        } else {
            (config.max_val, vec![0; length])
        };
        let crossover = config.crossover.unwrap_or(if permutation {
            Crossover::PermutationRepair
        } else {
            Crossover::default_for_alphabet(max_val)
        });

        Ok(Self {
            core: ProblemCore::new(fitness_fn, config.maximize, config.stop_fitness, state),
            max_val,
            permutation,
            crossover,
            noise: config.noise,
            fast_mimic: config.fast_mimic,
            mutual_info: estimator(config.fast_mimic),
            keep_sample: Vec::new(),
            node_probs: None,
            parent_nodes: None,
            sample_order: None,
        })
    }

    /// Alphabet size.
    pub fn max_val(&self) -> usize {
        self.max_val
    }

    /// Whether states are permutations of `0..L`.
    pub fn is_permutation(&self) -> bool {
        self.permutation
    }

    pub fn crossover(&self) -> Crossover {
        self.crossover
    }

    pub fn set_crossover(&mut self, crossover: Crossover) {
        self.crossover = crossover;
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// Sets the smoothing noise used by the next [`eval_node_probs`](Self::eval_node_probs).
    pub fn set_noise(&mut self, noise: f64) -> ProblemResult<()> {
        if !noise.is_finite() || noise < 0.0 {
            return Err(ProblemError::invalid(format!(
                "noise must be a non-negative number, got {noise}"
            )));
        }
        self.noise = noise;
        Ok(())
    }

    pub fn mimic_fast_mode(&self) -> bool {
        self.fast_mimic
    }

    /// Switches the mutual information estimator.
    ///
    /// Any cached counts are discarded either way; the fitted model is kept.
    pub fn set_mimic_fast_mode(&mut self, fast: bool) {
        self.fast_mimic = fast;
        self.mutual_info = estimator(fast);
    }

    // ---- MIMIC model ----

    /// The elite sample used to fit the model.
    pub fn keep_sample(&self) -> &[Vec<usize>] {
        &self.keep_sample
    }

    /// Replaces the elite sample.
    ///
    /// # Errors
    /// `LengthMismatch` if any row's length differs from the problem length.
    pub fn set_keep_sample(&mut self, sample: Vec<Vec<usize>>) -> ProblemResult<()> {
        for row in &sample {
            check_length("keep sample row", row, self.core.length())?;
        }
        self.keep_sample = sample;
        Ok(())
    }

    /// Keeps the population rows in the top `keep_pct` fraction by fitness.
    ///
    /// The cut is the linearly interpolated percentile at
    /// `100 * (1 - keep_pct)` of the population fitness. Rows at or above it
    /// are kept in population order, so ties at the cut are all included.
    /// NaN fitness values are left out of the percentile and never kept.
    ///
    /// # Errors
    /// `InvalidArgument` if `keep_pct` is outside `(0, 1]`, no population
    /// is set, or every population fitness is NaN.
    pub fn find_top_pct(&mut self, keep_pct: f64) -> ProblemResult<()> {
        if !(keep_pct > 0.0 && keep_pct <= 1.0) {
            return Err(ProblemError::invalid(format!(
                "keep_pct must be greater than 0 and at most 1, got {keep_pct}"
            )));
        }
        let pop_fitness = self.core.pop_fitness();
        if pop_fitness.is_empty() {
            return Err(ProblemError::invalid(
                "no population set; call set_population first",
            ));
        }

        let ranked: Vec<f64> = pop_fitness.iter().copied().filter(|f| !f.is_nan()).collect();
        if ranked.is_empty() {
            return Err(ProblemError::invalid("every population fitness is NaN"));
        }

        let threshold = percentile(&ranked, 1.0 - keep_pct);
        self.keep_sample = self
            .core
            .population()
            .iter()
            .zip(pop_fitness)
            .filter(|(_, &f)| f >= threshold)
            .map(|(row, _)| row.clone())
            .collect();
        log::trace!(
            "kept {} of {} rows at fitness cut {threshold}",
            self.keep_sample.len(),
            pop_fitness.len()
        );
        Ok(())
    }

    /// Fits the dependency tree and conditional tables to the elite sample,
    /// then refreshes the sample order.
    ///
    /// # Errors
    /// - `ModelNotFitted` if the elite sample is empty
    /// - `InvalidArgument` if a sample value is outside `0..max_val`
    pub fn eval_node_probs(&mut self) -> ProblemResult<()> {
        if self.keep_sample.is_empty() {
            return Err(ProblemError::ModelNotFitted(
                "the elite sample is empty; call find_top_pct or set_keep_sample first".into(),
            ));
        }
        if let Some(&v) = self.keep_sample.iter().flatten().find(|&&v| v >= self.max_val) {
            return Err(ProblemError::invalid(format!(
                "elite sample value {v} is outside 0..{}",
                self.max_val
            )));
        }

        let length = self.core.length();
        let mi = self
            .mutual_info
            .estimate(&self.keep_sample, length, self.max_val);
        let parents = chow_liu_tree(&mi);
        let tables = conditional_tables(&self.keep_sample, &parents, self.max_val, self.noise);
        log::debug!(
            "fitted dependency tree over {length} positions from {} elite rows ({} mutual information)",
            self.keep_sample.len(),
            if self.fast_mimic { "fast" } else { "slow" }
        );

        self.sample_order = Some(sample_order(&parents));
        self.parent_nodes = Some(parents);
        self.node_probs = Some(tables);
        Ok(())
    }

    /// Conditional probability tables from the last fit.
    pub fn node_probs(&self) -> Option<&[Vec<Vec<f64>>]> {
        self.node_probs.as_deref()
    }

    /// Parent of each position in the dependency tree; the root is `None`.
    pub fn parent_nodes(&self) -> Option<&[Option<usize>]> {
        self.parent_nodes.as_deref()
    }

    /// Replaces the dependency tree. The sample order must be recomputed
    /// with [`find_sample_order`](Self::find_sample_order) afterwards.
    ///
    /// # Errors
    /// `LengthMismatch` if `parents` does not have one entry per position.
    pub fn set_parent_nodes(&mut self, parents: Vec<Option<usize>>) -> ProblemResult<()> {
        check_length("parent nodes", &parents, self.core.length())?;
        self.parent_nodes = Some(parents);
        self.sample_order = None;
        Ok(())
    }

    /// Computes the order in which positions are sampled.
    ///
    /// # Errors
    /// `ModelNotFitted` if no dependency tree exists.
    pub fn find_sample_order(&mut self) -> ProblemResult<&[usize]> {
        let parents = self.parent_nodes.as_deref().ok_or_else(|| {
            ProblemError::ModelNotFitted(
                "no dependency tree; call eval_node_probs or set_parent_nodes first".into(),
            )
        })?;
        let order = sample_order(parents);
        Ok(self.sample_order.insert(order).as_slice())
    }

    pub fn sample_order(&self) -> Option<&[usize]> {
        self.sample_order.as_deref()
    }

    /// Draws `sample_size` states from the fitted model.
    ///
    /// Permutation problems repair each draw into a valid ordering.
    ///
    /// # Errors
    /// - `InvalidArgument` if `sample_size` is 0
    /// - `ModelNotFitted` if the tables, tree, or sample order is missing
    pub fn sample_pop<R: Rng>(
        &self,
        sample_size: usize,
        rng: &mut R,
    ) -> ProblemResult<Vec<Vec<usize>>> {
        if sample_size == 0 {
            return Err(ProblemError::invalid("sample_size must be a positive integer"));
        }
        let (Some(tables), Some(parents), Some(order)) = (
            self.node_probs.as_deref(),
            self.parent_nodes.as_deref(),
            self.sample_order.as_deref(),
        ) else {
            return Err(ProblemError::ModelNotFitted(
                "call eval_node_probs before sample_pop".into(),
            ));
        };

        let mut samples = sample_states(tables, parents, order, sample_size, rng);
        if self.permutation {
            for sample in &mut samples {
                repair_permutation(sample, &[]);
            }
        }
        Ok(samples)
    }
}

fn estimator(fast: bool) -> Box<dyn MutualInfoEstimator> {
    if fast {
        Box::new(FastMutualInfo::new())
    } else {
        Box::new(SlowMutualInfo)
    }
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is a fraction in `[0, 1]`; `values` is non-empty and NaN-free.
fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (sorted.len() - 1) as f64 * q;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
}

impl<F: FitnessFunction<usize>> OptimizationProblem for DiscreteProblem<F> {
    type Value = usize;
    type Fitness = F;

    fn core(&self) -> &ProblemCore<usize, F> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProblemCore<usize, F> {
        &mut self.core
    }

    fn random<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let length = self.core.length();
        if self.permutation {
            let mut perm: Vec<usize> = (0..length).collect();
            perm.shuffle(rng);
            perm
        } else {
            (0..length).map(|_| rng.random_range(0..self.max_val)).collect()
        }
    }

    fn random_neighbor<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut neighbor = self.core.state().to_vec();
        if self.permutation {
            swap_mutation(&mut neighbor, rng);
        } else {
            let i = rng.random_range(0..neighbor.len());
            neighbor[i] = other_value(neighbor[i], self.max_val, rng);
        }
        neighbor
    }

    /// Discrete: every single-position change, positions in order and
    /// values ascending. Permutation: every pairwise swap `(i, j)`, `i < j`.
    fn find_neighbors(&mut self) {
        let state = self.core.state();
        let length = state.len();
        let mut neighbors = Vec::new();

        if self.permutation {
            for i in 0..length {
                for j in (i + 1)..length {
                    let mut neighbor = state.to_vec();
                    neighbor.swap(i, j);
                    neighbors.push(neighbor);
                }
            }
        } else {
            for i in 0..length {
                for v in (0..self.max_val).filter(|&v| v != state[i]) {
                    let mut neighbor = state.to_vec();
                    neighbor[i] = v;
                    neighbors.push(neighbor);
                }
            }
        }
        self.core.set_neighbors(neighbors);
    }

    fn reproduce<R: Rng>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        mutation_prob: f64,
        rng: &mut R,
    ) -> ProblemResult<Vec<usize>> {
        let length = self.core.length();
        check_length("parent", parent1, length)?;
        check_length("parent", parent2, length)?;
        check_probability("mutation_prob", mutation_prob)?;

        if length == 1 {
            let parent = if rng.random_bool(0.5) { parent1 } else { parent2 };
            return Ok(parent.to_vec());
        }

        let mut child = self.crossover.combine(parent1, parent2, rng);
        for i in 0..length {
            if rng.random::<f64>() < mutation_prob {
                if self.permutation {
                    swap_with_other(&mut child, i, rng);
                } else {
                    child[i] = other_value(child[i], self.max_val, rng);
                }
            }
        }
        Ok(child)
    }
}
