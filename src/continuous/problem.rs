//! Bounded continuous problem.

use rand::Rng;

use super::config::ContinuousConfig;
use crate::crossover::operators::uniform_crossover;
use crate::error::{check_length, check_probability, ProblemError, ProblemResult};
use crate::fitness::{FitnessFunction, GradientLayer};
use crate::problem::{resolve_length, OptimizationProblem, ProblemCore};

/// A problem over real-valued states in `[min_val, max_val]`, moved in
/// steps of `step`.
///
/// # Examples
///
/// ```
/// use u_optprob::continuous::{ContinuousConfig, ContinuousProblem};
/// use u_optprob::fitness::{CustomFitness, ProblemType};
/// use u_optprob::problem::OptimizationProblem;
///
/// let sphere = CustomFitness::new(
///     |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>(),
///     ProblemType::Continuous,
/// );
/// let config = ContinuousConfig::default()
///     .with_length(3)
///     .with_bounds(-1.0, 1.0)
///     .with_step(0.5)
///     .with_maximize(false);
/// let mut problem = ContinuousProblem::new(sphere, config)?;
///
/// problem.set_state(vec![1.0, 0.0, -1.0])?;
/// problem.find_neighbors();
/// assert_eq!(problem.best_neighbor(), Some(&[0.5, 0.0, -1.0][..]));
/// # Ok::<(), u_optprob::error::ProblemError>(())
/// ```
pub struct ContinuousProblem<F> {
    core: ProblemCore<f64, F>,
    min_val: f64,
    max_val: f64,
    step: f64,
}

impl<F: FitnessFunction<f64>> ContinuousProblem<F> {
    /// Creates a problem whose initial state is `min_val` everywhere.
    ///
    /// # Errors
    /// - `InvalidArgument` for malformed bounds or step, or an unresolvable
    ///   length
    /// - `CapabilityMismatch` unless the fitness function is tagged
    ///   continuous or either
    pub fn new(fitness_fn: F, config: ContinuousConfig) -> ProblemResult<Self> {
        let problem_type = fitness_fn.problem_type();
        if !problem_type.is_continuous_compatible() {
            return Err(ProblemError::CapabilityMismatch(format!(
                "a {problem_type:?} fitness function cannot drive a continuous problem"
            )));
        }
        config.validate()?;
        let length = resolve_length(config.length, &fitness_fn)?;

        Ok(Self {
            core: ProblemCore::new(
                fitness_fn,
                config.maximize,
                config.stop_fitness,
                vec![config.min_val; length],
            ),
            min_val: config.min_val,
            max_val: config.max_val,
            step: config.step,
        })
    }

    pub fn min_val(&self) -> f64 {
        self.min_val
    }

    pub fn max_val(&self) -> f64 {
        self.max_val
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    fn clip(&self, value: f64) -> f64 {
        value.clamp(self.min_val, self.max_val)
    }

    /// Adds `updates` to the current state and clips into bounds.
    ///
    /// The result is returned, not committed; pass it to `set_state` to
    /// accept it.
    ///
    /// # Errors
    /// - `LengthMismatch` if `updates` does not have one entry per position
    /// - `InvalidArgument` if an update is NaN or infinite
    pub fn update_state(&self, updates: &[f64]) -> ProblemResult<Vec<f64>> {
        check_length("updates", updates, self.core.length())?;
        if let Some((i, u)) = updates.iter().enumerate().find(|(_, u)| !u.is_finite()) {
            return Err(ProblemError::invalid(format!(
                "update at position {i} is not finite: {u}"
            )));
        }
        Ok(self
            .core
            .state()
            .iter()
            .zip(updates)
            .map(|(x, u)| self.clip(x + u))
            .collect())
    }

    /// The fitness function's gradient for its most recent evaluation.
    ///
    /// # Errors
    /// `CapabilityMismatch` if the fitness function exposes no gradient.
    pub fn calculate_updates(&self) -> ProblemResult<Vec<GradientLayer>> {
        self.core.fitness_fn().gradient_updates().ok_or_else(|| {
            ProblemError::CapabilityMismatch(
                "the fitness function does not provide gradient updates".into(),
            )
        })
    }
}

impl<F: FitnessFunction<f64>> OptimizationProblem for ContinuousProblem<F> {
    type Value = f64;
    type Fitness = F;

    fn core(&self) -> &ProblemCore<f64, F> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ProblemCore<f64, F> {
        &mut self.core
    }

    fn random<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        (0..self.core.length())
            .map(|_| rng.random_range(self.min_val..=self.max_val))
            .collect()
    }

    /// Moves one random position by one step in a random direction.
    ///
    /// If clipping cancels the move, the opposite direction is used.
    fn random_neighbor<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let mut neighbor = self.core.state().to_vec();
        let i = rng.random_range(0..neighbor.len());
        let current = neighbor[i];
        let delta = if rng.random_bool(0.5) { self.step } else { -self.step };

        let moved = self.clip(current + delta);
        neighbor[i] = if moved == current {
            self.clip(current - delta)
        } else {
            moved
        };
        neighbor
    }

    /// Per position, `-step` then `+step`, clipped. Moves cancelled by
    /// clipping and repeated candidates are skipped.
    fn find_neighbors(&mut self) {
        let state = self.core.state();
        let mut neighbors: Vec<Vec<f64>> = Vec::with_capacity(2 * state.len());

        for i in 0..state.len() {
            for delta in [-self.step, self.step] {
                let mut neighbor = state.to_vec();
                neighbor[i] = self.clip(state[i] + delta);
                if neighbor.as_slice() != state && !neighbors.contains(&neighbor) {
                    neighbors.push(neighbor);
                }
            }
        }
        self.core.set_neighbors(neighbors);
    }

    fn reproduce<R: Rng>(
        &self,
        parent1: &[f64],
        parent2: &[f64],
        mutation_prob: f64,
        rng: &mut R,
    ) -> ProblemResult<Vec<f64>> {
        let length = self.core.length();
        check_length("parent", parent1, length)?;
        check_length("parent", parent2, length)?;
        check_probability("mutation_prob", mutation_prob)?;

        if length == 1 {
            let parent = if rng.random_bool(0.5) { parent1 } else { parent2 };
            return Ok(parent.to_vec());
        }

        let mut child = uniform_crossover(parent1, parent2, rng);
        for value in child.iter_mut() {
            if rng.random::<f64>() < mutation_prob {
                let delta = if rng.random_bool(0.5) { self.step } else { -self.step };
                *value = self.clip(*value + delta);
            }
        }
        Ok(child)
    }
}
