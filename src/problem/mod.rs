//! Optimization problem interface.
//!
//! One interface, [`OptimizationProblem`], with two independent variants:
//! [`DiscreteProblem`](crate::discrete::DiscreteProblem) and
//! [`ContinuousProblem`](crate::continuous::ContinuousProblem). Shared
//! bookkeeping lives in [`ProblemCore`]; variants supply the state-space
//! specific hooks (random states, neighbors, reproduction).
//!
//! Drivers (hill climbing, annealing, genetic algorithms, MIMIC) call into
//! a problem; a problem never calls back into its driver.
//!
//! # Example
//!
//! ```
//! use u_optprob::discrete::{DiscreteConfig, DiscreteProblem};
//! use u_optprob::fitness::{CustomFitness, ProblemType};
//! use u_optprob::problem::OptimizationProblem;
//! use u_optprob::random::create_rng;
//!
//! let one_max = CustomFitness::new(
//!     |x: &[usize]| x.iter().sum::<usize>() as f64,
//!     ProblemType::Discrete,
//! );
//! let mut problem = DiscreteProblem::new(one_max, DiscreteConfig::default().with_length(8))?;
//! let mut rng = create_rng(42);
//!
//! // One step of steepest-ascent hill climbing.
//! problem.find_neighbors();
//! let best = problem.best_neighbor().map(|s| s.to_vec());
//! if let Some(best) = best {
//!     problem.set_state(best)?;
//! }
//! assert_eq!(problem.fitness(), 1.0);
//!
//! problem.random_pop(20, &mut rng)?;
//! assert_eq!(problem.population().len(), 20);
//! # Ok::<(), u_optprob::error::ProblemError>(())
//! ```

mod base;

pub use base::ProblemCore;
pub(crate) use base::resolve_length;

use rand::Rng;

use crate::error::{ProblemError, ProblemResult};
use crate::fitness::FitnessFunction;

/// The problem surface consumed by optimization drivers.
///
/// All fitness values exposed here are sign-adjusted: larger is better
/// regardless of whether the problem maximizes or minimizes.
pub trait OptimizationProblem {
    /// Element type of a state vector.
    type Value: Copy + PartialEq + Send + Sync;

    /// Fitness function type.
    type Fitness: FitnessFunction<Self::Value>;

    /// Shared state and population bookkeeping.
    fn core(&self) -> &ProblemCore<Self::Value, Self::Fitness>;

    /// Mutable access to the shared bookkeeping.
    fn core_mut(&mut self) -> &mut ProblemCore<Self::Value, Self::Fitness>;

    /// Draws a uniformly random state.
    fn random<R: Rng>(&self, rng: &mut R) -> Vec<Self::Value>;

    /// Draws a random state adjacent to the current state.
    fn random_neighbor<R: Rng>(&self, rng: &mut R) -> Vec<Self::Value>;

    /// Enumerates all neighbors of the current state and stores them.
    fn find_neighbors(&mut self);

    /// Produces a child from two parents by crossover and mutation.
    ///
    /// # Errors
    /// `LengthMismatch` if a parent's length differs from the problem length;
    /// `InvalidArgument` if `mutation_prob` is outside `[0, 1]`.
    fn reproduce<R: Rng>(
        &self,
        parent1: &[Self::Value],
        parent2: &[Self::Value],
        mutation_prob: f64,
        rng: &mut R,
    ) -> ProblemResult<Vec<Self::Value>>;

    fn length(&self) -> usize {
        self.core().length()
    }

    fn maximize(&self) -> bool {
        self.core().maximize()
    }

    fn state(&self) -> &[Self::Value] {
        self.core().state()
    }

    /// Replaces the current state and caches its fitness.
    fn set_state(&mut self, state: Vec<Self::Value>) -> ProblemResult<()> {
        self.core_mut().set_state(state)
    }

    /// Sign-adjusted fitness of the current state.
    fn fitness(&self) -> f64 {
        self.core().fitness()
    }

    /// Fitness of the current state in the fitness function's orientation.
    fn raw_fitness(&self) -> f64 {
        self.core().raw_fitness()
    }

    /// Sign-adjusted fitness of any candidate; does not touch the state.
    fn eval_fitness(&self, state: &[Self::Value]) -> ProblemResult<f64> {
        self.core().eval_fitness(state)
    }

    fn fitness_evaluations(&self) -> usize {
        self.core().fitness_evaluations()
    }

    fn neighbors(&self) -> &[Vec<Self::Value>] {
        self.core().neighbors()
    }

    /// Best stored neighbor; ties go to the first in storage order.
    fn best_neighbor(&self) -> Option<&[Self::Value]> {
        self.core().best_neighbor()
    }

    fn population(&self) -> &[Vec<Self::Value>] {
        self.core().population()
    }

    fn pop_fitness(&self) -> &[f64] {
        self.core().pop_fitness()
    }

    /// Replaces and scores the population.
    fn set_population(&mut self, population: Vec<Vec<Self::Value>>) -> ProblemResult<()> {
        self.core_mut().set_population(population)
    }

    /// Best population row; ties go to the first in storage order.
    fn best_child(&self) -> Option<&[Self::Value]> {
        self.core().best_child()
    }

    /// Computes and stores fitness-proportional mating probabilities.
    fn eval_mate_probs(&mut self) -> ProblemResult<&[f64]> {
        self.core_mut().eval_mate_probs()
    }

    fn mate_probs(&self) -> &[f64] {
        self.core().mate_probs()
    }

    /// Builds and scores a population of `pop_size` random states.
    fn random_pop<R: Rng>(&mut self, pop_size: usize, rng: &mut R) -> ProblemResult<()> {
        if pop_size == 0 {
            return Err(ProblemError::invalid("pop_size must be a positive integer"));
        }
        let population = (0..pop_size).map(|_| self.random(rng)).collect();
        self.core_mut().set_population(population)
    }

    /// Replaces the current state with a random one.
    ///
    /// # Errors
    /// `LengthMismatch` if `random` yields a state of the wrong length.
    fn reset<R: Rng>(&mut self, rng: &mut R) -> ProblemResult<()> {
        let state = self.random(rng);
        self.core_mut().set_state(state)
    }

    /// Whether the configured stop fitness has been reached.
    fn can_stop(&self) -> bool {
        self.core().can_stop()
    }
}
