//! Optimization problem abstraction for metaheuristic drivers.
//!
//! Provides the state, population, and model machinery that optimization
//! algorithms iterate over:
//!
//! - **Problem interface**: [`problem::OptimizationProblem`], one trait with
//!   shared bookkeeping (state, fitness, neighbors, population, mate
//!   probabilities) and variant-specific hooks.
//! - **Discrete problems**: integer states over a fixed alphabet, or
//!   permutations, with the MIMIC dependency-tree model (mutual
//!   information, Chow-Liu tree, tree-conditioned sampling).
//! - **Continuous problems**: bounded real states moved in fixed steps, with
//!   a bounded update hook for gradient-driven callers.
//! - **Crossover**: pluggable strategies and the genetic operators they use.
//! - **Fitness**: the capability contract problems consume.
//!
//! # Architecture
//!
//! Drivers (hill climbing, simulated annealing, genetic algorithms, MIMIC)
//! call into a problem object and never the other way round. Every
//! randomized operation takes a caller-owned `Rng`, so seeded runs are
//! reproducible. No concrete fitness landscape is defined here.

pub mod continuous;
pub mod crossover;
pub mod discrete;
pub mod error;
pub mod fitness;
pub mod problem;
pub mod random;

/// Commonly used types.
pub mod prelude {
    pub use crate::continuous::{ContinuousConfig, ContinuousProblem};
    pub use crate::crossover::Crossover;
    pub use crate::discrete::{DiscreteConfig, DiscreteProblem};
    pub use crate::error::{ProblemError, ProblemResult};
    pub use crate::fitness::{CustomFitness, FitnessFunction, ProblemType};
    pub use crate::problem::OptimizationProblem;
    pub use crate::random::create_rng;
}
