//! Discrete-state problems.
//!
//! States are vectors of integers in `0..max_val`. Besides the usual
//! neighborhood and reproduction hooks, [`DiscreteProblem`] carries the
//! MIMIC model: elite selection, a dependency tree over positions fitted
//! from mutual information, and sampling of new states from that tree.
//!
//! # Submodules
//!
//! - [`config`]: [`DiscreteConfig`] with builder methods and validation
//! - [`mimic`]: mutual information estimators, tree fitting, sampling

pub mod config;
pub mod mimic;
mod problem;

pub use config::DiscreteConfig;
pub use mimic::{FastMutualInfo, MutualInfoEstimator, SlowMutualInfo};
pub use problem::DiscreteProblem;
