//! Bounded continuous problems.
//!
//! States are real vectors clipped into `[min_val, max_val]`; neighbors and
//! mutations move positions by a fixed `step`. [`ContinuousProblem`] also
//! exposes a bounded update hook and the fitness function's gradient for
//! gradient-driven callers.

mod config;
mod problem;

pub use config::ContinuousConfig;
pub use problem::ContinuousProblem;
