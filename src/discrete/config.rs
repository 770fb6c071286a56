//! Discrete problem configuration.
//!
//! [`DiscreteConfig`] holds everything needed to construct a
//! [`DiscreteProblem`](super::DiscreteProblem) besides the fitness function.

use crate::crossover::Crossover;
use crate::error::{ProblemError, ProblemResult};

/// Configuration for a discrete-state problem.
///
/// # Defaults
///
/// ```
/// use u_optprob::discrete::DiscreteConfig;
///
/// let config = DiscreteConfig::default();
/// assert_eq!(config.max_val, 2);
/// assert!(config.maximize);
/// assert!(config.fast_mimic);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_optprob::crossover::Crossover;
/// use u_optprob::discrete::DiscreteConfig;
///
/// let config = DiscreteConfig::default()
///     .with_length(20)
///     .with_max_val(4)
///     .with_crossover(Crossover::Uniform)
///     .with_noise(0.05)
///     .with_maximize(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscreteConfig {
    /// Number of positions in a state.
    ///
    /// `None` infers the length from the fitness function's weights.
    pub length: Option<usize>,

    /// Whether larger fitness is better.
    pub maximize: bool,

    /// Alphabet size: every position takes a value in `0..max_val`.
    ///
    /// Ignored for permutation fitness functions, which force
    /// `max_val = length`.
    pub max_val: usize,

    /// Crossover strategy used by `reproduce`.
    ///
    /// `None` picks uniform crossover for binary alphabets, one-point
    /// crossover otherwise, and permutation repair for permutation problems.
    pub crossover: Option<Crossover>,

    /// Additive smoothing applied to every MIMIC probability cell.
    pub noise: f64,

    /// Use the cached single-sweep mutual information estimator.
    pub fast_mimic: bool,

    /// Raw fitness at which a driver may stop early.
    pub stop_fitness: Option<f64>,
}

impl Default for DiscreteConfig {
    fn default() -> Self {
        Self {
            length: None,
            maximize: true,
            max_val: 2,
            crossover: None,
            noise: 0.0,
            fast_mimic: true,
            stop_fitness: None,
        }
    }
}

impl DiscreteConfig {
    /// Sets the state length.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the fitness direction.
    pub fn with_maximize(mut self, maximize: bool) -> Self {
        self.maximize = maximize;
        self
    }

    /// Sets the alphabet size.
    pub fn with_max_val(mut self, max_val: usize) -> Self {
        self.max_val = max_val;
        self
    }

    /// Overrides the default crossover strategy.
    pub fn with_crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = Some(crossover);
        self
    }

    /// Sets the MIMIC smoothing noise.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Chooses between the fast and slow mutual information estimators.
    pub fn with_fast_mimic(mut self, fast: bool) -> Self {
        self.fast_mimic = fast;
        self
    }

    /// Sets the stop fitness.
    pub fn with_stop_fitness(mut self, stop: f64) -> Self {
        self.stop_fitness = Some(stop);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// `InvalidArgument` describing the first bad parameter.
    pub fn validate(&self) -> ProblemResult<()> {
        if self.length == Some(0) {
            return Err(ProblemError::invalid("length must be a positive integer, got 0"));
        }
        if self.max_val < 2 {
            return Err(ProblemError::invalid(format!(
                "max_val must be at least 2, got {}",
                self.max_val
            )));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(ProblemError::invalid(format!(
                "noise must be a non-negative number, got {}",
                self.noise
            )));
        }
        Ok(())
    }
}
