//! Continuous problem configuration.

use crate::error::{ProblemError, ProblemResult};

/// Configuration for a bounded continuous problem.
///
/// # Examples
///
/// ```
/// use u_optprob::continuous::ContinuousConfig;
///
/// let config = ContinuousConfig::default()
///     .with_length(4)
///     .with_bounds(-5.0, 5.0)
///     .with_step(0.5);
/// assert!(config.validate().is_ok());
///
/// let bad = ContinuousConfig::default().with_step(2.0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContinuousConfig {
    /// Number of positions in a state.
    ///
    /// `None` infers the length from the fitness function's weights.
    pub length: Option<usize>,

    /// Whether larger fitness is better.
    pub maximize: bool,

    /// Lower bound of every position.
    pub min_val: f64,

    /// Upper bound of every position.
    pub max_val: f64,

    /// Neighbor and mutation step size. Must be positive and smaller than
    /// `max_val - min_val`.
    pub step: f64,

    /// Raw fitness at which a driver may stop early.
    pub stop_fitness: Option<f64>,
}

impl Default for ContinuousConfig {
    fn default() -> Self {
        Self {
            length: None,
            maximize: true,
            min_val: 0.0,
            max_val: 1.0,
            step: 0.1,
            stop_fitness: None,
        }
    }
}

impl ContinuousConfig {
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

    /// Sets both bounds.
    pub fn with_bounds(mut self, min_val: f64, max_val: f64) -> Self {
        self.min_val = min_val;
        self.max_val = max_val;
        self
    }

    /// Sets the step size.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Sets the stop fitness.
    pub fn with_stop_fitness(mut self, stop: f64) -> Self {
        self.stop_fitness = Some(stop);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ProblemResult<()> {
        if self.length == Some(0) {
            return Err(ProblemError::invalid("length must be a positive integer, got 0"));
        }
        if !self.min_val.is_finite() || !self.max_val.is_finite() {
            return Err(ProblemError::invalid(format!(
                "bounds must be finite, got [{}, {}]",
                self.min_val, self.max_val
            )));
        }
        if self.max_val <= self.min_val {
            return Err(ProblemError::invalid(format!(
                "max_val must be greater than min_val, got min_val {} and max_val {}",
                self.min_val, self.max_val
            )));
        }
        if !(self.step > 0.0) {
            return Err(ProblemError::invalid(format!(
                "step size must be positive, got {}",
                self.step
            )));
        }
        if self.step >= self.max_val - self.min_val {
            return Err(ProblemError::invalid(format!(
                "step size must be less than max_val - min_val ({}), got {}",
                self.max_val - self.min_val,
                self.step
            )));
        }
        Ok(())
    }
}
