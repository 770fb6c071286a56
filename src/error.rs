//! Error types for optimization problems.
//!
//! Every fallible operation returns [`ProblemResult`]. Errors are raised to
//! the immediate caller and never retried internally.

use thiserror::Error;

/// Error type for problem construction and problem operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProblemError {
    /// A scalar argument is out of range or a configuration is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A state, population row, parent, or update vector has the wrong length.
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The fitness function lacks a capability the problem needs.
    #[error("Capability mismatch: {0}")]
    CapabilityMismatch(String),

    /// MIMIC sampling or fitting was requested before its inputs exist.
    #[error("Model not fitted: {0}")]
    ModelNotFitted(String),
}

impl ProblemError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn length(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what,
            expected,
            actual,
        }
    }
}

/// Result type alias for problem operations.
pub type ProblemResult<T> = Result<T, ProblemError>;

/// Checks that a slice has the problem length.
pub(crate) fn check_length<T>(what: &'static str, values: &[T], expected: usize) -> ProblemResult<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(ProblemError::length(what, expected, values.len()))
    }
}

/// Checks that a probability lies in `[0, 1]`.
pub(crate) fn check_probability(name: &str, p: f64) -> ProblemResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ProblemError::invalid(format!("{name} must be between 0 and 1, got {p}")))
    }
}
