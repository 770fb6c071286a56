//! Fitness function capability contract.
//!
//! Problems consume fitness functions only through [`FitnessFunction`].
//! The capability set (evaluation, problem-type tag, optional weights,
//! optional gradients) is checked when a problem is constructed, not on
//! first use.

/// One layer of a gradient update (row-major matrix).
pub type GradientLayer = Vec<Vec<f64>>;

/// Problem family a fitness function is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProblemType {
    /// Integer states over a fixed alphabet.
    Discrete,
    /// Bounded real-valued states.
    Continuous,
    /// Orderings of `0..L` (tours, assignments).
    Permutation,
    /// Works on any state representation.
    #[default]
    Either,
}

impl ProblemType {
    /// Whether a discrete problem may use this fitness function.
    pub fn is_discrete_compatible(self) -> bool {
        matches!(
            self,
            ProblemType::Discrete | ProblemType::Permutation | ProblemType::Either
        )
    }

    /// Whether a continuous problem may use this fitness function.
    pub fn is_continuous_compatible(self) -> bool {
        matches!(self, ProblemType::Continuous | ProblemType::Either)
    }
}

/// A fitness function over states with element type `T`.
///
/// Larger values are better when the owning problem maximizes; problems
/// flip the sign internally for minimization.
///
/// # Implementing
///
/// ```
/// use u_optprob::fitness::{FitnessFunction, ProblemType};
///
/// struct OneMax;
///
/// impl FitnessFunction<usize> for OneMax {
///     fn evaluate(&self, state: &[usize]) -> f64 {
///         state.iter().sum::<usize>() as f64
///     }
///
///     fn problem_type(&self) -> ProblemType {
///         ProblemType::Discrete
///     }
/// }
///
/// assert_eq!(OneMax.evaluate(&[1, 0, 1]), 2.0);
/// ```
pub trait FitnessFunction<T>: Send + Sync {
    /// Scores a state.
    fn evaluate(&self, state: &[T]) -> f64;

    /// The problem family this function is written for.
    fn problem_type(&self) -> ProblemType {
        ProblemType::Either
    }

    /// Per-position weights, if the function has them.
    ///
    /// When a problem is configured without an explicit length, the length
    /// of this sequence is used instead.
    fn weights(&self) -> Option<&[f64]> {
        None
    }

    /// Layered gradient of the most recent evaluation, if supported.
    ///
    /// Consumed by [`ContinuousProblem::calculate_updates`](crate::continuous::ContinuousProblem::calculate_updates).
    fn gradient_updates(&self) -> Option<Vec<GradientLayer>> {
        None
    }
}

impl<T, F: FitnessFunction<T> + ?Sized> FitnessFunction<T> for Box<F> {
    fn evaluate(&self, state: &[T]) -> f64 {
        (**self).evaluate(state)
    }

    fn problem_type(&self) -> ProblemType {
        (**self).problem_type()
    }

    fn weights(&self) -> Option<&[f64]> {
        (**self).weights()
    }

    fn gradient_updates(&self) -> Option<Vec<GradientLayer>> {
        (**self).gradient_updates()
    }
}

/// Fitness function backed by a closure.
///
/// ```
/// use u_optprob::fitness::{CustomFitness, FitnessFunction, ProblemType};
///
/// let sphere = CustomFitness::new(
///     |x: &[f64]| -x.iter().map(|v| v * v).sum::<f64>(),
///     ProblemType::Continuous,
/// );
/// assert_eq!(sphere.evaluate(&[1.0, 2.0]), -5.0);
/// ```
pub struct CustomFitness<F> {
    func: F,
    problem_type: ProblemType,
    weights: Option<Vec<f64>>,
}

impl<F> CustomFitness<F> {
    /// Wraps `func` with the given problem-type tag.
    pub fn new(func: F, problem_type: ProblemType) -> Self {
        Self {
            func,
            problem_type,
            weights: None,
        }
    }

    /// Attaches a weights sequence (used for length inference).
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }
}

impl<T, F> FitnessFunction<T> for CustomFitness<F>
where
    F: Fn(&[T]) -> f64 + Send + Sync,
{
    fn evaluate(&self, state: &[T]) -> f64 {
        (self.func)(state)
    }

    fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }
}
