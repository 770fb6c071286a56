//! Shared problem state.
//!
//! [`ProblemCore`] owns everything that is common to every problem variant:
//! the current state and its cached fitness, the neighbor set, the current
//! population with its fitness vector, mate probabilities, and the fitness
//! direction. All stored fitness values are sign-adjusted so that larger is
//! always better.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{check_length, ProblemError, ProblemResult};
use crate::fitness::FitnessFunction;

/// State and population bookkeeping shared by all problem variants.
pub struct ProblemCore<T, F> {
    length: usize,
    fitness_fn: F,
    maximize: bool,
    stop_fitness: Option<f64>,
    state: Vec<T>,
    fitness: f64,
    neighbors: Vec<Vec<T>>,
    population: Vec<Vec<T>>,
    pop_fitness: Vec<f64>,
    mate_probs: Vec<f64>,
    evaluations: AtomicUsize,
}

/// Resolves the problem length from an explicit value or the fitness
/// function's weights.
pub(crate) fn resolve_length<T, F: FitnessFunction<T>>(
    length: Option<usize>,
    fitness_fn: &F,
) -> ProblemResult<usize> {
    let length = match length {
        Some(n) => n,
        None => fitness_fn.weights().map(|w| w.len()).ok_or_else(|| {
            ProblemError::invalid("length must be given when the fitness function has no weights")
        })?,
    };
    if length == 0 {
        return Err(ProblemError::invalid("length must be a positive integer, got 0"));
    }
    Ok(length)
}

impl<T, F> ProblemCore<T, F>
where
    T: Copy + PartialEq + Send + Sync,
    F: FitnessFunction<T>,
{
    /// Creates a core starting from `state`, whose length is the problem
    /// length.
    pub(crate) fn new(
        fitness_fn: F,
        maximize: bool,
        stop_fitness: Option<f64>,
        state: Vec<T>,
    ) -> Self {
        let mut core = Self {
            length: state.len(),
            fitness_fn,
            maximize,
            stop_fitness,
            state,
            fitness: 0.0,
            neighbors: Vec::new(),
            population: Vec::new(),
            pop_fitness: Vec::new(),
            mate_probs: Vec::new(),
            evaluations: AtomicUsize::new(0),
        };
        core.fitness = core.score(&core.state);
        core
    }

    /// `1.0` for maximization, `-1.0` for minimization.
    fn sign(&self) -> f64 {
        if self.maximize {
            1.0
        } else {
            -1.0
        }
    }

    fn score(&self, state: &[T]) -> f64 {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.sign() * self.fitness_fn.evaluate(state)
    }

    fn score_rows(&self, rows: &[Vec<T>]) -> Vec<f64> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            rows.par_iter().map(|row| self.score(row)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            rows.iter().map(|row| self.score(row)).collect()
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn maximize(&self) -> bool {
        self.maximize
    }

    pub fn fitness_fn(&self) -> &F {
        &self.fitness_fn
    }

    pub fn state(&self) -> &[T] {
        &self.state
    }

    /// Sign-adjusted fitness of the current state.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Fitness of the current state in the fitness function's orientation.
    pub fn raw_fitness(&self) -> f64 {
        self.sign() * self.fitness
    }

    /// Number of fitness evaluations performed so far.
    pub fn fitness_evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Replaces the current state and caches its fitness.
    pub fn set_state(&mut self, state: Vec<T>) -> ProblemResult<()> {
        check_length("state", &state, self.length)?;
        self.fitness = self.score(&state);
        self.state = state;
        Ok(())
    }

    /// Sign-adjusted fitness of an arbitrary candidate.
    pub fn eval_fitness(&self, state: &[T]) -> ProblemResult<f64> {
        check_length("state", state, self.length)?;
        Ok(self.score(state))
    }

    pub fn neighbors(&self) -> &[Vec<T>] {
        &self.neighbors
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<Vec<T>>) {
        self.neighbors = neighbors;
    }

    /// The neighbor with the highest sign-adjusted fitness.
    ///
    /// Ties go to the first neighbor in storage order.
    pub fn best_neighbor(&self) -> Option<&[T]> {
        let scores = self.score_rows(&self.neighbors);
        first_max(&scores).map(|i| self.neighbors[i].as_slice())
    }

    pub fn population(&self) -> &[Vec<T>] {
        &self.population
    }

    /// Sign-adjusted fitness of each population row.
    pub fn pop_fitness(&self) -> &[f64] {
        &self.pop_fitness
    }

    /// Replaces the population and scores every row.
    pub fn set_population(&mut self, population: Vec<Vec<T>>) -> ProblemResult<()> {
        if population.is_empty() {
            return Err(ProblemError::invalid(
                "population must contain at least one individual",
            ));
        }
        for row in &population {
            check_length("population row", row, self.length)?;
        }

        self.pop_fitness = self.score_rows(&population);
        self.population = population;
        self.mate_probs.clear();
        log::trace!(
            "scored population of {} rows (length {})",
            self.population.len(),
            self.length
        );
        Ok(())
    }

    /// The population row with the highest sign-adjusted fitness.
    ///
    /// Ties go to the first row in storage order.
    pub fn best_child(&self) -> Option<&[T]> {
        first_max(&self.pop_fitness).map(|i| self.population[i].as_slice())
    }

    /// Computes fitness-proportional mating probabilities.
    ///
    /// Fitness values are shifted so the minimum maps to zero when any value
    /// is negative, then normalized. A zero (or non-finite) total falls back
    /// to the uniform distribution. Non-finite fitness values count as the
    /// population minimum.
    pub fn eval_mate_probs(&mut self) -> ProblemResult<&[f64]> {
        let n = self.pop_fitness.len();
        if n == 0 {
            return Err(ProblemError::invalid(
                "no population set; call set_population first",
            ));
        }

        let finite_min = self
            .pop_fitness
            .iter()
            .copied()
            .filter(|f| f.is_finite())
            .fold(f64::INFINITY, f64::min);
        let floor = if finite_min.is_finite() { finite_min } else { 0.0 };
        let shift = if floor < 0.0 { -floor } else { 0.0 };

        let weights: Vec<f64> = self
            .pop_fitness
            .iter()
            .map(|&f| (if f.is_finite() { f } else { floor }) + shift)
            .collect();
        let total: f64 = weights.iter().sum();

        self.mate_probs = if total > 0.0 && total.is_finite() {
            weights.iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / n as f64; n]
        };
        Ok(&self.mate_probs)
    }

    pub fn mate_probs(&self) -> &[f64] {
        &self.mate_probs
    }

    /// Whether the current state has reached the configured stop fitness.
    pub fn can_stop(&self) -> bool {
        match self.stop_fitness {
            Some(stop) if self.maximize => self.raw_fitness() >= stop,
            Some(stop) => self.raw_fitness() <= stop,
            None => false,
        }
    }
}

/// Index of the first maximal value. NaN never wins.
fn first_max(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            None if !v.is_nan() => best = Some(i),
            Some(b) if v > values[b] => best = Some(i),
            _ => {}
        }
    }
    best
}
