//! Configuration of the Karcher mean iteration.

use karcher_core::{
    error::{Result, ShapeError},
    types::Scalar,
    utils::parallel_thresholds::{global_thresholds, ParallelThresholds},
};
use num_traits::Float;
use std::time::Duration;

/// Iteration controls for [`ShapeMeanSolver`](crate::ShapeMeanSolver).
///
/// # Fields
///
/// - **max_iterations**: iteration cap (`numSteps`)
/// - **tolerance**: threshold on the relative change of the tangent average
/// - **denominator**: normalisation divisor applied together with 1/nActual
/// - **verbose**: print `Abs err / Rel err` lines to stdout
/// - **max_time**: optional wall-clock budget, checked between iterations
/// - **record_history**: keep every iteration's metrics in the result
/// - **parallel**: dispatch thresholds for the two matrix-vector products
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig<T>
where
    T: Scalar,
{
    /// Maximum number of iterations
    pub max_iterations: usize,

    /// Relative convergence tolerance
    pub tolerance: T,

    /// Normalisation divisor of the tangent average
    pub denominator: T,

    /// Print per-iteration errors to stdout
    pub verbose: bool,

    /// Wall-clock budget
    pub max_time: Option<Duration>,

    /// Record per-iteration metrics in the result
    pub record_history: bool,

    /// Parallel dispatch thresholds
    pub parallel: ParallelThresholds,
}

impl<T> Default for SolverConfig<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: T::DEFAULT_TOLERANCE,
            denominator: T::one(),
            verbose: false,
            max_time: None,
            record_history: false,
            parallel: global_thresholds().clone(),
        }
    }
}

impl<T> SolverConfig<T>
where
    T: Scalar,
{
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Sets the relative convergence tolerance.
    pub fn with_tolerance(mut self, tol: T) -> Self {
        self.tolerance = tol;
        self
    }

    /// Sets the normalisation divisor.
    pub fn with_denominator(mut self, denom: T) -> Self {
        self.denominator = denom;
        self
    }

    /// Enables or disables stdout convergence output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Keeps per-iteration metrics in the result.
    pub fn with_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    /// Overrides the parallel dispatch thresholds.
    pub fn with_parallel(mut self, thresholds: ParallelThresholds) -> Self {
        self.parallel = thresholds;
        self
    }

    /// Checks the scalar controls.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(ShapeError::invalid_argument(
                "num_steps",
                "iteration cap must be positive",
            ));
        }
        if self.denominator == T::zero() || !Float::is_finite(self.denominator) {
            return Err(ShapeError::invalid_argument(
                "denom",
                format!("must be finite and non-zero, got {}", self.denominator),
            ));
        }
        if !(self.tolerance >= T::zero()) || !Float::is_finite(self.tolerance) {
            return Err(ShapeError::invalid_argument(
                "tol",
                format!("must be finite and non-negative, got {}", self.tolerance),
            ));
        }
        Ok(())
    }
}
