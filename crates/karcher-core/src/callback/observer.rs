//! Iteration observers.
//!
//! The solver reports its convergence metrics through the
//! [`IterationObserver`] trait instead of printing them. Observers are called
//! once per iteration after the first, because the first iteration has no
//! previous tangent vector to compare against.

use crate::{
    error::{Result, ShapeError},
    types::Scalar,
};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Why the fixed-point iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// Relative change of the tangent average fell below the tolerance
    Converged,
    /// Iteration cap exhausted
    MaxIterations,
    /// Wall-clock budget exhausted
    MaxTime,
    /// An observer asked to stop
    ObserverRequest,
    /// The cancellation token was triggered
    Cancelled,
}

/// Metrics of one completed iteration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationInfo<T> {
    /// 1-indexed iteration number
    pub iteration: usize,
    /// ‖alpha − alpha_prev‖
    pub abs_error: T,
    /// abs_error / ‖alpha‖
    pub rel_error: T,
    /// ‖alpha‖ of this iteration
    pub tangent_norm: T,
    /// Time elapsed since the solve started
    pub elapsed: Duration,
}

/// Problem dimensions announced at the start of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveStartInfo {
    /// Length of a flattened preshape
    pub dim: usize,
    /// Number of samples
    pub n_samples: usize,
    /// Iteration cap
    pub max_iterations: usize,
}

/// Final state reported when a solve ends without error.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveSummary<T> {
    /// Number of iterations executed
    pub iterations: usize,
    /// Last absolute error
    pub abs_error: T,
    /// Last relative error
    pub rel_error: T,
    /// Why the iteration stopped
    pub termination_reason: TerminationReason,
    /// Total wall-clock time
    pub elapsed: Duration,
}

/// Trait for iteration observers.
///
/// Observers can be used for progress output, recording convergence
/// histories or early stopping.
pub trait IterationObserver<T: Scalar>: Send {
    /// Called once before the first iteration.
    fn on_solve_start(&mut self, info: &SolveStartInfo) -> Result<()> {
        let _ = info;
        Ok(())
    }

    /// Called at the end of every iteration after the first.
    ///
    /// Returns `true` to continue, `false` to stop early.
    fn on_iteration_end(&mut self, info: &IterationInfo<T>) -> Result<bool>;

    /// Called once after the last iteration.
    fn on_solve_end(&mut self, summary: &SolveSummary<T>) -> Result<()> {
        let _ = summary;
        Ok(())
    }
}

/// An observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl<T: Scalar> IterationObserver<T> for NoOpObserver {
    fn on_iteration_end(&mut self, _info: &IterationInfo<T>) -> Result<bool> {
        Ok(true)
    }
}

/// Writes `  Abs err: …  Rel err: …` lines, one per iteration.
pub struct PrintConvergenceObserver {
    sink: Box<dyn Write + Send>,
}

impl PrintConvergenceObserver {
    /// Print to standard output.
    pub fn stdout() -> Self {
        Self {
            sink: Box::new(std::io::stdout()),
        }
    }

    /// Print to an arbitrary writer.
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Box::new(writer),
        }
    }
}

impl std::fmt::Debug for PrintConvergenceObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintConvergenceObserver").finish_non_exhaustive()
    }
}

impl<T: Scalar> IterationObserver<T> for PrintConvergenceObserver {
    fn on_iteration_end(&mut self, info: &IterationInfo<T>) -> Result<bool> {
        writeln!(
            self.sink,
            "  Abs err: {:e}  Rel err: {:e} ",
            info.abs_error, info.rel_error
        )
        .map_err(|e| ShapeError::observer(e.to_string()))?;
        Ok(true)
    }

    fn on_solve_end(&mut self, _summary: &SolveSummary<T>) -> Result<()> {
        self.sink
            .flush()
            .map_err(|e| ShapeError::observer(e.to_string()))
    }
}

/// Records every iteration into a shared history.
///
/// Clones share the same history, so a clone can be handed to the solver
/// while the original is kept to read the records afterwards.
#[derive(Debug, Clone)]
pub struct RecordingObserver<T> {
    records: Arc<Mutex<Vec<IterationInfo<T>>>>,
}

impl<T> Default for RecordingObserver<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> RecordingObserver<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded iterations.
    pub fn records(&self) -> Vec<IterationInfo<T>> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl<T: Scalar> IterationObserver<T> for RecordingObserver<T> {
    fn on_iteration_end(&mut self, info: &IterationInfo<T>) -> Result<bool> {
        self.records
            .lock()
            .map_err(|_| ShapeError::observer("recording history is poisoned"))?
            .push(info.clone());
        Ok(true)
    }
}

/// Adapts a closure into an observer; the closure returns `false` to stop.
pub struct FnObserver<F> {
    f: F,
}

impl<F> FnObserver<F> {
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> IterationObserver<T> for FnObserver<F>
where
    T: Scalar,
    F: FnMut(&IterationInfo<T>) -> bool + Send,
{
    fn on_iteration_end(&mut self, info: &IterationInfo<T>) -> Result<bool> {
        Ok((self.f)(info))
    }
}
