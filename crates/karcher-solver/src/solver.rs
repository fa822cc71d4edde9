//! Karcher mean of preshapes by iterative tangent-space averaging.
//!
//! # Algorithm
//!
//! Starting from an initial estimate q₀ on the preshape sphere, iteration t
//! performs:
//!
//! 1. α ← Σᵢ wᵢ log_q(pᵢ), evaluated as P w − ((Pᵀ q)·w) q
//! 2. α ← α · (1/nActual) / denom
//! 3. absErr = ‖α − α_prev‖, relErr = absErr / ‖α‖ (both set to `tol` when t = 1)
//! 4. q ← exp_q(α) = sqrt(1 − ‖α‖²) q + α
//!
//! and continues while t ≤ numSteps and relErr ≥ tol. Since relErr equals
//! `tol` after the first iteration, the convergence test can only stop the
//! loop from the second iteration on.
//!
//! # Numerical policy
//!
//! - ‖α‖ = 0 with absErr = 0: nothing moved between two iterations, so
//!   relErr is reported as 0 and the tolerance test stops the loop.
//! - ‖α‖ = 0 with absErr > 0: relErr is +∞ and the iteration is treated as
//!   not yet converged. The following iteration sees absErr = 0.
//! - A non-finite α, or a NaN relErr, aborts with `NumericalInstability`.
//! - ‖α‖² > 1 beyond round-off aborts with `NumericalInstability` in the
//!   exp-like step.
//!
//! The solve either returns a complete result or an error; a partially
//! updated estimate is never handed out.

use crate::{config::SolverConfig, workspace::SolverWorkspace};
use karcher_core::{
    callback::{
        CancellationToken, IterationInfo, IterationObserver, PrintConvergenceObserver,
        SolveStartInfo, SolveSummary, TerminationReason,
    },
    compute::DenseLinearAlgebra,
    error::{Result, ShapeError},
    numerical::stability::is_finite_vector,
    types::{DMatrix, DVector, Scalar},
};
use karcher_shapes::{PreshapeSpace, Preshapes, ShapeDims};
use nalgebra::{Dyn, Storage, VecStorage};
use num_traits::Float;
use std::time::{Duration, Instant};

/// Convergence metrics of one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepMetrics<T> {
    /// 1-indexed iteration number
    pub iteration: usize,
    /// ‖α − α_prev‖, or `tol` on the first iteration
    pub abs_error: T,
    /// absErr / ‖α‖, or `tol` on the first iteration.
    ///
    /// 0 when both absErr and ‖α‖ are 0, +∞ when only ‖α‖ is 0.
    pub rel_error: T,
    /// ‖α‖
    pub tangent_norm: T,
}

/// Outcome of a Karcher mean computation.
#[derive(Debug, Clone)]
pub struct ShapeMeanResult<T: Scalar> {
    /// Final mean estimate (length n)
    pub mean: DVector<T>,

    /// Number of iterations executed
    pub iterations: usize,

    /// Absolute error of the last iteration
    pub abs_error: T,

    /// Relative error of the last iteration (see [`StepMetrics::rel_error`])
    pub rel_error: T,

    /// Why the iteration stopped
    pub termination_reason: TerminationReason,

    /// True if the relative error fell below the tolerance
    pub converged: bool,

    /// Wall-clock time of the solve
    pub duration: Duration,

    /// Per-iteration metrics (iterations 2.., empty unless requested)
    pub history: Vec<IterationInfo<T>>,
}

impl<T: Scalar> ShapeMeanResult<T> {
    /// Creates a result; `converged` is derived from the termination reason.
    pub fn new(
        mean: DVector<T>,
        metrics: StepMetrics<T>,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        Self {
            mean,
            iterations: metrics.iteration,
            abs_error: metrics.abs_error,
            rel_error: metrics.rel_error,
            termination_reason,
            converged: termination_reason == TerminationReason::Converged,
            duration,
            history: Vec::new(),
        }
    }

    /// Attaches the iteration history.
    pub fn with_history(mut self, history: Vec<IterationInfo<T>>) -> Self {
        self.history = history;
        self
    }

    /// The mean reshaped into its (k-1) × m configuration matrix.
    pub fn configuration(&self, dims: ShapeDims) -> Result<DMatrix<T>> {
        dims.reshape(&self.mean)
    }
}

/// Step-by-step driver of the fixed-point iteration.
///
/// Obtained from [`ShapeMeanSolver::start`]; [`ShapeMeanSolver::solve`]
/// runs one of these to termination.
#[derive(Debug)]
pub struct KarcherIteration<'a, T: Scalar, S = VecStorage<T, Dyn, Dyn>> {
    space: PreshapeSpace,
    preshapes: &'a Preshapes<T, S>,
    weights: &'a DVector<T>,
    scale: T,
    tolerance: T,
    workspace: SolverWorkspace<T>,
    completed: usize,
}

impl<'a, T: Scalar, S: Storage<T, Dyn, Dyn> + Sync> KarcherIteration<'a, T, S> {
    /// Number of completed iterations.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Current mean estimate.
    pub fn mean(&self) -> &DVector<T> {
        self.workspace.mean()
    }

    /// Scaled tangent average of the last completed iteration.
    pub fn tangent(&self) -> &DVector<T> {
        self.workspace.alpha()
    }

    /// Performs one map, average, remap cycle.
    pub fn advance(&mut self) -> Result<StepMetrics<T>> {
        let t = self.completed + 1;
        let ws = &mut self.workspace;

        DenseLinearAlgebra::fill(&mut ws.alpha, T::zero());
        self.space.weighted_log_into(
            self.preshapes,
            &ws.mean,
            self.weights,
            &mut ws.projections,
            &mut ws.alpha,
        )?;
        DenseLinearAlgebra::scal(self.scale, &mut ws.alpha);

        if !is_finite_vector(&ws.alpha) {
            return Err(ShapeError::numerical_instability(
                t,
                "tangent average is not finite",
            ));
        }
        let tangent_norm = DenseLinearAlgebra::nrm2(&ws.alpha);

        let (abs_error, rel_error) = if t > 1 {
            DenseLinearAlgebra::copy(&ws.alpha, &mut ws.difference)?;
            DenseLinearAlgebra::axpy(-T::one(), &ws.previous_alpha, &mut ws.difference)?;
            let abs_error = DenseLinearAlgebra::nrm2(&ws.difference);
            let rel_error = if tangent_norm == T::zero() {
                if abs_error == T::zero() {
                    T::zero()
                } else {
                    <T as Float>::infinity()
                }
            } else {
                abs_error / tangent_norm
            };
            if Float::is_nan(rel_error) {
                return Err(ShapeError::numerical_instability(
                    t,
                    format!("relative error is NaN (abs {abs_error:e}, norm {tangent_norm:e})"),
                ));
            }
            (abs_error, rel_error)
        } else {
            (self.tolerance, self.tolerance)
        };

        self.space
            .exp_into(&ws.alpha, &ws.mean, &mut ws.next_mean)
            .map_err(|e| e.at_iteration(t))?;

        std::mem::swap(&mut ws.mean, &mut ws.next_mean);
        std::mem::swap(&mut ws.alpha, &mut ws.previous_alpha);
        self.completed = t;

        Ok(StepMetrics {
            iteration: t,
            abs_error,
            rel_error,
            tangent_norm,
        })
    }

    /// Consumes the driver and returns the final estimate.
    pub fn into_mean(self) -> DVector<T> {
        self.workspace.mean
    }
}

/// Computes the weighted Karcher mean of a sample of preshapes.
///
/// # Example
///
/// ```rust
/// use karcher_solver::{ShapeMeanSolver, SolverConfig};
/// use karcher_shapes::Preshapes;
/// use nalgebra::DVector;
///
/// let samples = Preshapes::from_column_major(2, 1, &[0.0f64, 1.0]).unwrap();
/// let q0 = DVector::from_vec(vec![0.6f64, 0.8]);
/// let weights = DVector::from_vec(vec![1.0f64]);
///
/// let mut solver = ShapeMeanSolver::new(SolverConfig::new().with_max_iterations(3));
/// let result = solver.solve(&samples, &q0, &weights).unwrap();
/// assert!((result.mean[1] - 1.0).abs() < 1e-12);
/// ```
pub struct ShapeMeanSolver<T: Scalar> {
    config: SolverConfig<T>,
    observers: Vec<Box<dyn IterationObserver<T>>>,
    cancellation: Option<CancellationToken>,
}

impl<T: Scalar> std::fmt::Debug for ShapeMeanSolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeMeanSolver")
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

impl<T: Scalar> ShapeMeanSolver<T> {
    /// Creates a solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self {
            config,
            observers: Vec::new(),
            cancellation: None,
        }
    }

    /// Attaches an iteration observer.
    pub fn with_observer<O: IterationObserver<T> + 'static>(mut self, observer: O) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Attaches a cancellation token, checked between iterations.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Validates the inputs and prepares a step-by-step driver.
    ///
    /// `preshapes` may own its matrix or borrow a caller buffer.
    pub fn start<'a, S: Storage<T, Dyn, Dyn> + Sync>(
        &self,
        preshapes: &'a Preshapes<T, S>,
        initial_mean: &DVector<T>,
        weights: &'a DVector<T>,
    ) -> Result<KarcherIteration<'a, T, S>> {
        self.config.validate()?;
        validate_inputs(preshapes, initial_mean, weights)?;

        let dim = preshapes.dim();
        let n_samples = preshapes.n_samples();
        let space = PreshapeSpace::new(dim)?.with_thresholds(self.config.parallel.clone());

        if !space.is_point_on_manifold(initial_mean, <T as Float>::sqrt(T::MANIFOLD_TOLERANCE)) {
            tracing::warn!(
                norm = %initial_mean.norm(),
                "initial mean is not a unit-norm preshape"
            );
        }

        let mut workspace = SolverWorkspace::new(dim, n_samples)?;
        DenseLinearAlgebra::copy(initial_mean, &mut workspace.mean)?;

        let epsilon = T::one() / <T as Scalar>::from_usize(n_samples);
        Ok(KarcherIteration {
            space,
            preshapes,
            weights,
            scale: epsilon / self.config.denominator,
            tolerance: self.config.tolerance,
            workspace,
            completed: 0,
        })
    }

    /// Runs the iteration to convergence or until a budget is exhausted.
    pub fn solve<S: Storage<T, Dyn, Dyn> + Sync>(
        &mut self,
        preshapes: &Preshapes<T, S>,
        initial_mean: &DVector<T>,
        weights: &DVector<T>,
    ) -> Result<ShapeMeanResult<T>> {
        let start = Instant::now();
        let mut iteration = self.start(preshapes, initial_mean, weights)?;

        let _span = tracing::debug_span!(
            "karcher_mean",
            dim = preshapes.dim(),
            n_samples = preshapes.n_samples()
        )
        .entered();

        let mut printer = self.config.verbose.then(PrintConvergenceObserver::stdout);
        let start_info = SolveStartInfo {
            dim: preshapes.dim(),
            n_samples: preshapes.n_samples(),
            max_iterations: self.config.max_iterations,
        };
        for observer in self.observers.iter_mut() {
            observer.on_solve_start(&start_info)?;
        }

        let tol = self.config.tolerance;
        let mut last = StepMetrics {
            iteration: 0,
            abs_error: tol,
            rel_error: tol,
            tangent_norm: T::zero(),
        };
        let mut history = Vec::new();
        let mut reason = None;

        while last.iteration < self.config.max_iterations && last.rel_error >= tol {
            if last.iteration > 0 {
                if let Some(stop) = self.interruption(start.elapsed()) {
                    reason = Some(stop);
                    break;
                }
            }

            last = iteration.advance()?;
            tracing::debug!(
                iteration = last.iteration,
                abs_err = %last.abs_error,
                rel_err = %last.rel_error,
                tangent_norm = %last.tangent_norm,
                "karcher iteration"
            );

            if last.iteration > 1 {
                let info = IterationInfo {
                    iteration: last.iteration,
                    abs_error: last.abs_error,
                    rel_error: last.rel_error,
                    tangent_norm: last.tangent_norm,
                    elapsed: start.elapsed(),
                };
                let keep_going = notify(&mut self.observers, printer.as_mut(), &info)?;
                if self.config.record_history {
                    history.push(info);
                }
                if !keep_going {
                    reason = Some(TerminationReason::ObserverRequest);
                    break;
                }
            }
        }

        let reason = reason.unwrap_or(if last.rel_error < tol {
            TerminationReason::Converged
        } else {
            TerminationReason::MaxIterations
        });
        let duration = start.elapsed();
        tracing::debug!(
            iterations = last.iteration,
            reason = ?reason,
            elapsed_ms = duration.as_millis() as u64,
            "karcher mean finished"
        );

        let summary = SolveSummary {
            iterations: last.iteration,
            abs_error: last.abs_error,
            rel_error: last.rel_error,
            termination_reason: reason,
            elapsed: duration,
        };
        for observer in self.observers.iter_mut() {
            observer.on_solve_end(&summary)?;
        }
        if let Some(p) = printer.as_mut() {
            p.on_solve_end(&summary)?;
        }

        Ok(ShapeMeanResult::new(iteration.into_mean(), last, duration, reason).with_history(history))
    }

    fn interruption(&self, elapsed: Duration) -> Option<TerminationReason> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Some(TerminationReason::Cancelled);
        }
        if self.config.max_time.is_some_and(|budget| elapsed >= budget) {
            return Some(TerminationReason::MaxTime);
        }
        None
    }
}

fn notify<T: Scalar>(
    observers: &mut [Box<dyn IterationObserver<T>>],
    printer: Option<&mut PrintConvergenceObserver>,
    info: &IterationInfo<T>,
) -> Result<bool> {
    let mut keep_going = true;
    if let Some(p) = printer {
        keep_going &= p.on_iteration_end(info)?;
    }
    for observer in observers.iter_mut() {
        keep_going &= observer.on_iteration_end(info)?;
    }
    Ok(keep_going)
}

fn validate_inputs<T: Scalar, S: Storage<T, Dyn, Dyn>>(
    preshapes: &Preshapes<T, S>,
    initial_mean: &DVector<T>,
    weights: &DVector<T>,
) -> Result<()> {
    if initial_mean.len() != preshapes.dim() {
        return Err(ShapeError::dimension_mismatch(
            format!("initial mean of length {}", preshapes.dim()),
            format!("length {}", initial_mean.len()),
        ));
    }
    if weights.len() != preshapes.n_samples() {
        return Err(ShapeError::dimension_mismatch(
            format!("{} kernel weights", preshapes.n_samples()),
            format!("{}", weights.len()),
        ));
    }
    if !is_finite_vector(initial_mean) {
        return Err(ShapeError::invalid_argument(
            "q0",
            "initial mean contains non-finite values",
        ));
    }
    if let Some((i, w)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !Float::is_finite(**w) || **w < T::zero())
    {
        return Err(ShapeError::invalid_argument(
            "kernel_var",
            format!("weight {i} must be finite and non-negative, got {w}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use karcher_core::callback::{FnObserver, RecordingObserver};

    fn two_samples() -> (Preshapes<f64>, DVector<f64>, DVector<f64>) {
        let s = 0.5f64.sqrt();
        let p = Preshapes::from_column_major(3, 2, &[1.0, 0.0, 0.0, s, s, 0.0]).unwrap();
        let q0 = DVector::from_vec(vec![1.0, 0.0, 0.0]);
        let w = DVector::from_vec(vec![1.0, 1.0]);
        (p, q0, w)
    }

    #[test]
    fn test_first_step_errors_equal_tolerance() {
        let (p, q0, w) = two_samples();
        let solver = ShapeMeanSolver::new(SolverConfig::new().with_tolerance(1e-4));
        let mut it = solver.start(&p, &q0, &w).unwrap();
        let m = it.advance().unwrap();
        assert_eq!(m.iteration, 1);
        assert_eq!(m.abs_error, 1e-4);
        assert_eq!(m.rel_error, 1e-4);
        assert_eq!(it.completed(), 1);
    }

    #[test]
    fn test_first_step_values() {
        let (p, q0, w) = two_samples();
        let solver = ShapeMeanSolver::new(SolverConfig::new());
        let mut it = solver.start(&p, &q0, &w).unwrap();
        it.advance().unwrap();

        // alpha = 1/2 * [(p1 - q0) + (p2 - s q0)] = 1/2 * [0, s, 0]
        let s = 0.5f64.sqrt();
        assert_relative_eq!(it.tangent()[1], s / 2.0, epsilon = 1e-15);
        assert_relative_eq!(it.mean().norm(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_tolerance_zero_runs_to_cap() {
        let (p, q0, w) = two_samples();
        let recorder = RecordingObserver::new();
        let mut solver = ShapeMeanSolver::new(
            SolverConfig::new().with_tolerance(0.0).with_max_iterations(6),
        )
        .with_observer(recorder.clone());
        let result = solver.solve(&p, &q0, &w).unwrap();

        assert_eq!(result.iterations, 6);
        assert_eq!(result.termination_reason, TerminationReason::MaxIterations);
        assert!(!result.converged);
        assert_eq!(recorder.records().len(), 5);
        assert_eq!(recorder.records()[0].iteration, 2);
    }

    #[test]
    fn test_approaches_bisector() {
        let (p, q0, w) = two_samples();
        let mut solver = ShapeMeanSolver::new(
            SolverConfig::new().with_tolerance(0.0).with_max_iterations(40),
        );
        let result = solver.solve(&p, &q0, &w).unwrap();

        let angle = std::f64::consts::FRAC_PI_8;
        assert_relative_eq!(result.mean[0], angle.cos(), epsilon = 1e-10);
        assert_relative_eq!(result.mean[1], angle.sin(), epsilon = 1e-10);
        assert!(result.mean[2].abs() < 1e-12);
    }

    #[test]
    fn test_damped_iteration_converges() {
        // A large divisor shrinks each step, so successive tangent averages
        // differ by about 2% and the relative test fires on iteration 2
        let (p, q0, w) = two_samples();
        let mut solver = ShapeMeanSolver::new(
            SolverConfig::new()
                .with_denominator(50.0)
                .with_tolerance(0.05),
        );
        let result = solver.solve(&p, &q0, &w).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 2);
        assert!(result.rel_error < 0.05 && result.rel_error > 0.0);
    }

    #[test]
    fn test_observer_can_stop() {
        let (p, q0, w) = two_samples();
        let mut solver = ShapeMeanSolver::new(SolverConfig::new().with_tolerance(0.0))
            .with_observer(FnObserver::new(|info: &IterationInfo<f64>| info.iteration < 3));
        let result = solver.solve(&p, &q0, &w).unwrap();
        assert_eq!(result.iterations, 3);
        assert_eq!(result.termination_reason, TerminationReason::ObserverRequest);
    }

    #[test]
    fn test_cancellation_between_iterations() {
        let (p, q0, w) = two_samples();
        let token = CancellationToken::new();
        let trigger = token.clone();
        let mut solver = ShapeMeanSolver::new(SolverConfig::new().with_tolerance(0.0))
            .with_cancellation(token)
            .with_observer(FnObserver::new(move |info: &IterationInfo<f64>| {
                if info.iteration == 4 {
                    trigger.cancel();
                }
                true
            }));
        let result = solver.solve(&p, &q0, &w).unwrap();
        assert_eq!(result.iterations, 4);
        assert_eq!(result.termination_reason, TerminationReason::Cancelled);
    }

    #[test]
    fn test_pre_cancelled_still_runs_one_iteration() {
        let (p, q0, w) = two_samples();
        let token = CancellationToken::new();
        token.cancel();
        let mut solver =
            ShapeMeanSolver::new(SolverConfig::new().with_tolerance(0.0)).with_cancellation(token);
        let result = solver.solve(&p, &q0, &w).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.termination_reason, TerminationReason::Cancelled);
    }

    #[test]
    fn test_time_budget() {
        let (p, q0, w) = two_samples();
        let mut solver = ShapeMeanSolver::new(
            SolverConfig::new()
                .with_tolerance(0.0)
                .with_max_iterations(1_000_000)
                .with_max_time(Duration::ZERO),
        );
        let result = solver.solve(&p, &q0, &w).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.termination_reason, TerminationReason::MaxTime);
    }

    #[test]
    fn test_history_recording() {
        let (p, q0, w) = two_samples();
        let mut solver = ShapeMeanSolver::new(
            SolverConfig::new()
                .with_tolerance(0.0)
                .with_max_iterations(4)
                .with_history(true),
        );
        let result = solver.solve(&p, &q0, &w).unwrap();
        let iterations: Vec<usize> = result.history.iter().map(|h| h.iteration).collect();
        assert_eq!(iterations, vec![2, 3, 4]);
        assert!(result.history.iter().all(|h| h.abs_error >= 0.0 && h.rel_error >= 0.0));
    }

    #[test]
    fn test_overlong_tangent_is_reported() {
        // denom far below one blows the tangent average out of the unit ball
        let (p, q0, w) = two_samples();
        let mut solver = ShapeMeanSolver::new(SolverConfig::new().with_denominator(1e-3));
        let err = solver.solve(&p, &q0, &w).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::NumericalInstability { iteration: 1, .. }
        ));
    }

    #[test]
    fn test_symmetric_samples_stop_at_fixed_point() {
        // The tangent average at q0 cancels exactly, so absErr and ‖α‖ are
        // both zero on iteration 2
        let p = Preshapes::from_column_major(2, 2, &[0.8, 0.6, 0.8, -0.6]).unwrap();
        let q0 = DVector::from_vec(vec![1.0, 0.0]);
        let w = DVector::from_vec(vec![1.0, 1.0]);
        let mut solver = ShapeMeanSolver::new(SolverConfig::new());
        let result = solver.solve(&p, &q0, &w).unwrap();

        assert_eq!(result.iterations, 2);
        assert_eq!(result.abs_error, 0.0);
        assert_eq!(result.rel_error, 0.0);
        assert_eq!(result.termination_reason, TerminationReason::Converged);
        assert_eq!(result.mean, q0);
    }

    #[test]
    fn test_vanishing_tangent_is_not_yet_converged() {
        // One sample orthogonal to q0 is reached exactly in one step; the
        // tangent then vanishes while absErr is still 1
        let p = Preshapes::from_column_major(2, 1, &[0.0, 1.0]).unwrap();
        let q0 = DVector::from_vec(vec![1.0, 0.0]);
        let w = DVector::from_vec(vec![1.0]);
        let mut solver = ShapeMeanSolver::new(SolverConfig::new().with_history(true));
        let result = solver.solve(&p, &q0, &w).unwrap();

        let second = &result.history[0];
        assert_eq!(second.iteration, 2);
        assert_eq!(second.abs_error, 1.0);
        assert_eq!(second.tangent_norm, 0.0);
        assert!(second.rel_error.is_infinite() && second.rel_error > 0.0);

        assert_eq!(result.iterations, 3);
        assert_eq!(result.rel_error, 0.0);
        assert!(result.converged);
        assert_eq!(result.mean.as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn test_vanishing_tangent_runs_to_cap_with_zero_tolerance() {
        let p = Preshapes::from_column_major(2, 1, &[0.0, 1.0]).unwrap();
        let q0 = DVector::from_vec(vec![1.0, 0.0]);
        let w = DVector::from_vec(vec![1.0]);
        let mut solver = ShapeMeanSolver::new(
            SolverConfig::new().with_tolerance(0.0).with_max_iterations(5),
        );
        let result = solver.solve(&p, &q0, &w).unwrap();
        assert_eq!(result.iterations, 5);
        assert_eq!(result.termination_reason, TerminationReason::MaxIterations);
    }

    #[test]
    fn test_non_finite_preshape_is_reported() {
        let p = Preshapes::from_column_major(2, 2, &[1.0, 0.0, f64::NAN, 1.0]).unwrap();
        let q0 = DVector::from_vec(vec![1.0, 0.0]);
        let w = DVector::from_vec(vec![1.0, 1.0]);
        let mut solver = ShapeMeanSolver::new(SolverConfig::new());
        let err = solver.solve(&p, &q0, &w).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::NumericalInstability { iteration: 1, .. }
        ));
    }

    #[test]
    fn test_borrowed_preshapes_match_owned() {
        let s = 0.5f64.sqrt();
        let values = [1.0, 0.0, 0.0, s, s, 0.0];
        let owned = Preshapes::from_column_major(3, 2, &values).unwrap();
        let borrowed = karcher_shapes::PreshapesView::borrow_column_major(3, 2, &values).unwrap();
        let q0 = DVector::from_vec(vec![1.0, 0.0, 0.0]);
        let w = DVector::from_vec(vec![1.0, 1.0]);

        let config = SolverConfig::new().with_tolerance(0.0).with_max_iterations(8);
        let a = ShapeMeanSolver::new(config.clone()).solve(&owned, &q0, &w).unwrap();
        let b = ShapeMeanSolver::new(config).solve(&borrowed, &q0, &w).unwrap();
        assert_eq!(a.mean, b.mean);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_rejects_negative_weight() {
        let (p, q0, _) = two_samples();
        let w = DVector::from_vec(vec![1.0, -0.5]);
        let mut solver = ShapeMeanSolver::new(SolverConfig::new());
        assert!(solver.solve(&p, &q0, &w).unwrap_err().is_invalid_argument());
    }
}
