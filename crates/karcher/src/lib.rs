//! # Karcher
//!
//! Weighted intrinsic (Fréchet/Karcher) mean shapes on the preshape sphere,
//! computed by iterative tangent-space averaging on top of dense
//! matrix-vector kernels.
//!
//! The workspace is split into:
//!
//! - [`karcher_core`]: scalar trait, errors, dense linear algebra, observers
//! - [`karcher_shapes`]: preshape samples and the log-like/exp-like tangent maps
//! - [`karcher_solver`]: the fixed-point iteration and its configuration
//!
//! [`compute_shape`] is the flat entry point for hosts that hand over raw
//! buffers: a column-major preshape tensor, an initial estimate and kernel
//! weights.
//!
//! # Example
//!
//! ```rust
//! use karcher::prelude::*;
//!
//! let s = 0.5f64.sqrt();
//! // Two samples of length 2, stored column by column
//! let preshapes = [1.0, 0.0, s, s];
//! let q0 = [1.0, 0.0];
//! let weights = [1.0, 1.0];
//!
//! let mean = compute_shape(2, 30, 1.0, false, 0.0, &preshapes, &q0, &weights).unwrap();
//! let angle = std::f64::consts::FRAC_PI_8;
//! assert!((mean[0] - angle.cos()).abs() < 1e-9);
//! ```

pub use karcher_core;
pub use karcher_shapes;
pub use karcher_solver;

pub use nalgebra;

use karcher_core::{
    error::{Result, ShapeError},
    memory::try_vector_from_slice,
    types::{DVector, Scalar},
};
use karcher_shapes::PreshapesView;
use karcher_solver::{ShapeMeanResult, ShapeMeanSolver, SolverConfig};

/// Computes the Karcher mean from raw host buffers.
///
/// # Arguments
///
/// * `n_actual` - number of samples (nActual), must be positive
/// * `num_steps` - iteration cap, must be positive
/// * `denom` - normalisation divisor, must be finite and non-zero
/// * `print_convergence_output` - print `Abs err / Rel err` lines to stdout
/// * `tol` - relative convergence tolerance, must be finite and non-negative
/// * `preshapes` - n × nActual column-major matrix, one flattened preshape per column
/// * `q0` - initial estimate; its length defines n
/// * `kernel_var` - nActual non-negative kernel weights
///
/// # Errors
///
/// Malformed sizes or controls yield an invalid-argument error before any
/// iteration runs; numerical breakdowns yield `NumericalInstability`.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(level = "debug", skip(preshapes, q0, kernel_var))]
pub fn compute_shape<T: Scalar>(
    n_actual: i32,
    num_steps: i32,
    denom: T,
    print_convergence_output: bool,
    tol: T,
    preshapes: &[T],
    q0: &[T],
    kernel_var: &[T],
) -> Result<DVector<T>> {
    let config = SolverConfig::new()
        .with_max_iterations(positive("num_steps", num_steps)?)
        .with_denominator(denom)
        .with_tolerance(tol)
        .with_verbose(print_convergence_output);
    compute_shape_with(config, n_actual, preshapes, q0, kernel_var).map(|result| result.mean)
}

/// Same as [`compute_shape`] with a full configuration, returning the
/// complete result (iterations, errors, termination reason).
pub fn compute_shape_with<T: Scalar>(
    config: SolverConfig<T>,
    n_actual: i32,
    preshapes: &[T],
    q0: &[T],
    kernel_var: &[T],
) -> Result<ShapeMeanResult<T>> {
    config.validate()?;
    let n_samples = positive("n_actual", n_actual)?;
    let dim = q0.len();
    if dim == 0 {
        return Err(ShapeError::invalid_argument(
            "q0",
            "initial estimate must not be empty",
        ));
    }
    // The preshape buffer is used in place as the n × nActual matrix
    let samples = PreshapesView::borrow_column_major(dim, n_samples, preshapes)?;
    if kernel_var.len() != n_samples {
        return Err(ShapeError::dimension_mismatch(
            format!("{n_samples} kernel weights"),
            format!("{}", kernel_var.len()),
        ));
    }

    let initial = try_vector_from_slice(q0)?;
    let weights = try_vector_from_slice(kernel_var)?;

    ShapeMeanSolver::new(config).solve(&samples, &initial, &weights)
}

fn positive(parameter: &str, value: i32) -> Result<usize> {
    if value <= 0 {
        return Err(ShapeError::invalid_argument(
            parameter,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(value as usize)
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{compute_shape, compute_shape_with};
    pub use karcher_core::prelude::*;
    pub use karcher_shapes::{PreshapeSpace, Preshapes, PreshapesView, ShapeDims};
    pub use karcher_solver::{
        KarcherIteration, ShapeMeanResult, ShapeMeanSolver, SolverConfig, StepMetrics,
    };
}
