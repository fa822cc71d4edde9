//! Scratch buffers of one solve.

use karcher_core::{
    error::Result,
    memory::try_zeros_vector,
    types::{DVector, Scalar},
};

/// Pre-allocated buffers for the fixed-point iteration.
///
/// Everything is sized once from (n, nActual) before the first iteration,
/// so the loop itself never allocates.
#[derive(Debug, Clone)]
pub struct SolverWorkspace<T: Scalar> {
    /// Current mean estimate (length n)
    pub(crate) mean: DVector<T>,
    /// Next mean estimate (length n)
    pub(crate) next_mean: DVector<T>,
    /// Tangent average of the current iteration (length n)
    pub(crate) alpha: DVector<T>,
    /// Tangent average of the previous iteration (length n)
    pub(crate) previous_alpha: DVector<T>,
    /// alpha − previous_alpha (length n)
    pub(crate) difference: DVector<T>,
    /// Projection of the mean onto every sample (length nActual)
    pub(crate) projections: DVector<T>,
}

impl<T: Scalar> SolverWorkspace<T> {
    /// Allocates buffers for preshapes of length `dim` and `n_samples` samples.
    ///
    /// # Errors
    /// Returns `ResourceExhaustion` if any buffer cannot be allocated; no
    /// buffer is kept in that case.
    pub fn new(dim: usize, n_samples: usize) -> Result<Self> {
        Ok(Self {
            mean: try_zeros_vector(dim)?,
            next_mean: try_zeros_vector(dim)?,
            alpha: try_zeros_vector(dim)?,
            previous_alpha: try_zeros_vector(dim)?,
            difference: try_zeros_vector(dim)?,
            projections: try_zeros_vector(n_samples)?,
        })
    }

    /// Current mean estimate.
    pub fn mean(&self) -> &DVector<T> {
        &self.mean
    }

    /// Tangent average of the last completed iteration.
    pub fn alpha(&self) -> &DVector<T> {
        &self.previous_alpha
    }
}
