//! Type definitions and aliases for shape mean estimation.
//!
//! This module provides the scalar trait used by every numeric routine,
//! the dynamic vector/matrix aliases and per-precision tolerances.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display, LowerExp};

/// Trait for scalar types used by the solver (f32 or f64).
///
/// This trait combines all the numeric traits required by the dense
/// linear algebra kernels and the tangent map.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + LowerExp
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default tolerance for the relative convergence check.
    const DEFAULT_TOLERANCE: Self;

    /// Tolerance for checking if a point has unit norm.
    const MANIFOLD_TOLERANCE: Self;

    /// Convert from f64 (for sampled values).
    ///
    /// # Panics
    ///
    /// Panics if the value is not representable as `Self`.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Convert from usize (for sample counts).
    ///
    /// # Panics
    ///
    /// Panics if the value is not representable as `Self`.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-4;
    const MANIFOLD_TOLERANCE: Self = 1e-5;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-6;
    const MANIFOLD_TOLERANCE: Self = 1e-10;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;
