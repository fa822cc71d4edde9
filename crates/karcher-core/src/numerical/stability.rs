//! Numerical stability utilities.
//!
//! Helpers shared by the tangent map and the convergence check: a norm that
//! survives extreme magnitudes, a square root that forgives round-off below
//! zero, and finiteness checks for whole vectors.

use crate::types::{DVector, Scalar};
use num_traits::Float;

/// Outcome of a guarded square root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardedSqrt<T> {
    /// The argument was non-negative, or negative only by round-off.
    Value(T),
    /// The argument was genuinely negative.
    Negative(T),
}

/// Square root that clamps small negative values caused by rounding to zero.
///
/// Values in `(-ε, 0)` are treated as zero; anything below is reported as
/// [`GuardedSqrt::Negative`] carrying the original argument.
pub fn guarded_sqrt<T: Scalar>(x: T) -> GuardedSqrt<T> {
    if x >= T::zero() {
        GuardedSqrt::Value(<T as Float>::sqrt(x))
    } else if x > -T::EPSILON {
        GuardedSqrt::Value(T::zero())
    } else {
        GuardedSqrt::Negative(x)
    }
}

/// Stabilized norm computation for vectors
pub fn stable_norm<T: Scalar>(v: &DVector<T>) -> T {
    // Scale by the largest magnitude to avoid overflow/underflow
    let max_elem = v
        .iter()
        .map(|x| <T as Float>::abs(*x))
        .fold(T::zero(), |a, b| <T as Float>::max(a, b));

    if max_elem == T::zero() || !Float::is_finite(max_elem) {
        // NaN or infinite components propagate unchanged
        return if v.iter().any(|x| Float::is_nan(*x)) {
            T::nan()
        } else {
            max_elem
        };
    }

    let scaled = v
        .iter()
        .map(|x| {
            let s = *x / max_elem;
            s * s
        })
        .fold(T::zero(), |acc, x| acc + x);

    max_elem * <T as Float>::sqrt(scaled)
}

/// Check that every component of a vector is finite.
pub fn is_finite_vector<T: Scalar>(v: &DVector<T>) -> bool {
    v.iter().all(|x| Float::is_finite(*x))
}
