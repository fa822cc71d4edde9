//! Error types for shape mean estimation.
//!
//! This module defines the error taxonomy shared by every crate of the
//! workspace: malformed inputs, numerical breakdowns of the fixed-point
//! iteration, and scratch-buffer allocation failures.

use thiserror::Error;

/// Errors that can occur while computing a mean shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// An input parameter is out of its admissible range.
    ///
    /// Raised before the iteration starts, e.g. for a zero sample count,
    /// a zero iteration cap or a zero normalisation divisor.
    #[error("Invalid argument `{parameter}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter
        parameter: String,
        /// Description of why the value is rejected
        reason: String,
    },

    /// Dimension mismatch between vectors and matrices.
    ///
    /// This is a special case of an invalid argument: the lengths of the
    /// supplied buffers are not consistent with each other.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Numerical instability detected during the iteration.
    ///
    /// Occurs when the tangent vector leaves the unit ball before the
    /// exponential step, or when the convergence metric is not finite.
    #[error("Numerical instability at iteration {iteration}: {reason}")]
    NumericalInstability {
        /// Iteration (1-indexed) at which the problem was detected, 0 if outside the loop
        iteration: usize,
        /// Description of the numerical issue
        reason: String,
    },

    /// Scratch buffers could not be allocated.
    #[error("Resource exhaustion: could not allocate {requested} elements ({reason})")]
    ResourceExhaustion {
        /// Number of scalar elements requested
        requested: usize,
        /// Allocator message
        reason: String,
    },

    /// An iteration observer reported a failure.
    #[error("Observer failed: {reason}")]
    Observer {
        /// Description provided by the observer
        reason: String,
    },
}

impl ShapeError {
    /// Create an InvalidArgument error for a named parameter.
    pub fn invalid_argument<S1, S2>(parameter: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::InvalidArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a NumericalInstability error.
    pub fn numerical_instability<S: Into<String>>(iteration: usize, reason: S) -> Self {
        Self::NumericalInstability {
            iteration,
            reason: reason.into(),
        }
    }

    /// Create a ResourceExhaustion error.
    pub fn resource_exhaustion<S: Into<String>>(requested: usize, reason: S) -> Self {
        Self::ResourceExhaustion {
            requested,
            reason: reason.into(),
        }
    }

    /// Create an Observer error.
    pub fn observer<S: Into<String>>(reason: S) -> Self {
        Self::Observer {
            reason: reason.into(),
        }
    }

    /// Tags a numerical instability with the iteration it occurred in.
    ///
    /// Other variants are returned unchanged.
    pub fn at_iteration(self, iteration: usize) -> Self {
        match self {
            Self::NumericalInstability { reason, .. } => Self::NumericalInstability { iteration, reason },
            other => other,
        }
    }

    /// Returns true for errors caused by malformed inputs.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::DimensionMismatch { .. }
        )
    }

    /// Returns true for errors caused by a numerical breakdown.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::NumericalInstability { .. })
    }
}

/// Result type alias for operations that can produce ShapeError.
pub type Result<T> = std::result::Result<T, ShapeError>;
