//! Core types, errors and numerical kernels for Karcher mean shape estimation.
//!
//! This crate provides the foundations shared by the shape and solver crates:
//! the scalar abstraction, the error taxonomy, dense BLAS-style primitives,
//! and the observer/cancellation hooks of the fixed-point iteration.
//!
//! # Modules
//!
//! - [`error`]: Error types for invalid inputs and numerical breakdowns
//! - [`types`]: Scalar trait, type aliases and tolerances
//! - [`compute`]: Dense linear algebra primitives (gemv, dot, axpy, scal, nrm2)
//! - [`memory`]: Fallible allocation of scratch buffers
//! - [`numerical`]: Stable norms and guarded square roots
//! - [`callback`]: Iteration observers and cancellation tokens
//! - [`utils`]: Parallel execution thresholds

pub mod callback;
pub mod compute;
pub mod core;
pub mod memory;
pub mod numerical;
pub mod utils;

pub use crate::core::{error, types};

// Re-export commonly used items at the crate root
pub use error::{Result, ShapeError};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use karcher_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{
        CancellationToken, FnObserver, IterationInfo, IterationObserver, NoOpObserver,
        PrintConvergenceObserver, RecordingObserver, SolveStartInfo, SolveSummary,
        TerminationReason,
    };
    pub use crate::compute::DenseLinearAlgebra;
    pub use crate::error::{Result, ShapeError};
    pub use crate::types::{DMatrix, DVector, Scalar};
    pub use crate::utils::ParallelThresholds;
}
