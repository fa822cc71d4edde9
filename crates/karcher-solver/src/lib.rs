//! Karcher mean shape solver.
//!
//! This crate implements the fixed-point iteration that computes a weighted
//! intrinsic (Fréchet/Karcher) mean of preshapes: map every sample into the
//! tangent space at the current estimate, average with kernel weights, and
//! map the average back onto the preshape sphere.
//!
//! # Examples
//!
//! ```rust
//! use karcher_solver::{ShapeMeanSolver, SolverConfig};
//! use karcher_shapes::Preshapes;
//! use nalgebra::DVector;
//!
//! let s = 0.5f64.sqrt();
//! let samples = Preshapes::from_column_major(2, 2, &[1.0, 0.0, s, s]).unwrap();
//! let q0 = DVector::from_vec(vec![1.0, 0.0]);
//! let weights = DVector::from_vec(vec![1.0, 1.0]);
//!
//! let mut solver = ShapeMeanSolver::new(
//!     SolverConfig::new()
//!         .with_max_iterations(50)
//!         .with_tolerance(1e-8),
//! );
//! let result = solver.solve(&samples, &q0, &weights).unwrap();
//! assert!((result.mean.norm() - 1.0).abs() < 1e-10);
//! ```

pub mod config;
pub mod solver;
pub mod workspace;

pub use config::SolverConfig;
pub use solver::{KarcherIteration, ShapeMeanResult, ShapeMeanSolver, StepMetrics};
pub use workspace::SolverWorkspace;

// Re-export commonly used items from core
pub use karcher_core::callback::{
    CancellationToken, FnObserver, IterationInfo, IterationObserver, NoOpObserver,
    PrintConvergenceObserver, RecordingObserver, TerminationReason,
};
