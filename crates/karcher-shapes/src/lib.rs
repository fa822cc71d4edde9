//! Preshape data and tangent maps for Karcher mean shape estimation.
//!
//! This crate provides the shape-space side of the workspace:
//!
//! - [`ShapeDims`]: landmark/coordinate counts and reshaping helpers
//! - [`Preshapes`]: a sample of flattened preshapes stored as an n × nActual matrix,
//!   owned or borrowed ([`PreshapesView`])
//! - [`PreshapeSpace`]: the preshape sphere with its log-like and exp-like maps
//!
//! # Example
//!
//! ```rust
//! use karcher_shapes::{PreshapeSpace, Preshapes};
//! use nalgebra::DVector;
//!
//! let space = PreshapeSpace::new(2).unwrap();
//! let samples = Preshapes::from_column_major(2, 2, &[1.0f64, 0.0, 0.0, 1.0]).unwrap();
//! let base = DVector::from_vec(vec![1.0, 0.0]);
//! let weights = DVector::from_vec(vec![1.0, 1.0]);
//!
//! let tangent = space.weighted_log(&samples, &base, &weights).unwrap();
//! assert_eq!(tangent.as_slice(), &[0.0, 1.0]);
//! ```

pub mod dims;
pub mod preshape_space;
pub mod preshapes;

pub use dims::ShapeDims;
pub use preshape_space::PreshapeSpace;
pub use preshapes::{Preshapes, PreshapesView};
