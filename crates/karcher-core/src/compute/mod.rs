//! Dense linear algebra backend.

pub mod dense;

pub use dense::DenseLinearAlgebra;
