//! Numerical utilities and stability checks.

pub mod stability;

pub use stability::*;
