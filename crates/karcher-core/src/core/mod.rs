//! Core types and errors.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
