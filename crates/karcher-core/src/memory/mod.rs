//! Memory management utilities.

pub mod buffer;

pub use buffer::{
    try_filled, try_matrix_from_column_slice, try_vector_from_slice, try_zeros_vector,
};
