//! Utility modules.

pub mod parallel_thresholds;

pub use parallel_thresholds::{global_thresholds, ParallelThresholds};
