//! Thresholds for parallel matrix-vector products.
//!
//! Splitting the two products of the log map across threads only pays off
//! once the preshape matrix is large enough to amortise the scheduling cost.
//! The default scales a single-thread baseline with the size of the rayon
//! pool, so that machines with many threads need larger problems.

use std::sync::OnceLock;

/// Global default thresholds
static GLOBAL_THRESHOLDS: OnceLock<ParallelThresholds> = OnceLock::new();

/// Configuration for parallel execution of the dense kernels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParallelThresholds {
    /// Minimum number of matrix elements (rows × cols) before the
    /// two gemv products run concurrently
    pub matrix_vector_threshold: usize,

    /// Number of available threads (cached)
    pub num_threads: usize,
}

impl Default for ParallelThresholds {
    fn default() -> Self {
        let num_threads = rayon::current_num_threads();

        // 250 x 250 preshape matrix for a single thread
        let base_matrix_vector = 62_500;
        let thread_scaling = (num_threads as f64).sqrt();

        Self {
            matrix_vector_threshold: (base_matrix_vector as f64 * thread_scaling) as usize,
            num_threads,
        }
    }
}

impl ParallelThresholds {
    /// Create thresholds with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Thresholds that always dispatch to the parallel path.
    pub fn always() -> Self {
        Self {
            matrix_vector_threshold: 0,
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Thresholds that never dispatch to the parallel path.
    pub fn never() -> Self {
        Self {
            matrix_vector_threshold: usize::MAX,
            num_threads: 1,
        }
    }

    /// Set the matrix-vector threshold.
    pub fn with_matrix_vector_threshold(mut self, threshold: usize) -> Self {
        self.matrix_vector_threshold = threshold;
        self
    }

    /// Check if the gemv pair on a `rows × cols` matrix should run in parallel.
    pub fn should_parallelize_gemv(&self, rows: usize, cols: usize) -> bool {
        self.num_threads > 1 && rows.saturating_mul(cols) >= self.matrix_vector_threshold
    }
}

/// Get the process-wide default thresholds.
pub fn global_thresholds() -> &'static ParallelThresholds {
    GLOBAL_THRESHOLDS.get_or_init(ParallelThresholds::default)
}
