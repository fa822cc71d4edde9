//! Landmark configuration dimensions.

use karcher_core::{
    error::{Result, ShapeError},
    types::{DMatrix, DVector, Scalar},
};

/// Dimensions of a landmark configuration: `k` landmarks in `m` coordinates.
///
/// A preshape of such a configuration lives in R^((k-1)·m): centering
/// removes one landmark's worth of degrees of freedom, and the remaining
/// (k-1) × m matrix is flattened column by column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeDims {
    landmarks: usize,
    coords: usize,
}

impl ShapeDims {
    /// Creates the dimensions of `landmarks` points in `coords` dimensions.
    ///
    /// # Errors
    /// Returns an error if `landmarks` < 2 or `coords` == 0.
    pub fn new(landmarks: usize, coords: usize) -> Result<Self> {
        if landmarks < 2 {
            return Err(ShapeError::invalid_argument(
                "landmarks",
                "a shape needs at least two landmarks",
            ));
        }
        if coords == 0 {
            return Err(ShapeError::invalid_argument(
                "coords",
                "landmarks need at least one coordinate",
            ));
        }
        Ok(Self { landmarks, coords })
    }

    /// Number of landmarks (k).
    pub fn landmarks(&self) -> usize {
        self.landmarks
    }

    /// Number of coordinates per landmark (m).
    pub fn coords(&self) -> usize {
        self.coords
    }

    /// Number of rows of a preshape matrix (k-1).
    pub fn preshape_rows(&self) -> usize {
        self.landmarks - 1
    }

    /// Length of a flattened preshape, n = (k-1)·m.
    pub fn vector_len(&self) -> usize {
        self.preshape_rows() * self.coords
    }

    /// Reshapes a flattened preshape into its (k-1) × m matrix.
    pub fn reshape<T: Scalar>(&self, v: &DVector<T>) -> Result<DMatrix<T>> {
        if v.len() != self.vector_len() {
            return Err(ShapeError::dimension_mismatch(
                format!("vector of length {}", self.vector_len()),
                format!("length {}", v.len()),
            ));
        }
        Ok(DMatrix::from_column_slice(
            self.preshape_rows(),
            self.coords,
            v.as_slice(),
        ))
    }

    /// Flattens a (k-1) × m preshape matrix column by column.
    pub fn flatten<T: Scalar>(&self, z: &DMatrix<T>) -> Result<DVector<T>> {
        if z.nrows() != self.preshape_rows() || z.ncols() != self.coords {
            return Err(ShapeError::dimension_mismatch(
                format!("({}, {})", self.preshape_rows(), self.coords),
                format!("({}, {})", z.nrows(), z.ncols()),
            ));
        }
        Ok(DVector::from_column_slice(z.as_slice()))
    }
}
