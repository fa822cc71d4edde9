//! Sample preshapes stored as one dense matrix.
//!
//! The (k-1, m, nActual) preshape tensor of a sample is consumed as an
//! n × nActual column-major matrix, n = (k-1)·m: column `i` is the flattened
//! preshape of sample `i`. Because the flattening of a Fortran-ordered
//! tensor is itself column-major, the raw tensor buffer can be used as the
//! matrix storage without reordering, either copied into an owned matrix or
//! borrowed in place through [`PreshapesView`].

use crate::dims::ShapeDims;
use karcher_core::{
    error::{Result, ShapeError},
    memory::try_matrix_from_column_slice,
    types::{DMatrix, DVector, Scalar},
};
use nalgebra::{DMatrixView, Dyn, Matrix, Storage, VecStorage, ViewStorage, U1};

/// An immutable collection of flattened preshapes, one per column.
///
/// `S` is the nalgebra storage of the n × nActual matrix: owned by default,
/// or a borrowed column-major buffer (see [`Preshapes::borrow_column_major`]).
#[derive(Debug, Clone)]
pub struct Preshapes<T: Scalar, S = VecStorage<T, Dyn, Dyn>> {
    data: Matrix<T, Dyn, Dyn, S>,
}

impl<T, S, S2> PartialEq<Preshapes<T, S2>> for Preshapes<T, S>
where
    T: Scalar,
    S: Storage<T, Dyn, Dyn>,
    S2: Storage<T, Dyn, Dyn>,
{
    fn eq(&self, other: &Preshapes<T, S2>) -> bool {
        self.data == other.data
    }
}

/// Preshapes borrowed from a caller-owned column-major buffer.
pub type PreshapesView<'a, T> = Preshapes<T, ViewStorage<'a, T, Dyn, Dyn, U1, Dyn>>;

fn check_counts(dim: usize, n_samples: usize) -> Result<()> {
    if dim == 0 {
        return Err(ShapeError::invalid_argument(
            "preshapes",
            "preshape length must be positive",
        ));
    }
    if n_samples == 0 {
        return Err(ShapeError::invalid_argument(
            "n_actual",
            "at least one sample is required",
        ));
    }
    Ok(())
}

impl<T: Scalar> Preshapes<T> {
    /// Wraps an existing n × nActual matrix.
    ///
    /// # Errors
    /// Returns an error if the matrix has no rows or no columns.
    pub fn from_matrix(data: DMatrix<T>) -> Result<Self> {
        check_counts(data.nrows(), data.ncols())?;
        Ok(Self { data })
    }

    /// Copies a column-major buffer of `dim * n_samples` values.
    pub fn from_column_major(dim: usize, n_samples: usize, values: &[T]) -> Result<Self> {
        check_counts(dim, n_samples)?;
        Self::from_matrix(try_matrix_from_column_slice(dim, n_samples, values)?)
    }

    /// Copies a flattened (k-1, m, nActual) tensor.
    pub fn from_tensor(dims: ShapeDims, n_samples: usize, values: &[T]) -> Result<Self> {
        Self::from_column_major(dims.vector_len(), n_samples, values)
    }

    /// Stacks flattened preshapes as columns.
    pub fn from_columns(columns: &[DVector<T>]) -> Result<Self> {
        let first = columns.first().ok_or_else(|| {
            ShapeError::invalid_argument("n_actual", "at least one sample is required")
        })?;
        let dim = first.len();
        if let Some((i, bad)) = columns.iter().enumerate().find(|(_, c)| c.len() != dim) {
            return Err(ShapeError::dimension_mismatch(
                format!("sample {i} of length {dim}"),
                format!("length {}", bad.len()),
            ));
        }
        Self::from_matrix(DMatrix::from_columns(columns))
    }
}

impl<'a, T: Scalar> PreshapesView<'a, T> {
    /// Borrows a column-major buffer of `dim * n_samples` values without
    /// copying it.
    ///
    /// # Errors
    /// Returns an error if a count is zero or the buffer length differs
    /// from `dim * n_samples`.
    pub fn borrow_column_major(dim: usize, n_samples: usize, values: &'a [T]) -> Result<Self> {
        check_counts(dim, n_samples)?;
        let expected = dim.checked_mul(n_samples).ok_or_else(|| {
            ShapeError::invalid_argument("preshapes", "n * n_actual overflows usize")
        })?;
        if values.len() != expected {
            return Err(ShapeError::dimension_mismatch(
                format!("{expected} preshape values ({dim} x {n_samples})"),
                format!("{}", values.len()),
            ));
        }
        Ok(Self {
            data: DMatrixView::from_slice(values, dim, n_samples),
        })
    }
}

impl<T: Scalar, S: Storage<T, Dyn, Dyn>> Preshapes<T, S> {
    /// Length of a flattened preshape (n).
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples (nActual).
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// The underlying n × nActual matrix.
    pub fn as_matrix(&self) -> &Matrix<T, Dyn, Dyn, S> {
        &self.data
    }

    /// Copy of sample `i`.
    ///
    /// # Panics
    /// Panics if `i >= n_samples()`.
    pub fn column(&self, i: usize) -> DVector<T> {
        self.data.column(i).into_owned()
    }

    /// Returns a copy whose column `j` is column `perm[j]` of `self`.
    ///
    /// # Errors
    /// Returns an error if `perm` is not a permutation of `0..n_samples()`.
    pub fn permute_columns(&self, perm: &[usize]) -> Result<Preshapes<T>> {
        let n = self.n_samples();
        let mut seen = vec![false; n];
        if perm.len() != n {
            return Err(ShapeError::dimension_mismatch(
                format!("permutation of length {n}"),
                format!("length {}", perm.len()),
            ));
        }
        for &p in perm {
            if p >= n || seen[p] {
                return Err(ShapeError::invalid_argument(
                    "perm",
                    format!("not a permutation of 0..{n}"),
                ));
            }
            seen[p] = true;
        }
        let data = DMatrix::from_fn(self.dim(), n, |r, c| self.data[(r, perm[c])]);
        Ok(Preshapes { data })
    }
}
