//! Fallible buffer allocation.
//!
//! Scratch buffers are sized by the caller's data, so their allocation is
//! reported as [`ShapeError::ResourceExhaustion`] instead of aborting.

use crate::{
    error::{Result, ShapeError},
    types::{DMatrix, DVector, Scalar},
};

/// Allocates a vector of `len` copies of `value`.
pub fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| ShapeError::resource_exhaustion(len, e.to_string()))?;
    data.resize(len, value);
    Ok(data)
}

/// Allocates a zero vector of length `len`.
pub fn try_zeros_vector<T: Scalar>(len: usize) -> Result<DVector<T>> {
    Ok(DVector::from_vec(try_filled(len, T::zero())?))
}

/// Copies a slice into a freshly allocated vector.
pub fn try_vector_from_slice<T: Scalar>(values: &[T]) -> Result<DVector<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(values.len())
        .map_err(|e| ShapeError::resource_exhaustion(values.len(), e.to_string()))?;
    data.extend_from_slice(values);
    Ok(DVector::from_vec(data))
}

/// Copies a column-major slice into a freshly allocated `rows × cols` matrix.
pub fn try_matrix_from_column_slice<T: Scalar>(
    rows: usize,
    cols: usize,
    values: &[T],
) -> Result<DMatrix<T>> {
    let expected = rows
        .checked_mul(cols)
        .ok_or_else(|| ShapeError::resource_exhaustion(usize::MAX, "matrix size overflows usize"))?;
    if values.len() != expected {
        return Err(ShapeError::dimension_mismatch(
            format!("{expected} elements for a {rows} x {cols} matrix"),
            format!("{} elements", values.len()),
        ));
    }
    let mut data = Vec::new();
    data.try_reserve_exact(expected)
        .map_err(|e| ShapeError::resource_exhaustion(expected, e.to_string()))?;
    data.extend_from_slice(values);
    Ok(DMatrix::from_vec(rows, cols, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_zeros_vector() {
        let v = try_zeros_vector::<f64>(5).unwrap();
        assert_eq!(v.len(), 5);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_huge_allocation_fails_cleanly() {
        let err = try_filled(usize::MAX, 0.0f64).unwrap_err();
        assert!(matches!(err, ShapeError::ResourceExhaustion { .. }));
    }

    #[test]
    fn test_matrix_from_column_slice() {
        let m = try_matrix_from_column_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m[(1, 2)], 6.0);
        assert_eq!(m[(0, 1)], 3.0);

        let err = try_matrix_from_column_slice(2, 3, &[1.0, 2.0]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_vector_from_slice() {
        let v = try_vector_from_slice(&[1.0f32, 2.0]).unwrap();
        assert_eq!(v.as_slice(), &[1.0, 2.0]);
    }
}
