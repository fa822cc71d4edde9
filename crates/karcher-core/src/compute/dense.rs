//! Dense BLAS-1/2 style primitives.
//!
//! Thin, dimension-checked wrappers over nalgebra's kernels. They mirror the
//! classic `dgemv`/`ddot`/`daxpy`/`dscal`/`dnrm2` routines so that the tangent
//! map can be written exactly as a sequence of level-1/2 calls.

use crate::{
    error::{Result, ShapeError},
    numerical::stability::stable_norm,
    types::{DVector, Scalar},
    utils::parallel_thresholds::ParallelThresholds,
};
use nalgebra::{Dyn, Matrix, Storage};

/// Namespace for dense linear algebra primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseLinearAlgebra;

impl DenseLinearAlgebra {
    /// y ← Aᵀ x.
    pub fn gemv_t<T: Scalar, S: Storage<T, Dyn, Dyn>>(
        a: &Matrix<T, Dyn, Dyn, S>,
        x: &DVector<T>,
        y: &mut DVector<T>,
    ) -> Result<()> {
        check_len("x", a.nrows(), x.len())?;
        check_len("y", a.ncols(), y.len())?;
        y.gemv_tr(T::one(), a, x, T::zero());
        Ok(())
    }

    /// y ← y + A x.
    pub fn gemv<T: Scalar, S: Storage<T, Dyn, Dyn>>(
        a: &Matrix<T, Dyn, Dyn, S>,
        x: &DVector<T>,
        y: &mut DVector<T>,
    ) -> Result<()> {
        check_len("x", a.ncols(), x.len())?;
        check_len("y", a.nrows(), y.len())?;
        y.gemv(T::one(), a, x, T::one());
        Ok(())
    }

    /// Computes `proj ← Aᵀ q` and `acc ← acc + A w` in one call.
    ///
    /// The two products share no output, so above the matrix-vector
    /// threshold they are evaluated concurrently with `rayon::join`. `A` may
    /// be owned or a view over a caller buffer.
    pub fn gemv_pair<T: Scalar, S: Storage<T, Dyn, Dyn> + Sync>(
        a: &Matrix<T, Dyn, Dyn, S>,
        q: &DVector<T>,
        proj: &mut DVector<T>,
        w: &DVector<T>,
        acc: &mut DVector<T>,
        thresholds: &ParallelThresholds,
    ) -> Result<()> {
        check_len("q", a.nrows(), q.len())?;
        check_len("proj", a.ncols(), proj.len())?;
        check_len("w", a.ncols(), w.len())?;
        check_len("acc", a.nrows(), acc.len())?;

        if cfg!(feature = "parallel") && thresholds.should_parallelize_gemv(a.nrows(), a.ncols()) {
            tracing::trace!(rows = a.nrows(), cols = a.ncols(), "parallel gemv pair");
            rayon::join(
                || proj.gemv_tr(T::one(), a, q, T::zero()),
                || acc.gemv(T::one(), a, w, T::one()),
            );
        } else {
            proj.gemv_tr(T::one(), a, q, T::zero());
            acc.gemv(T::one(), a, w, T::one());
        }
        Ok(())
    }

    /// x · y.
    pub fn dot<T: Scalar>(x: &DVector<T>, y: &DVector<T>) -> Result<T> {
        check_len("y", x.len(), y.len())?;
        Ok(x.dot(y))
    }

    /// y ← a·x + y.
    pub fn axpy<T: Scalar>(a: T, x: &DVector<T>, y: &mut DVector<T>) -> Result<()> {
        check_len("y", x.len(), y.len())?;
        y.axpy(a, x, T::one());
        Ok(())
    }

    /// x ← a·x.
    pub fn scal<T: Scalar>(a: T, x: &mut DVector<T>) {
        x.scale_mut(a);
    }

    /// Euclidean norm, scaled to avoid overflow and underflow.
    pub fn nrm2<T: Scalar>(x: &DVector<T>) -> T {
        stable_norm(x)
    }

    /// Sets every component of `x` to `value`.
    pub fn fill<T: Scalar>(x: &mut DVector<T>, value: T) {
        x.fill(value);
    }

    /// y ← x.
    pub fn copy<T: Scalar>(x: &DVector<T>, y: &mut DVector<T>) -> Result<()> {
        check_len("y", x.len(), y.len())?;
        y.copy_from(x);
        Ok(())
    }
}

fn check_len(name: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ShapeError::dimension_mismatch(
            format!("{name} of length {expected}"),
            format!("length {actual}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DMatrix;
    use approx::assert_relative_eq;

    fn sample_matrix() -> DMatrix<f64> {
        // 3 x 2, column-major: columns (1, 2, 3) and (4, 5, 6)
        DMatrix::from_column_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
    }

    #[test]
    fn test_gemv_t() {
        let a = sample_matrix();
        let x = DVector::from_vec(vec![1.0, 0.0, -1.0]);
        let mut y = DVector::from_vec(vec![9.0, 9.0]);
        DenseLinearAlgebra::gemv_t(&a, &x, &mut y).unwrap();
        assert_relative_eq!(y[0], -2.0);
        assert_relative_eq!(y[1], -2.0);
    }

    #[test]
    fn test_gemv_accumulates() {
        let a = sample_matrix();
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let mut y = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        DenseLinearAlgebra::gemv(&a, &x, &mut y).unwrap();
        assert_relative_eq!(y[0], 10.0);
        assert_relative_eq!(y[1], 13.0);
        assert_relative_eq!(y[2], 16.0);
    }

    #[test]
    fn test_gemv_pair_matches_sequential() {
        let a = DMatrix::from_fn(40, 7, |i, j| ((i * 7 + j) as f64).sin());
        let q = DVector::from_fn(40, |i, _| (i as f64 * 0.3).cos());
        let w = DVector::from_fn(7, |j, _| 1.0 + j as f64);

        let mut proj_seq = DVector::zeros(7);
        let mut acc_seq = DVector::zeros(40);
        DenseLinearAlgebra::gemv_t(&a, &q, &mut proj_seq).unwrap();
        DenseLinearAlgebra::gemv(&a, &w, &mut acc_seq).unwrap();

        let eager = ParallelThresholds::always();
        let mut proj_par = DVector::zeros(7);
        let mut acc_par = DVector::zeros(40);
        DenseLinearAlgebra::gemv_pair(&a, &q, &mut proj_par, &w, &mut acc_par, &eager).unwrap();

        assert_relative_eq!(proj_seq, proj_par, epsilon = 1e-14);
        assert_relative_eq!(acc_seq, acc_par, epsilon = 1e-14);
    }

    #[test]
    fn test_gemv_on_view() {
        let values = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = nalgebra::DMatrixView::from_slice(&values, 3, 2);
        let x = DVector::from_vec(vec![1.0, 0.0, -1.0]);
        let mut from_view = DVector::zeros(2);
        let mut from_owned = DVector::zeros(2);
        DenseLinearAlgebra::gemv_t(&view, &x, &mut from_view).unwrap();
        DenseLinearAlgebra::gemv_t(&sample_matrix(), &x, &mut from_owned).unwrap();
        assert_eq!(from_view, from_owned);
    }

    #[test]
    fn test_level1_primitives() {
        let x = DVector::from_vec(vec![3.0, 4.0]);
        let mut y = DVector::from_vec(vec![1.0, 1.0]);

        assert_relative_eq!(DenseLinearAlgebra::dot(&x, &y).unwrap(), 7.0);
        assert_relative_eq!(DenseLinearAlgebra::nrm2(&x), 5.0);

        DenseLinearAlgebra::axpy(-1.0, &x, &mut y).unwrap();
        assert_relative_eq!(y[0], -2.0);
        assert_relative_eq!(y[1], -3.0);

        DenseLinearAlgebra::scal(0.5, &mut y);
        assert_relative_eq!(y[1], -1.5);

        DenseLinearAlgebra::fill(&mut y, 0.0);
        assert_eq!(y.iter().filter(|v| **v != 0.0).count(), 0);
    }

    #[test]
    fn test_dimension_checks() {
        let a = sample_matrix();
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let mut y = DVector::zeros(2);
        let err = DenseLinearAlgebra::gemv_t(&a, &x, &mut y).unwrap_err();
        assert!(err.is_invalid_argument());

        let mut short = DVector::zeros(1);
        assert!(DenseLinearAlgebra::axpy(1.0, &x, &mut short).is_err());
        assert!(DenseLinearAlgebra::dot(&x, &short).is_err());
    }
}
