//! Preshape space: the unit sphere of flattened, centered configurations.
//!
//! Preshapes of k landmarks in m dimensions form the unit sphere
//! S^{n-1} ⊂ R^n, n = (k-1)·m. The Karcher mean iteration only needs two
//! maps on this sphere, both first-order approximations of the geodesic ones:
//!
//! - **Log-like map**: log_q(p) = p − (p·q) q, the projection of the sample
//!   onto the tangent space at q.
//! - **Exp-like map**: exp_q(α) = sqrt(1 − ‖α‖²) q + α, which lands exactly on
//!   the sphere when α ⊥ q and ‖α‖ ≤ 1.
//!
//! Because the log-like map is linear in `p`, the weighted sum over all
//! samples collapses to two matrix-vector products:
//!
//! ```text
//! Σ_i w_i (p_i − (p_i·q) q) = P w − ((Pᵀ q)·w) q
//! ```

use crate::preshapes::Preshapes;
use karcher_core::{
    compute::DenseLinearAlgebra,
    error::{Result, ShapeError},
    memory::try_zeros_vector,
    numerical::stability::{guarded_sqrt, GuardedSqrt},
    types::{DVector, Scalar},
    utils::parallel_thresholds::{global_thresholds, ParallelThresholds},
};
use nalgebra::{Dyn, Storage};
use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// The preshape sphere S^{n-1} in R^n.
#[derive(Debug, Clone)]
pub struct PreshapeSpace {
    /// Ambient dimension (n)
    dim: usize,
    /// Dispatch thresholds for the gemv pair
    thresholds: ParallelThresholds,
}

impl PreshapeSpace {
    /// Creates the preshape sphere embedded in R^dim.
    ///
    /// # Errors
    /// Returns an error if `dim` == 0.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(ShapeError::invalid_argument(
                "dim",
                "preshape length must be positive",
            ));
        }
        Ok(Self {
            dim,
            thresholds: global_thresholds().clone(),
        })
    }

    /// Overrides the parallel dispatch thresholds.
    pub fn with_thresholds(mut self, thresholds: ParallelThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Returns the ambient dimension (n).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Weighted sum of the log-like images of every sample at `base`.
    ///
    /// Allocates the result and the per-sample projection scratch; see
    /// [`weighted_log_into`](Self::weighted_log_into) for the buffered form.
    pub fn weighted_log<T: Scalar, S: Storage<T, Dyn, Dyn> + Sync>(
        &self,
        preshapes: &Preshapes<T, S>,
        base: &DVector<T>,
        weights: &DVector<T>,
    ) -> Result<DVector<T>> {
        let mut proj = try_zeros_vector(preshapes.n_samples())?;
        let mut result = try_zeros_vector(self.dim)?;
        self.weighted_log_into(preshapes, base, weights, &mut proj, &mut result)?;
        Ok(result)
    }

    /// Accumulates `P w − ((Pᵀ base)·w) base` into `result`.
    ///
    /// `result` is not cleared first; `proj` receives `Pᵀ base`.
    pub fn weighted_log_into<T: Scalar, S: Storage<T, Dyn, Dyn> + Sync>(
        &self,
        preshapes: &Preshapes<T, S>,
        base: &DVector<T>,
        weights: &DVector<T>,
        proj: &mut DVector<T>,
        result: &mut DVector<T>,
    ) -> Result<()> {
        self.check_dim(preshapes.dim(), "preshapes")?;
        let p = preshapes.as_matrix();

        DenseLinearAlgebra::gemv_pair(p, base, proj, weights, result, &self.thresholds)?;
        let c = DenseLinearAlgebra::dot(proj, weights)?;
        DenseLinearAlgebra::axpy(-c, base, result)
    }

    /// Log-like image of a single sample at `base`: p − (p·base) base.
    pub fn log_single<T: Scalar>(&self, sample: &DVector<T>, base: &DVector<T>) -> Result<DVector<T>> {
        self.check_dim(sample.len(), "sample")?;
        self.check_dim(base.len(), "base")?;
        let c = DenseLinearAlgebra::dot(sample, base)?;
        let mut out = sample.clone();
        DenseLinearAlgebra::axpy(-c, base, &mut out)?;
        Ok(out)
    }

    /// Exp-like retraction of `tangent` from `base`.
    pub fn exp<T: Scalar>(&self, tangent: &DVector<T>, base: &DVector<T>) -> Result<DVector<T>> {
        let mut result = try_zeros_vector(self.dim)?;
        self.exp_into(tangent, base, &mut result)?;
        Ok(result)
    }

    /// Writes `sqrt(1 − ‖tangent‖²) base + tangent` into `result`.
    ///
    /// # Errors
    /// Returns [`ShapeError::NumericalInstability`] if ‖tangent‖² exceeds one
    /// by more than round-off, or is not finite.
    pub fn exp_into<T: Scalar>(
        &self,
        tangent: &DVector<T>,
        base: &DVector<T>,
        result: &mut DVector<T>,
    ) -> Result<()> {
        self.check_dim(tangent.len(), "tangent")?;
        self.check_dim(base.len(), "base")?;
        self.check_dim(result.len(), "result")?;

        let dotp = DenseLinearAlgebra::dot(tangent, tangent)?;
        let factor = match guarded_sqrt(T::one() - dotp) {
            GuardedSqrt::Value(f) => f,
            GuardedSqrt::Negative(_) => {
                return Err(ShapeError::numerical_instability(
                    0,
                    format!(
                        "squared tangent norm {:e} exceeds one, exp-like map is undefined",
                        dotp
                    ),
                ));
            }
        };

        // One fused pass instead of copy + axpy
        for ((r, &b), &a) in result.iter_mut().zip(base.iter()).zip(tangent.iter()) {
            *r = factor * b + a;
        }
        Ok(())
    }

    /// Checks ‖point‖² = 1 within `tolerance`.
    pub fn is_point_on_manifold<T: Scalar>(&self, point: &DVector<T>, tolerance: T) -> bool {
        point.len() == self.dim && <T as Float>::abs(point.norm_squared() - T::one()) < tolerance
    }

    /// Normalises `point` onto the sphere.
    pub fn project_point<T: Scalar>(&self, point: &DVector<T>) -> Result<DVector<T>> {
        self.check_dim(point.len(), "point")?;
        let norm = DenseLinearAlgebra::nrm2(point);
        if norm <= T::EPSILON || !Float::is_finite(norm) {
            return Err(ShapeError::numerical_instability(
                0,
                "cannot normalise a zero or non-finite vector",
            ));
        }
        Ok(point / norm)
    }

    /// Draws a uniformly distributed point on the sphere.
    pub fn random_point<T: Scalar, R: Rng + ?Sized>(&self, rng: &mut R) -> DVector<T> {
        loop {
            let v = DVector::<T>::from_fn(self.dim, |_, _| {
                let x: f64 = StandardNormal.sample(rng);
                <T as Scalar>::from_f64(x)
            });
            if let Ok(p) = self.project_point(&v) {
                return p;
            }
        }
    }

    /// Draws a random tangent vector at `point` with norm `length`.
    pub fn random_tangent<T: Scalar, R: Rng + ?Sized>(
        &self,
        point: &DVector<T>,
        length: T,
        rng: &mut R,
    ) -> Result<DVector<T>> {
        let v = self.random_point::<T, R>(rng);
        let t = self.log_single(&v, point)?;
        let norm = DenseLinearAlgebra::nrm2(&t);
        if norm <= T::EPSILON {
            return Err(ShapeError::numerical_instability(
                0,
                "random direction collapsed onto the base point",
            ));
        }
        Ok(t * (length / norm))
    }

    fn check_dim(&self, actual: usize, name: &str) -> Result<()> {
        if actual != self.dim {
            return Err(ShapeError::dimension_mismatch(
                format!("{name} of length {}", self.dim),
                format!("length {actual}"),
            ));
        }
        Ok(())
    }
}
