//! Integration tests for the preshape tangent maps.

use approx::assert_relative_eq;
use karcher_core::utils::ParallelThresholds;
use karcher_shapes::{PreshapeSpace, Preshapes, ShapeDims};
use nalgebra::{DMatrix, DVector};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_sample(space: &PreshapeSpace, n_samples: usize, rng: &mut StdRng) -> Preshapes<f64> {
    let columns: Vec<DVector<f64>> = (0..n_samples).map(|_| space.random_point(rng)).collect();
    Preshapes::from_columns(&columns).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_batched_log_matches_per_sample_sum(
        seed in any::<u64>(),
        dim in 1usize..20,
        n_samples in 1usize..12,
    ) {
        let space = PreshapeSpace::new(dim).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = random_sample(&space, n_samples, &mut rng);
        let base: DVector<f64> = space.random_point(&mut rng);
        let weights = DVector::from_fn(n_samples, |_, _| rng.gen_range(0.0..2.0));

        let batched = space.weighted_log(&samples, &base, &weights).unwrap();
        let mut looped = DVector::zeros(dim);
        for i in 0..n_samples {
            looped += space.log_single(&samples.column(i), &base).unwrap() * weights[i];
        }
        prop_assert!((&batched - &looped).norm() < 1e-12 * (1.0 + looped.norm()));
    }

    #[test]
    fn prop_weighted_log_is_tangent(
        seed in any::<u64>(),
        dim in 2usize..20,
        n_samples in 1usize..12,
    ) {
        let space = PreshapeSpace::new(dim).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = random_sample(&space, n_samples, &mut rng);
        let base: DVector<f64> = space.random_point(&mut rng);
        let weights = DVector::from_element(n_samples, 1.0);

        let alpha = space.weighted_log(&samples, &base, &weights).unwrap();
        prop_assert!(alpha.dot(&base).abs() < 1e-12 * n_samples as f64);
    }

    #[test]
    fn prop_exp_of_short_tangent_is_on_sphere(
        seed in any::<u64>(),
        dim in 2usize..30,
        length in 0.0f64..1.0,
    ) {
        let space = PreshapeSpace::new(dim).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let base: DVector<f64> = space.random_point(&mut rng);
        let tangent = space.random_tangent(&base, length, &mut rng).unwrap();

        let q = space.exp(&tangent, &base).unwrap();
        prop_assert!(space.is_point_on_manifold(&q, 1e-12));
    }
}

#[test]
fn test_parallel_and_sequential_gemv_agree() {
    let dim = 300;
    let n_samples = 250;
    let sequential = PreshapeSpace::new(dim).unwrap().with_thresholds(ParallelThresholds::never());
    let parallel = PreshapeSpace::new(dim).unwrap().with_thresholds(ParallelThresholds::always());

    let mut rng = StdRng::seed_from_u64(42);
    let samples = random_sample(&sequential, n_samples, &mut rng);
    let base: DVector<f64> = sequential.random_point(&mut rng);
    let weights = DVector::from_fn(n_samples, |_, _| rng.gen_range(0.0..1.0));

    let a = sequential.weighted_log(&samples, &base, &weights).unwrap();
    let b = parallel.weighted_log(&samples, &base, &weights).unwrap();
    assert_relative_eq!(a, b, epsilon = 1e-12);
}

#[test]
fn test_tensor_layout_round_trip() {
    // 3 landmarks in 2D: preshapes are 2 × 2, flattened column by column
    let dims = ShapeDims::new(3, 2).unwrap();
    let first = DMatrix::from_row_slice(2, 2, &[0.5, 0.5, -0.5, 0.5]);
    let second = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 0.0]);

    let mut tensor = Vec::new();
    tensor.extend_from_slice(first.as_slice());
    tensor.extend_from_slice(second.as_slice());

    let samples = Preshapes::from_tensor(dims, 2, &tensor).unwrap();
    assert_eq!(samples.dim(), 4);
    assert_eq!(samples.n_samples(), 2);
    assert_eq!(dims.reshape(&samples.column(0)).unwrap(), first);
    assert_eq!(dims.flatten(&second).unwrap(), samples.column(1));
}

#[test]
fn test_mismatched_base_is_rejected() {
    let space = PreshapeSpace::new(3).unwrap();
    let samples = Preshapes::from_column_major(3, 1, &[1.0, 0.0, 0.0]).unwrap();
    let base = DVector::from_vec(vec![1.0, 0.0]);
    let weights = DVector::from_vec(vec![1.0]);
    assert!(space.weighted_log(&samples, &base, &weights).is_err());

    let wrong_space = PreshapeSpace::new(2).unwrap();
    let err = wrong_space
        .weighted_log(&samples, &base, &weights)
        .unwrap_err();
    assert!(err.is_invalid_argument());
}
