//! End-to-end benchmarks of the Karcher mean iteration
//!
//! Run with: cargo bench -p karcher-solver

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use karcher_shapes::{PreshapeSpace, Preshapes};
use karcher_solver::{ShapeMeanSolver, SolverConfig};
use nalgebra::DVector;
use rand::{rngs::StdRng, SeedableRng};

fn bench_fixed_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("karcher_mean");
    group.sample_size(20);
    let mut rng = StdRng::seed_from_u64(21);

    // k landmarks in 2D -> n = 2(k-1)
    for &(landmarks, n_samples) in &[(10, 50), (68, 200), (200, 500)] {
        let dim = 2 * (landmarks - 1);
        let space = PreshapeSpace::new(dim).unwrap();
        let center: DVector<f64> = space.random_point(&mut rng);
        let columns: Vec<DVector<f64>> = (0..n_samples)
            .map(|_| {
                let v = space.random_tangent(&center, 0.2, &mut rng).unwrap();
                space.exp(&v, &center).unwrap()
            })
            .collect();
        let samples = Preshapes::from_columns(&columns).unwrap();
        let weights = DVector::from_element(n_samples, 1.0);
        let label = format!("k{landmarks}_n{n_samples}");

        group.bench_with_input(BenchmarkId::new("20_steps", &label), &label, |b, _| {
            let config = SolverConfig::new().with_tolerance(0.0).with_max_iterations(20);
            b.iter(|| {
                let mut solver = ShapeMeanSolver::new(config.clone());
                solver
                    .solve(black_box(&samples), black_box(&center), &weights)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fixed_iterations);
criterion_main!(benches);
