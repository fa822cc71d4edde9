//! Mean shape of a few noisy triangles.
//!
//! This example shows how to:
//! - Turn raw landmark configurations into preshapes (Helmert + scale)
//! - Lay them out as the column-major tensor expected by `compute_shape`
//! - Run the iteration with convergence output and inspect the result

use karcher::prelude::*;
use nalgebra::DMatrix;

/// Removes location with the Helmert submatrix, then scale.
fn preshape(landmarks: &DMatrix<f64>) -> DMatrix<f64> {
    let k = landmarks.nrows();
    let helmert = DMatrix::from_fn(k - 1, k, |i, j| {
        let j_row = (i + 1) as f64;
        let h = -1.0 / (j_row * (j_row + 1.0)).sqrt();
        if j <= i {
            h
        } else if j == i + 1 {
            -h * j_row
        } else {
            0.0
        }
    });
    let centered = helmert * landmarks;
    let norm = centered.norm();
    centered / norm
}

fn main() -> Result<()> {
    let dims = ShapeDims::new(3, 2)?;

    let triangles = [
        [0.0, 0.0, 1.0, 0.0, 0.5, 0.9],
        [0.1, 0.0, 1.1, 0.1, 0.6, 0.8],
        [0.0, 0.1, 0.9, 0.0, 0.4, 1.0],
        [0.0, 0.0, 1.0, 0.1, 0.5, 0.85],
    ];

    let mut tensor = Vec::new();
    for t in &triangles {
        let x = DMatrix::from_row_slice(3, 2, t);
        tensor.extend_from_slice(preshape(&x).as_slice());
    }
    let n_actual = triangles.len();
    let q0: Vec<f64> = tensor[..dims.vector_len()].to_vec();
    let weights = vec![1.0; n_actual];

    println!("Karcher mean of {} triangles", n_actual);
    let config = SolverConfig::new()
        .with_max_iterations(50)
        .with_tolerance(1e-3)
        .with_verbose(true);
    let result = compute_shape_with(config, n_actual as i32, &tensor, &q0, &weights)?;

    println!("\nStopped after {} iterations ({:?})", result.iterations, result.termination_reason);
    println!("Mean preshape (k-1 x m):{}", result.configuration(dims)?);
    println!("Norm: {:.12}", result.mean.norm());

    Ok(())
}
