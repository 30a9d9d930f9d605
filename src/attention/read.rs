//! Attended glimpse extraction.
//!
//! For each batch element the image is reshaped to `[B, A]` and filtered
//! with `Fy · img · Fxᵀ`, giving an N×N glimpse scaled by gamma. The input
//! image and the error image are filtered independently and concatenated,
//! so the encoder observes `[batch, 2·N·N]` per step.

use ndarray::{s, Array1, Array2};
use rayon::prelude::*;

use crate::config::ExecutionTarget;

use super::window::Filterbank;

/// Extract glimpses of `x` and `x_hat` under the given filterbank.
///
/// Both inputs are `[batch, B·A]`; output is `[batch, 2·N·N]` with the `x`
/// glimpse first. Panics only if the inputs were not validated against the
/// model configuration (the step driver checks shapes before the loop).
pub fn read_glimpse(
    x: &Array2<f32>,
    x_hat: &Array2<f32>,
    filters: &Filterbank,
    target: ExecutionTarget,
) -> Array2<f32> {
    let batch = x.nrows();
    let n = filters.grid_size();
    let glimpse_dim = n * n;

    let row = |k: usize| -> Array1<f32> {
        let fx = filters.fx.slice(s![k, .., ..]);
        let fy = filters.fy.slice(s![k, .., ..]);
        let gamma = filters.gamma[k];

        let mut out = Array1::zeros(2 * glimpse_dim);
        let gx = filter_image(x.row(k).to_owned(), fx, fy, gamma);
        let gh = filter_image(x_hat.row(k).to_owned(), fx, fy, gamma);
        out.slice_mut(s![..glimpse_dim]).assign(&gx);
        out.slice_mut(s![glimpse_dim..]).assign(&gh);
        out
    };

    let rows: Vec<Array1<f32>> = match target {
        ExecutionTarget::Cpu => (0..batch).map(row).collect(),
        ExecutionTarget::CpuParallel => (0..batch).into_par_iter().map(row).collect(),
    };

    let mut out = Array2::zeros((batch, 2 * glimpse_dim));
    for (k, r) in rows.iter().enumerate() {
        out.row_mut(k).assign(r);
    }
    out
}

/// `Fy · reshape(img, B, A) · Fxᵀ`, flattened and gamma-scaled.
fn filter_image(
    img_flat: Array1<f32>,
    fx: ndarray::ArrayView2<f32>,
    fy: ndarray::ArrayView2<f32>,
    gamma: f32,
) -> Array1<f32> {
    let (n, a) = (fx.nrows(), fx.ncols());
    let b = fy.ncols();
    let img = img_flat
        .into_shape_with_order((b, a))
        .expect("image shape validated by the step driver");
    let glimpse = fy.dot(&img).dot(&fx.t()); // [N, N]
    let mut flat = glimpse
        .into_shape_with_order(n * n)
        .expect("glimpse is contiguous");
    flat *= gamma;
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attention::window::AttentionWindow;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn uniform(rows: usize, cols: usize, seed: u64) -> Array2<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_simple_fn((rows, cols), || rng.gen_range(0.0..1.0f32))
    }

    #[test]
    fn test_glimpse_shape() {
        let window = AttentionWindow::zeros(4, 8, 6, 3);
        let h = Array2::zeros((2, 4));
        let filters = window.filters(&h);
        let x = uniform(2, 48, 1);
        let x_hat = uniform(2, 48, 2);
        let g = read_glimpse(&x, &x_hat, &filters, ExecutionTarget::Cpu);
        assert_eq!(g.shape(), &[2, 2 * 9]);
    }

    #[test]
    fn test_constant_image_glimpse() {
        // Filter rows sum to 1, so a constant image yields a constant
        // glimpse equal to the pixel value (gamma = 1 with zero weights).
        let window = AttentionWindow::zeros(4, 8, 8, 4);
        let filters = window.filters(&Array2::zeros((1, 4)));
        let x = Array2::from_elem((1, 64), 0.7);
        let zero = Array2::zeros((1, 64));
        let g = read_glimpse(&x, &zero, &filters, ExecutionTarget::Cpu);
        for i in 0..16 {
            assert_abs_diff_eq!(g[[0, i]], 0.7, epsilon = 1e-4);
        }
        for i in 16..32 {
            assert_abs_diff_eq!(g[[0, i]], 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(3);
        let window = AttentionWindow::xavier(6, 10, 10, 4, &mut rng);
        let h = Array2::from_shape_simple_fn((5, 6), || rng.gen_range(-1.0..1.0f32));
        let filters = window.filters(&h);
        let x = uniform(5, 100, 4);
        let x_hat = uniform(5, 100, 5);
        let seq = read_glimpse(&x, &x_hat, &filters, ExecutionTarget::Cpu);
        let par = read_glimpse(&x, &x_hat, &filters, ExecutionTarget::CpuParallel);
        assert_eq!(seq, par);
    }
}
