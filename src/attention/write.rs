//! Inverse attention transform onto the canvas.
//!
//! The decoder hidden state is projected to an N×N patch `w`, which the
//! transposed filterbank spreads back over the full image:
//! `Fyᵀ · w · Fx`, divided by gamma. The result is an additive canvas
//! contribution, not the canvas itself.

use ndarray::{s, Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ExecutionTarget;
use crate::nn::Linear;

use super::window::Filterbank;

/// Projects decoder state to a patch and writes it through the inverse
/// attention transform.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanvasWriter {
    /// Patch projection: `dec_size -> N·N`.
    pub fc: Linear,
}

impl CanvasWriter {
    /// Create with zero patch projection.
    pub fn zeros(dec_size: usize, n: usize) -> Self {
        Self {
            fc: Linear::zeros(dec_size, n * n),
        }
    }

    /// Create with Xavier-initialised patch projection.
    pub fn xavier(dec_size: usize, n: usize, rng: &mut impl rand::Rng) -> Self {
        Self {
            fc: Linear::xavier(dec_size, n * n, rng),
        }
    }

    /// Compute the canvas contribution `[batch, B·A]` for the current
    /// decoder hidden state. The filters must come from the same state —
    /// the write path never reuses the read path's filters.
    pub fn write(
        &self,
        h_dec: &Array2<f32>,
        filters: &Filterbank,
        target: ExecutionTarget,
    ) -> Array2<f32> {
        let patches = self.fc.forward(h_dec); // [batch, N·N]
        let batch = patches.nrows();
        let n = filters.grid_size();
        let (a, b) = (filters.image_width(), filters.image_height());

        let row = |k: usize| -> Array1<f32> {
            let fx = filters.fx.slice(s![k, .., ..]);
            let fy = filters.fy.slice(s![k, .., ..]);
            let patch = patches
                .row(k)
                .to_owned()
                .into_shape_with_order((n, n))
                .expect("patch projection output is N·N");
            let spread = fy.t().dot(&patch).dot(&fx); // [B, A]
            let mut flat = spread
                .into_shape_with_order(b * a)
                .expect("spread patch is contiguous");
            flat /= filters.gamma[k];
            flat
        };

        let rows: Vec<Array1<f32>> = match target {
            ExecutionTarget::Cpu => (0..batch).map(row).collect(),
            ExecutionTarget::CpuParallel => (0..batch).into_par_iter().map(row).collect(),
        };

        let mut out = Array2::zeros((batch, b * a));
        for (k, r) in rows.iter().enumerate() {
            out.row_mut(k).assign(r);
        }
        out
    }

    /// Number of learned parameters.
    pub fn param_count(&self) -> usize {
        self.fc.param_count()
    }
}
