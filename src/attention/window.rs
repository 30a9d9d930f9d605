//! Gaussian filterbank parameterisation.
//!
//! The decoder hidden state is projected to 5 scalars per batch element:
//!
//! ```text
//! (gx_, gy_, log_sigma2, log_delta, log_gamma)
//! gx     = (A+1)/2 · (gx_ + 1)                 grid centre, x
//! gy     = (B+1)/2 · (gy_ + 1)                 grid centre, y
//! delta  = (max(A,B)−1)/(N−1) · exp(log_delta) grid stride
//! sigma2 = exp(log_sigma2)                     filter variance
//! gamma  = exp(log_gamma)                      glimpse intensity
//! ```
//!
//! Filter i is a 1-D Gaussian centred at `g + (i − N/2 − 0.5)·delta`, and
//! each filter row is normalised to sum to 1. The `exp` reparameterisations
//! are unbounded; the epsilon in the row normalisation is the only numeric
//! safeguard, so pathological inputs can still push non-finite values
//! through the step chain.

use ndarray::{Array1, Array2, Array3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::nn::Linear;

/// Denominator stabiliser for filter rows whose weights underflow to zero.
const FILTER_EPSILON: f32 = 1e-8;

/// One step's attention filters, ephemeral.
#[derive(Clone, Debug)]
pub struct Filterbank {
    /// Column filters: `[batch, N, A]`, rows sum to 1.
    pub fx: Array3<f32>,

    /// Row filters: `[batch, N, B]`, rows sum to 1.
    pub fy: Array3<f32>,

    /// Intensity scale: `[batch]`, strictly positive.
    pub gamma: Array1<f32>,
}

impl Filterbank {
    pub fn grid_size(&self) -> usize {
        self.fx.shape()[1]
    }

    pub fn image_width(&self) -> usize {
        self.fx.shape()[2]
    }

    pub fn image_height(&self) -> usize {
        self.fy.shape()[2]
    }
}

/// The attention window: one learned 5-way projection shared by the read
/// and write paths. Pure function of the decoder hidden state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttentionWindow {
    /// Projection from decoder hidden state to the 5 window parameters.
    pub fc: Linear,

    a: usize,
    b: usize,
    n: usize,
}

impl AttentionWindow {
    /// Create with zero projection weights. A zero decoder state then yields
    /// a centred grid with unit variance and gamma = 1.
    pub fn zeros(dec_size: usize, a: usize, b: usize, n: usize) -> Self {
        Self {
            fc: Linear::zeros(dec_size, 5),
            a,
            b,
            n,
        }
    }

    /// Create with Xavier-initialised projection weights.
    pub fn xavier(dec_size: usize, a: usize, b: usize, n: usize, rng: &mut impl Rng) -> Self {
        Self {
            fc: Linear::xavier(dec_size, 5, rng),
            a,
            b,
            n,
        }
    }

    /// Compute the filterbank from a decoder hidden state `[batch, dec_size]`.
    pub fn filters(&self, h_dec: &Array2<f32>) -> Filterbank {
        let params = self.fc.forward(h_dec); // [batch, 5]
        let batch = params.nrows();
        let (a, b, n) = (self.a, self.b, self.n);

        let stride_scale = (a.max(b) - 1) as f32 / (n - 1) as f32;
        let half_n = n as f32 / 2.0;

        let mut fx = Array3::zeros((batch, n, a));
        let mut fy = Array3::zeros((batch, n, b));
        let mut gamma = Array1::zeros(batch);

        for k in 0..batch {
            let gx = (a as f32 + 1.0) / 2.0 * (params[[k, 0]] + 1.0);
            let gy = (b as f32 + 1.0) / 2.0 * (params[[k, 1]] + 1.0);
            let sigma2 = params[[k, 2]].exp();
            let delta = stride_scale * params[[k, 3]].exp();
            gamma[k] = params[[k, 4]].exp();

            for i in 0..n {
                let offset = (i as f32 - half_n - 0.5) * delta;
                fill_gaussian_row(fx.slice_mut(ndarray::s![k, i, ..]), gx + offset, sigma2);
                fill_gaussian_row(fy.slice_mut(ndarray::s![k, i, ..]), gy + offset, sigma2);
            }
        }

        Filterbank { fx, fy, gamma }
    }

    /// Number of learned parameters.
    pub fn param_count(&self) -> usize {
        self.fc.param_count()
    }
}

/// Fill one filter row with `exp(−(pos − mu)² / (2·sigma2))`, normalised so
/// the row sums to 1 (epsilon-stabilised denominator).
fn fill_gaussian_row(mut row: ndarray::ArrayViewMut1<f32>, mu: f32, sigma2: f32) {
    let mut sum = 0.0f32;
    for (pos, w) in row.iter_mut().enumerate() {
        let d = pos as f32 - mu;
        *w = (-d * d / (2.0 * sigma2)).exp();
        sum += *w;
    }
    let denom = sum + FILTER_EPSILON;
    for w in row.iter_mut() {
        *w /= denom;
    }
}
