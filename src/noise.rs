//! Injectable standard-normal noise.
//!
//! The latent sampler and the generation driver are the only stochastic parts
//! of the model. Both draw through this trait so callers can fix a seed for
//! bit-identical runs, or substitute zero noise for mean-field decoding and
//! deterministic tests. Draws are always fresh — never cached.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of standard-normal noise matrices.
pub trait NoiseSource {
    /// Draw a fresh `[rows, cols]` matrix of N(0, 1) samples.
    fn standard_normal(&mut self, rows: usize, cols: usize) -> Array2<f32>;
}

/// Seeded Gaussian noise backed by `StdRng`.
pub struct GaussianNoise {
    rng: StdRng,
}

impl GaussianNoise {
    /// Create from an explicit seed (reproducible).
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create from OS entropy (non-reproducible).
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl NoiseSource for GaussianNoise {
    fn standard_normal(&mut self, rows: usize, cols: usize) -> Array2<f32> {
        let rng = &mut self.rng;
        Array2::from_shape_simple_fn((rows, cols), || rng.sample::<f32, _>(StandardNormal))
    }
}

/// Always-zero noise. With this source the sampler returns the posterior
/// mean (`z = mu`) and generation decodes the prior mean.
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn standard_normal(&mut self, rows: usize, cols: usize) -> Array2<f32> {
        Array2::zeros((rows, cols))
    }
}
