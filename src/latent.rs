//! Stochastic latent sampler (the reparameterization trick).
//!
//! Two independent projections of the encoder hidden state give `mu` and
//! `log_sigma`; a fresh standard-normal draw `e` turns them into
//! `z = mu + e ⊙ sigma`. This is the only stochastic component of the
//! forward path, and every draw goes through the injectable noise source.

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::nn::Linear;
use crate::noise::NoiseSource;

/// One step's latent draw and its distribution parameters. `sigma` is
/// always `exp(log_sigma)` — derived, never set independently.
#[derive(Clone, Debug)]
pub struct LatentSample {
    /// Sampled latent: `[batch, z_size]`
    pub z: Array2<f32>,

    /// Posterior mean: `[batch, z_size]`
    pub mu: Array2<f32>,

    /// Posterior log standard deviation: `[batch, z_size]`
    pub log_sigma: Array2<f32>,

    /// Posterior standard deviation: `exp(log_sigma)`.
    pub sigma: Array2<f32>,
}

/// Projects encoder hidden state to the posterior parameters and samples.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LatentSampler {
    /// Mean projection: `enc_size -> z_size`.
    pub fc_mu: Linear,

    /// Log-std projection: `enc_size -> z_size`.
    pub fc_sigma: Linear,
}

impl LatentSampler {
    /// Create with zero projections (posterior is N(0, 1) regardless of
    /// the encoder state).
    pub fn zeros(enc_size: usize, z_size: usize) -> Self {
        Self {
            fc_mu: Linear::zeros(enc_size, z_size),
            fc_sigma: Linear::zeros(enc_size, z_size),
        }
    }

    /// Create with Xavier-initialised projections.
    pub fn xavier(enc_size: usize, z_size: usize, rng: &mut impl Rng) -> Self {
        Self {
            fc_mu: Linear::xavier(enc_size, z_size, rng),
            fc_sigma: Linear::xavier(enc_size, z_size, rng),
        }
    }

    /// Draw `z = mu + e ⊙ exp(log_sigma)` with fresh noise `e`.
    pub fn sample(&self, h_enc: &Array2<f32>, noise: &mut dyn NoiseSource) -> LatentSample {
        let mu = self.fc_mu.forward(h_enc);
        let log_sigma = self.fc_sigma.forward(h_enc);
        let sigma = log_sigma.mapv(f32::exp);
        let e = noise.standard_normal(mu.nrows(), mu.ncols());
        let z = &mu + &(&e * &sigma);
        LatentSample {
            z,
            mu,
            log_sigma,
            sigma,
        }
    }

    /// Number of learned parameters.
    pub fn param_count(&self) -> usize {
        self.fc_mu.param_count() + self.fc_sigma.param_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{GaussianNoise, ZeroNoise};
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sigma_is_exp_log_sigma() {
        let mut rng = StdRng::seed_from_u64(42);
        let sampler = LatentSampler::xavier(8, 4, &mut rng);
        let h = Array2::from_elem((3, 8), 0.5);
        let s = sampler.sample(&h, &mut GaussianNoise::seeded(1));
        for (ls, sg) in s.log_sigma.iter().zip(s.sigma.iter()) {
            assert_abs_diff_eq!(ls.exp(), *sg, epsilon = 0.0);
        }
    }

    #[test]
    fn test_zero_noise_returns_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        let sampler = LatentSampler::xavier(8, 4, &mut rng);
        let h = Array2::from_elem((2, 8), -0.3);
        let s = sampler.sample(&h, &mut ZeroNoise);
        assert_eq!(s.z, s.mu);
    }

    #[test]
    fn test_seeded_draws_reproduce() {
        let mut rng = StdRng::seed_from_u64(9);
        let sampler = LatentSampler::xavier(8, 4, &mut rng);
        let h = Array2::from_elem((2, 8), 0.1);
        let a = sampler.sample(&h, &mut GaussianNoise::seeded(99));
        let b = sampler.sample(&h, &mut GaussianNoise::seeded(99));
        assert_eq!(a.z, b.z);
    }

    #[test]
    fn test_zero_sampler_is_standard_normal() {
        // Zero projections: mu = 0, log_sigma = 0, sigma = 1, so z = e.
        let sampler = LatentSampler::zeros(8, 4);
        let h = Array2::from_elem((2, 8), 5.0);
        let mut noise = GaussianNoise::seeded(3);
        let e = GaussianNoise::seeded(3).standard_normal(2, 4);
        let s = sampler.sample(&h, &mut noise);
        assert!(s.mu.iter().all(|&v| v == 0.0));
        assert!(s.sigma.iter().all(|&v| v == 1.0));
        assert_eq!(s.z, e);
    }
}
