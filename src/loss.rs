//! Negative-ELBO surrogate: reconstruction + per-step KL.
//!
//! The constants matter for the absolute loss magnitude used in logging and
//! comparison, so they are preserved exactly: the reconstruction term is the
//! per-element BCE mean scaled back up by A·B (summed over pixels, averaged
//! over the batch), and each step's KL carries a `−0.5·T` offset. The offset
//! can make per-step contributions negative; the total is finite, not
//! necessarily non-negative.

use ndarray::{Array1, Array2, Axis};

use crate::latent::LatentSample;

/// Matches the reference BCE implementation, which clamps each log term at
/// −100 so saturated reconstructions keep the loss finite.
const LOG_CLAMP: f32 = -100.0;

/// Elementwise binary cross-entropy, averaged over every element.
///
/// `recon` must already be passed through the sigmoid (values in (0, 1));
/// `x` holds targets in [0, 1].
pub fn binary_cross_entropy(recon: &Array2<f32>, x: &Array2<f32>) -> f32 {
    let mut total = 0.0f32;
    for (&p, &t) in recon.iter().zip(x.iter()) {
        let log_p = p.ln().max(LOG_CLAMP);
        let log_1p = (1.0 - p).ln().max(LOG_CLAMP);
        total -= t * log_p + (1.0 - t) * log_1p;
    }
    total / recon.len() as f32
}

/// Summed per-step KL divergence against the N(0, 1) prior, averaged over
/// the batch:
///
/// ```text
/// kl_t = 0.5 · Σ_z (mu² + sigma² − 2·log_sigma) − 0.5·T
/// Lz   = mean_batch( Σ_t kl_t )
/// ```
pub fn kl_divergence(latents: &[LatentSample]) -> f32 {
    let t = latents.len();
    if t == 0 {
        return 0.0;
    }
    let batch = latents[0].mu.nrows();
    let mut per_batch = Array1::<f32>::zeros(batch);

    for step in latents {
        let inner = &(&step.mu * &step.mu) + &(&step.sigma * &step.sigma)
            - &(&step.log_sigma * 2.0);
        per_batch = per_batch + inner.sum_axis(Axis(1)).mapv(|v| 0.5 * v - 0.5 * t as f32);
    }

    per_batch.mean().unwrap_or(0.0)
}
