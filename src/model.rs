//! The DRAW model — sequential step driver, loss, and prior generation.
//!
//! One refinement step:
//!
//! ```text
//! x_hat = x − sigmoid(c_prev)
//! r_t   = read(x, x_hat, filters(h_dec_prev))
//! h_enc = encoder(r_t ‖ h_dec_prev, enc_state)
//! z_t   = mu + e ⊙ sigma                 (sampled from h_enc)
//! h_dec = decoder(z_t, dec_state)
//! c_t   = c_prev + write(h_dec, filters(h_dec))
//! ```
//!
//! The loop is strictly sequential: step t+1 depends on `c_t` and `h_dec`.
//! All hidden, cell, and canvas state lives in local variables for the
//! duration of one call and is returned explicitly — nothing survives
//! between calls, so `forward`, `loss`, and `generate` are independent.

use ndarray::{concatenate, Array2, Array3, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::attention::{read_glimpse, AttentionWindow, CanvasWriter};
use crate::config::DrawConfig;
use crate::error::DrawError;
use crate::latent::{LatentSample, LatentSampler};
use crate::loss::{binary_cross_entropy, kl_divergence};
use crate::nn::{LstmCell, LstmState};
use crate::noise::NoiseSource;

/// Everything one forward pass produces: the T-entry canvas sequence and
/// the per-step latent distribution parameters the loss needs.
#[derive(Clone, Debug)]
pub struct ForwardPass {
    /// Running canvases `cs[0..T]`, each `[batch, A·B]`.
    pub canvases: Vec<Array2<f32>>,

    /// Per-step latent draws, `T` entries.
    pub latents: Vec<LatentSample>,
}

impl ForwardPass {
    /// The final canvas `cs[T−1]`.
    pub fn final_canvas(&self) -> &Array2<f32> {
        &self.canvases[self.canvases.len() - 1]
    }
}

/// The complete DRAW model. Parameters are read-only during forward passes;
/// an external training collaborator mutates them between calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawModel {
    /// Model dimensions, fixed at construction.
    pub config: DrawConfig,

    /// Encoder cell over `[glimpse ‖ h_dec_prev]`.
    pub encoder: LstmCell,

    /// Decoder cell over the sampled latent.
    pub decoder: LstmCell,

    /// Posterior sampler over the encoder hidden state.
    pub sampler: LatentSampler,

    /// Shared attention projection for the read and write paths.
    pub window: AttentionWindow,

    /// Patch projection and inverse transform onto the canvas.
    pub writer: CanvasWriter,
}

impl DrawModel {
    /// Create with all-zero weights (useful for tests and as a checkpoint
    /// target).
    pub fn zeros(config: DrawConfig) -> Result<Self, DrawError> {
        config.validate()?;
        Ok(Self {
            encoder: LstmCell::zeros(config.read_dim(), config.enc_size),
            decoder: LstmCell::zeros(config.z_size, config.dec_size),
            sampler: LatentSampler::zeros(config.enc_size, config.z_size),
            window: AttentionWindow::zeros(config.dec_size, config.a, config.b, config.n),
            writer: CanvasWriter::zeros(config.dec_size, config.n),
            config,
        })
    }

    /// Create with Xavier-initialised weights.
    pub fn xavier(config: DrawConfig, rng: &mut impl Rng) -> Result<Self, DrawError> {
        config.validate()?;
        Ok(Self {
            encoder: LstmCell::xavier(config.read_dim(), config.enc_size, rng),
            decoder: LstmCell::xavier(config.z_size, config.dec_size, rng),
            sampler: LatentSampler::xavier(config.enc_size, config.z_size, rng),
            window: AttentionWindow::xavier(config.dec_size, config.a, config.b, config.n, rng),
            writer: CanvasWriter::xavier(config.dec_size, config.n, rng),
            config,
        })
    }

    /// Run the T-step refinement loop over a batch of flattened images
    /// `[batch, A·B]`.
    pub fn forward(
        &self,
        x: &Array2<f32>,
        noise: &mut dyn NoiseSource,
    ) -> Result<ForwardPass, DrawError> {
        self.check_input(x)?;
        let cfg = &self.config;
        let batch = x.nrows();

        let mut enc_state = LstmState::zeros(batch, cfg.enc_size);
        let mut dec_state = LstmState::zeros(batch, cfg.dec_size);
        let mut c_prev = Array2::zeros((batch, cfg.image_dim()));

        let mut canvases = Vec::with_capacity(cfg.t);
        let mut latents = Vec::with_capacity(cfg.t);

        for step in 0..cfg.t {
            let x_hat = x - &c_prev.mapv(sigmoid);

            // Read filters come from the previous step's decoder state.
            let read_filters = self.window.filters(&dec_state.h);
            let glimpse = read_glimpse(x, &x_hat, &read_filters, cfg.target);

            let enc_input = concatenate(Axis(1), &[glimpse.view(), dec_state.h.view()])
                .expect("glimpse and decoder state share the batch dimension");
            enc_state = self.encoder.step(&enc_input, &enc_state);

            let latent = self.sampler.sample(&enc_state.h, noise);
            dec_state = self.decoder.step(&latent.z, &dec_state);

            // Write filters are re-derived from the fresh decoder state.
            let write_filters = self.window.filters(&dec_state.h);
            let c = &c_prev + &self.writer.write(&dec_state.h, &write_filters, cfg.target);

            tracing::trace!(step, "canvas updated");
            canvases.push(c.clone());
            c_prev = c;
            latents.push(latent);
        }

        Ok(ForwardPass { canvases, latents })
    }

    /// Total negative-ELBO loss for a batch: reconstruction + summed KL.
    /// Runs `forward` internally.
    pub fn loss(&self, x: &Array2<f32>, noise: &mut dyn NoiseSource) -> Result<f32, DrawError> {
        let pass = self.forward(x, noise)?;
        let recon = pass.final_canvas().mapv(sigmoid);
        let lx = binary_cross_entropy(&recon, x) * self.config.image_dim() as f32;
        let lz = kl_divergence(&pass.latents);
        tracing::debug!(lx, lz, "negative ELBO");
        Ok(lx + lz)
    }

    /// Sample `num_output` images from the prior: decoder and writer only,
    /// latents drawn fresh from N(0, 1) each step. Returns the T raw
    /// canvases, each `[num_output, A·B]`.
    pub fn generate(
        &self,
        num_output: usize,
        noise: &mut dyn NoiseSource,
    ) -> Result<Vec<Array2<f32>>, DrawError> {
        if num_output == 0 {
            return Err(DrawError::InvalidConfig(
                "num_output must be at least 1".into(),
            ));
        }
        let cfg = &self.config;

        let mut dec_state = LstmState::zeros(num_output, cfg.dec_size);
        let mut c_prev = Array2::zeros((num_output, cfg.image_dim()));
        let mut canvases = Vec::with_capacity(cfg.t);

        for step in 0..cfg.t {
            let z = noise.standard_normal(num_output, cfg.z_size);
            dec_state = self.decoder.step(&z, &dec_state);
            let filters = self.window.filters(&dec_state.h);
            let c = &c_prev + &self.writer.write(&dec_state.h, &filters, cfg.target);
            tracing::trace!(step, "prior canvas updated");
            canvases.push(c.clone());
            c_prev = c;
        }

        Ok(canvases)
    }

    /// Turn raw canvases into grid-ready image batches `[num, B, A]` by
    /// applying the sigmoid and unflattening. The grid layout itself is an
    /// external collaborator's job.
    pub fn canvases_to_images(&self, canvases: &[Array2<f32>]) -> Vec<Array3<f32>> {
        let (b, a) = (self.config.b, self.config.a);
        canvases
            .iter()
            .map(|c| {
                let num = c.nrows();
                c.mapv(sigmoid)
                    .into_shape_with_order((num, b, a))
                    .expect("canvas columns are B·A")
            })
            .collect()
    }

    /// Total learned parameter count.
    pub fn param_count(&self) -> usize {
        self.encoder.param_count()
            + self.decoder.param_count()
            + self.sampler.param_count()
            + self.window.param_count()
            + self.writer.param_count()
    }

    fn check_input(&self, x: &Array2<f32>) -> Result<(), DrawError> {
        if x.ncols() != self.config.image_dim() {
            return Err(DrawError::ShapeMismatch {
                what: "input image batch",
                expected: (x.nrows(), self.config.image_dim()),
                got: (x.nrows(), x.ncols()),
            });
        }
        Ok(())
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
