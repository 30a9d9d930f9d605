//! # drawnet
//!
//! DRAW — Deep Recurrent Attentive Writer: an iterative, attention-guided
//! encoder-decoder that reconstructs and generates images over a fixed
//! number of refinement steps, trained against a variational
//! (reconstruction + KL) objective.
//!
//! ## Components
//!
//! - `attention` — Gaussian filterbank window, attended read, inverse write
//! - `nn` — linear projection and single-step LSTM cell primitives
//! - `latent` — reparameterized posterior sampler
//! - `model` — the sequential step driver, loss, and prior generation
//! - `loss` — BCE reconstruction term and per-step KL divergence
//! - `noise` — injectable, seedable standard-normal sources
//! - `checkpoint` — explicit bincode parameter persistence
//!
//! The core is pure computation: no I/O beyond checkpointing, no CLI, no
//! training loop. Dataset handling, optimisation, and image-grid
//! visualisation are external collaborators that exchange `ndarray`
//! tensors with this crate.

pub mod attention;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod latent;
pub mod loss;
pub mod model;
pub mod nn;
pub mod noise;

pub use config::{DrawConfig, ExecutionTarget};
pub use error::DrawError;
pub use model::{DrawModel, ForwardPass};
pub use noise::{GaussianNoise, NoiseSource, ZeroNoise};
