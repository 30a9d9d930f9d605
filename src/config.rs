//! Model configuration — all dimensions are fixed for the lifetime of a
//! `DrawModel` instance.

use serde::{Deserialize, Serialize};

use crate::error::DrawError;

/// Where the per-batch-element work of the attention transforms runs.
///
/// The step loop itself is strictly sequential (each step depends on the
/// previous canvas and decoder state); the batch dimension is the only
/// parallel axis. Both targets produce identical results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionTarget {
    /// Plain sequential loops.
    #[default]
    Cpu,
    /// Rayon over the batch dimension in the read/write transforms.
    CpuParallel,
}

/// Configuration for a DRAW model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawConfig {
    /// Number of refinement steps T.
    pub t: usize,

    /// Image width A.
    pub a: usize,

    /// Image height B.
    pub b: usize,

    /// Attention grid size N (the glimpse is N×N).
    pub n: usize,

    /// Latent dimension.
    pub z_size: usize,

    /// Encoder hidden width.
    pub enc_size: usize,

    /// Decoder hidden width.
    pub dec_size: usize,

    /// Execution target for the batched attention transforms.
    #[serde(default)]
    pub target: ExecutionTarget,
}

impl DrawConfig {
    /// Flattened image dimension A·B.
    pub fn image_dim(&self) -> usize {
        self.a * self.b
    }

    /// Width of the read output: two N×N glimpses (input and error image).
    pub fn glimpse_dim(&self) -> usize {
        2 * self.n * self.n
    }

    /// Encoder input width: read glimpse concatenated with the previous
    /// decoder hidden state.
    pub fn read_dim(&self) -> usize {
        self.glimpse_dim() + self.dec_size
    }

    /// Reject configurations the core cannot operate on.
    ///
    /// The grid stride formula divides by N−1, so `n < 2` is rejected here.
    /// `N > min(A, B)` is deliberately allowed — that combination is a
    /// modeling choice left to the caller.
    pub fn validate(&self) -> Result<(), DrawError> {
        if self.t == 0 {
            return Err(DrawError::InvalidConfig(
                "step count t must be at least 1".into(),
            ));
        }
        if self.a == 0 || self.b == 0 {
            return Err(DrawError::InvalidConfig(format!(
                "image dimensions must be nonzero, got {}x{}",
                self.a, self.b
            )));
        }
        if self.n < 2 {
            return Err(DrawError::InvalidConfig(format!(
                "attention grid size n must be at least 2, got {}",
                self.n
            )));
        }
        if self.z_size == 0 || self.enc_size == 0 || self.dec_size == 0 {
            return Err(DrawError::InvalidConfig(
                "latent and hidden widths must be nonzero".into(),
            ));
        }
        Ok(())
    }
}
