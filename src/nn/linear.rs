//! Batch-first linear projection: `y = xW + b`.

use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Linear projection with learned weight `[input, output]` and bias
/// `[output]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Linear {
    /// Weight matrix: `W ∈ R^{input × output}`
    pub weight: Array2<f32>,

    /// Bias vector: `b ∈ R^{output}`
    pub bias: Array1<f32>,
}

impl Linear {
    /// Create with zero weights and biases.
    pub fn zeros(input: usize, output: usize) -> Self {
        Self {
            weight: Array2::zeros((input, output)),
            bias: Array1::zeros(output),
        }
    }

    /// Create with Xavier/Glorot uniform weights, zero biases.
    ///
    /// Samples from ±sqrt(6 / (input + output)).
    pub fn xavier(input: usize, output: usize, rng: &mut impl Rng) -> Self {
        let limit = (6.0f32 / (input + output) as f32).sqrt();
        let weight =
            Array2::from_shape_simple_fn((input, output), || rng.gen_range(-limit..limit));
        Self {
            weight,
            bias: Array1::zeros(output),
        }
    }

    /// Forward pass: `[batch, input] -> [batch, output]`.
    pub fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        x.dot(&self.weight) + &self.bias
    }

    pub fn input_size(&self) -> usize {
        self.weight.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weight.ncols()
    }

    /// Number of learned parameters.
    pub fn param_count(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}
