//! Single-step LSTM cell with explicitly threaded state.
//!
//! ```text
//! [i f g o] = x·W_ih + h·W_hh + b
//! c' = σ(f) ⊙ c + σ(i) ⊙ tanh(g)
//! h' = σ(o) ⊙ tanh(c')
//! ```
//!
//! The cell is stateless between calls: both the hidden and cell vectors
//! live in `LstmState`, owned by the caller for the duration of one pass.

use ndarray::{s, Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hidden and cell state for one LSTM cell, batch-first.
#[derive(Clone, Debug)]
pub struct LstmState {
    /// Hidden state: `[batch, hidden]`
    pub h: Array2<f32>,

    /// Cell state: `[batch, hidden]`
    pub c: Array2<f32>,
}

impl LstmState {
    /// Zero-initialised state, as required at the start of every pass.
    pub fn zeros(batch: usize, hidden: usize) -> Self {
        Self {
            h: Array2::zeros((batch, hidden)),
            c: Array2::zeros((batch, hidden)),
        }
    }
}

/// Weights for a single LSTM cell. Gate order along the 4h axis is
/// input, forget, cell, output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LstmCell {
    /// Input-to-hidden weights: `[input, 4·hidden]`
    pub w_ih: Array2<f32>,

    /// Hidden-to-hidden weights: `[hidden, 4·hidden]`
    pub w_hh: Array2<f32>,

    /// Gate bias: `[4·hidden]`
    pub bias: Array1<f32>,
}

impl LstmCell {
    /// Create with zero weights.
    pub fn zeros(input: usize, hidden: usize) -> Self {
        Self {
            w_ih: Array2::zeros((input, 4 * hidden)),
            w_hh: Array2::zeros((hidden, 4 * hidden)),
            bias: Array1::zeros(4 * hidden),
        }
    }

    /// Create with Xavier uniform weights, zero bias.
    pub fn xavier(input: usize, hidden: usize, rng: &mut impl Rng) -> Self {
        let out = 4 * hidden;
        let ih_limit = (6.0f32 / (input + out) as f32).sqrt();
        let hh_limit = (6.0f32 / (hidden + out) as f32).sqrt();
        Self {
            w_ih: Array2::from_shape_simple_fn((input, out), || {
                rng.gen_range(-ih_limit..ih_limit)
            }),
            w_hh: Array2::from_shape_simple_fn((hidden, out), || {
                rng.gen_range(-hh_limit..hh_limit)
            }),
            bias: Array1::zeros(out),
        }
    }

    pub fn input_size(&self) -> usize {
        self.w_ih.nrows()
    }

    pub fn hidden_size(&self) -> usize {
        self.w_hh.nrows()
    }

    /// One recurrence step: `[batch, input]` plus previous state in, new
    /// state out. Deterministic given (input, state, weights).
    pub fn step(&self, x: &Array2<f32>, state: &LstmState) -> LstmState {
        let hs = self.hidden_size();
        let gates = x.dot(&self.w_ih) + state.h.dot(&self.w_hh) + &self.bias;

        let i = gates.slice(s![.., ..hs]).mapv(sigmoid);
        let f = gates.slice(s![.., hs..2 * hs]).mapv(sigmoid);
        let g = gates.slice(s![.., 2 * hs..3 * hs]).mapv(f32::tanh);
        let o = gates.slice(s![.., 3 * hs..]).mapv(sigmoid);

        let c = &f * &state.c + &i * &g;
        let h = &o * &c.mapv(f32::tanh);
        LstmState { h, c }
    }

    /// Number of learned parameters.
    pub fn param_count(&self) -> usize {
        self.w_ih.len() + self.w_hh.len() + self.bias.len()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
