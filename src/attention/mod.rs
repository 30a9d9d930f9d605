//! Differentiable two-dimensional Gaussian attention.
//!
//! A linear projection of the decoder hidden state parameterises an N×N grid
//! of Gaussian filters over the image. The same filterbank is used forwards
//! to read a glimpse (`Fy · img · Fxᵀ`) and inverted to write a patch back
//! onto the canvas (`Fyᵀ · w · Fx`).

pub mod read;
pub mod window;
pub mod write;

pub use read::read_glimpse;
pub use window::{AttentionWindow, Filterbank};
pub use write::CanvasWriter;
