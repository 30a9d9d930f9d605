//! Error taxonomy for the DRAW core.
//!
//! All failures are raised immediately to the caller — this is deterministic
//! numeric computation, so there is no retry or recovery path. Numeric
//! non-finite values are NOT an error: they propagate through the step chain
//! (see the epsilon note in `attention::window`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrawError {
    /// An input array does not match the shape the model was built for.
    /// Raised before the step loop is entered.
    #[error("{what}: expected shape {expected:?}, got {got:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// A configuration that the core cannot operate on at all (zero
    /// dimensions, attention grid too small for the stride formula).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialized model that could not be decoded.
    #[error("checkpoint decode failed: {0}")]
    Checkpoint(String),
}
