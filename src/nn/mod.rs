//! Learned primitives — linear projections and the gated recurrent cell.
//!
//! Both are parameter-owning structs with all state passed explicitly;
//! parameters are only ever mutated by an external training collaborator.

pub mod linear;
pub mod lstm;

pub use linear::Linear;
pub use lstm::{LstmCell, LstmState};
