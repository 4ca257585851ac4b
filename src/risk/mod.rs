//! Risk gating: circuit breaker, loss caps and per-opportunity validation

pub mod gate;
pub mod validate;
pub mod blacklist;

pub use gate::*;
pub use blacklist::*;
