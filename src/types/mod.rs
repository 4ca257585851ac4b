//! Core data types and structures

pub mod quotes;
pub mod opportunity;
pub mod execution;
pub mod risk;
pub mod metrics;
pub mod health;

pub use quotes::*;
pub use opportunity::*;
pub use execution::*;
pub use risk::*;
pub use metrics::*;
pub use health::*;
