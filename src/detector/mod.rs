//! Cross-venue opportunity detection

pub mod scan;
pub mod sizing;

pub use scan::*;
pub use sizing::*;
