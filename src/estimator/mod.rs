//! Profitability estimation

pub mod costs;
pub mod profit;

pub use profit::*;
