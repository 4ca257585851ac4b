//! Cross-DEX Arbitrage Engine
//!
//! Monitors prices across multiple DEX venues, detects cross-venue price
//! discrepancies per token pair, estimates net profitability after
//! fees/gas/slippage, validates candidates against risk limits and hands
//! the survivors to an external settlement boundary.

pub mod config;
pub mod types;
pub mod errors;
pub mod feeds;
pub mod detector;
pub mod estimator;
pub mod risk;
pub mod dispatch;
pub mod engine;
pub mod storage;
pub mod utils;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{EngineError, EngineResult};
pub use types::*;
