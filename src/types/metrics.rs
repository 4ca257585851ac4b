//! Engine metrics exposed to operators

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineMetrics {
    pub opportunities_found: u64,
    pub trades_executed: u64,
    pub successful_trades: u64,
    pub total_profit_usd: Decimal,
    pub average_execution_time_ms: u64,
    pub active_opportunities: usize,
}
