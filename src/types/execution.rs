//! Settlement and trade outcome types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One leg of the trade path handed to the settlement boundary.
#[derive(Debug, Clone, Serialize)]
pub struct TradeLeg {
    pub venue: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: Decimal,
}

/// Ordered trade path plus deadline, the settlement boundary's request shape.
#[derive(Debug, Clone, Serialize)]
pub struct TradePath {
    pub opportunity_id: String,
    pub legs: Vec<TradeLeg>,
    pub deadline: DateTime<Utc>,
}

/// Opaque handle returned by the settlement boundary on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementHandle(pub String);

/// Confirmation reported by the settlement boundary.
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub handle: SettlementHandle,
    pub success: bool,
    pub amounts_out: Vec<Decimal>,
    pub execution_cost_usd: Decimal,
    pub gas_used: Option<u64>,
    pub error_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// Terminal record of one settlement attempt; immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct TradeOutcome {
    pub opportunity_id: String,
    pub attempt_id: String,
    pub settlement_handle: Option<SettlementHandle>,
    pub finalized_at: DateTime<Utc>,
    pub status: OutcomeStatus,
    pub actual_profit_usd: Option<Decimal>,
    pub gas_used: Option<u64>,
    pub execution_time_ms: u64,
    pub error_reason: Option<String>,
}

impl TradeOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
