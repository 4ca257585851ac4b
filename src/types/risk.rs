//! Risk gate types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;

/// Snapshot of the process-wide risk state, exposed to operators.
#[derive(Debug, Clone, Serialize)]
pub struct RiskSnapshot {
    pub circuit_breaker_open: bool,
    pub circuit_breaker_opened_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub daily_loss_usd: Decimal,
    pub last_reset_date: NaiveDate,
    pub manually_paused: bool,
}

/// Reason the gate refuses to trade this cycle. A cycle-level early exit,
/// not a per-opportunity error.
#[derive(Debug, Clone, PartialEq)]
pub enum TradingHalt {
    CircuitBreakerOpen { cooldown_remaining: Duration },
    DailyLossExceeded { daily_loss_usd: Decimal },
    ManuallyPaused,
}

impl std::fmt::Display for TradingHalt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingHalt::CircuitBreakerOpen { cooldown_remaining } => {
                write!(f, "circuit breaker open ({:?} remaining)", cooldown_remaining)
            }
            TradingHalt::DailyLossExceeded { daily_loss_usd } => {
                write!(f, "daily loss cap reached (${})", daily_loss_usd)
            }
            TradingHalt::ManuallyPaused => write!(f, "trading manually paused"),
        }
    }
}

/// Per-opportunity validation verdict. Each check keeps its own flag and the
/// failing reasons are retained for audit, never silently dropped.
#[derive(Debug, Clone, Serialize, Default)]
pub struct RiskVerdict {
    pub profit_check: bool,
    pub slippage_check: bool,
    pub notional_check: bool,
    pub liquidity_check: bool,
    pub token_safety: bool,
    pub all_passed: bool,
    pub warnings: Vec<String>,
}
