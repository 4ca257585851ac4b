//! Risk gate state machine
//!
//! Owns the process-wide risk state: circuit breaker, daily loss cap and the
//! manual pause switch. Transitions are lazy: the breaker auto-closes and the
//! daily loss resets on the next `can_trade` evaluation, not on a timer.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use crate::config::Config;
use crate::types::{RiskSnapshot, TradingHalt};

#[derive(Debug, Clone)]
pub struct RiskLimits {
    pub min_profit_usd: Decimal,
    pub max_slippage_percent: Decimal,
    pub max_transaction_value_usd: Decimal,
    pub min_liquidity_usd: Decimal,
    pub liquidity_utilization_cap: Decimal,
    pub max_consecutive_failures: u32,
    pub circuit_breaker_timeout: Duration,
    pub max_daily_loss_usd: Decimal,
    pub blacklisted_tokens: HashSet<String>,
}

impl From<&Config> for RiskLimits {
    fn from(config: &Config) -> Self {
        Self {
            min_profit_usd: config.min_profit_usd,
            max_slippage_percent: config.max_slippage_percent,
            max_transaction_value_usd: config.max_transaction_value_usd,
            min_liquidity_usd: config.min_liquidity_usd,
            liquidity_utilization_cap: config.liquidity_utilization_cap,
            max_consecutive_failures: config.max_consecutive_failures,
            circuit_breaker_timeout: Duration::from_millis(config.circuit_breaker_timeout_ms),
            max_daily_loss_usd: config.max_daily_loss_usd,
            blacklisted_tokens: config.blacklisted_tokens.clone(),
        }
    }
}

#[derive(Debug)]
struct RiskState {
    circuit_breaker_open: bool,
    circuit_breaker_opened_at: Option<Instant>,
    circuit_breaker_opened_at_utc: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    daily_loss_usd: Decimal,
    last_reset_date: NaiveDate,
    manually_paused: bool,
}

pub struct RiskGate {
    pub limits: RiskLimits,
    state: RwLock<RiskState>,
}

impl RiskGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            state: RwLock::new(RiskState {
                circuit_breaker_open: false,
                circuit_breaker_opened_at: None,
                circuit_breaker_opened_at_utc: None,
                consecutive_failures: 0,
                daily_loss_usd: dec!(0),
                last_reset_date: Utc::now().date_naive(),
                manually_paused: false,
            }),
        }
    }

    /// Whether trading is allowed right now; on refusal the specific halt
    /// reason is returned for the cycle log.
    pub async fn can_trade(&self) -> Result<(), TradingHalt> {
        self.can_trade_on(Utc::now().date_naive()).await
    }

    /// `can_trade` with an injected calendar day; the daily loss resets
    /// exactly once when the day advances past `last_reset_date`.
    pub async fn can_trade_on(&self, today: NaiveDate) -> Result<(), TradingHalt> {
        let mut state = self.state.write().await;

        if today > state.last_reset_date {
            info!(
                "Daily loss reset: ${} accumulated on {}",
                state.daily_loss_usd, state.last_reset_date
            );
            state.daily_loss_usd = dec!(0);
            state.last_reset_date = today;
        }

        if state.manually_paused {
            return Err(TradingHalt::ManuallyPaused);
        }

        if state.circuit_breaker_open {
            let elapsed = state
                .circuit_breaker_opened_at
                .map(|t| t.elapsed())
                .unwrap_or(Duration::ZERO);
            if elapsed > self.limits.circuit_breaker_timeout {
                info!("Circuit breaker cooldown complete, resetting");
                state.circuit_breaker_open = false;
                state.circuit_breaker_opened_at = None;
                state.circuit_breaker_opened_at_utc = None;
                state.consecutive_failures = 0;
            } else {
                return Err(TradingHalt::CircuitBreakerOpen {
                    cooldown_remaining: self.limits.circuit_breaker_timeout - elapsed,
                });
            }
        }

        if state.daily_loss_usd >= self.limits.max_daily_loss_usd {
            return Err(TradingHalt::DailyLossExceeded {
                daily_loss_usd: state.daily_loss_usd,
            });
        }

        Ok(())
    }

    /// Record a failed settlement attempt. Opens the circuit breaker once the
    /// consecutive-failure threshold is met; returns true when it opened.
    pub async fn record_failure(&self) -> bool {
        let mut state = self.state.write().await;
        state.consecutive_failures += 1;

        if state.consecutive_failures >= self.limits.max_consecutive_failures
            && !state.circuit_breaker_open
        {
            state.circuit_breaker_open = true;
            state.circuit_breaker_opened_at = Some(Instant::now());
            state.circuit_breaker_opened_at_utc = Some(Utc::now());
            error!(
                "Circuit breaker OPEN after {} consecutive failures",
                state.consecutive_failures
            );
            return true;
        }
        false
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        state.consecutive_failures = 0;
    }

    /// Accumulate a realized loss toward the daily cap. Sign-insensitive.
    pub async fn record_loss(&self, amount_usd: Decimal) {
        let mut state = self.state.write().await;
        state.daily_loss_usd += amount_usd.abs();
        warn!(
            "Recorded loss ${}, daily total ${} (cap ${})",
            amount_usd.abs(),
            state.daily_loss_usd,
            self.limits.max_daily_loss_usd
        );
    }

    pub async fn pause_trading(&self) {
        let mut state = self.state.write().await;
        state.manually_paused = true;
        warn!("Trading manually PAUSED by operator");
    }

    pub async fn resume_trading(&self) {
        let mut state = self.state.write().await;
        state.manually_paused = false;
        info!("Trading manually RESUMED by operator");
    }

    pub async fn snapshot(&self) -> RiskSnapshot {
        let state = self.state.read().await;
        RiskSnapshot {
            circuit_breaker_open: state.circuit_breaker_open,
            circuit_breaker_opened_at: state.circuit_breaker_opened_at_utc,
            consecutive_failures: state.consecutive_failures,
            daily_loss_usd: state.daily_loss_usd,
            last_reset_date: state.last_reset_date,
            manually_paused: state.manually_paused,
        }
    }
}
