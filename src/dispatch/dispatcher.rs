//! Execution dispatcher
//!
//! Serializes validated opportunities to the settlement boundary and keeps
//! the in-flight set: at most one settlement attempt per opportunity id.
//! Only the dispatcher writes the set; the rest of the pipeline reads it to
//! skip already-in-flight ids.

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use crate::errors::EngineError;
use crate::feeds::{PersistenceSink, SettlementBoundary};
use crate::types::{
    Opportunity, OutcomeStatus, ProfitBreakdown, SettlementHandle, TradeLeg, TradeOutcome,
    TradePath,
};

/// Result of one dispatch attempt, consumed synchronously by the driver.
#[derive(Debug)]
pub enum DispatchResult {
    /// The id was already in flight; no settlement attempt was made.
    Skipped { opportunity_id: String },
    Completed(TradeOutcome),
}

pub struct Dispatcher {
    settlement: Arc<dyn SettlementBoundary>,
    sink: Arc<dyn PersistenceSink>,
    in_flight: Arc<RwLock<HashSet<String>>>,
    pub settlement_timeout: Duration,
    pub deadline_window: Duration,
}

impl Dispatcher {
    pub fn new(
        settlement: Arc<dyn SettlementBoundary>,
        sink: Arc<dyn PersistenceSink>,
        settlement_timeout: Duration,
        deadline_window: Duration,
    ) -> Self {
        Self {
            settlement,
            sink,
            in_flight: Arc::new(RwLock::new(HashSet::new())),
            settlement_timeout,
            deadline_window,
        }
    }

    /// Read-only view of the in-flight ids for the detection side.
    pub async fn in_flight_ids(&self) -> HashSet<String> {
        self.in_flight.read().await.clone()
    }

    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.read().await.len()
    }

    /// Submit one validated, profitable opportunity and await its outcome.
    ///
    /// Dedup contract: a second call with the same id while the first is in
    /// flight returns `Skipped` without touching the settlement boundary.
    pub async fn dispatch(
        &self,
        opportunity: &Opportunity,
        breakdown: &ProfitBreakdown,
    ) -> DispatchResult {
        {
            // Insert-if-absent under a single write lock so concurrent calls
            // for the same id cannot both pass the check.
            let mut in_flight = self.in_flight.write().await;
            if !in_flight.insert(opportunity.id.clone()) {
                debug!("Opportunity {} already in flight, skipping", opportunity.id);
                return DispatchResult::Skipped {
                    opportunity_id: opportunity.id.clone(),
                };
            }
        }

        let started = Instant::now();
        let outcome = self.settle(opportunity, breakdown, started).await;

        if let Err(e) = self.sink.record_outcome(&outcome) {
            error!("Failed to persist outcome for {}: {}", opportunity.id, e);
        }

        self.in_flight.write().await.remove(&opportunity.id);
        DispatchResult::Completed(outcome)
    }

    async fn settle(
        &self,
        opportunity: &Opportunity,
        breakdown: &ProfitBreakdown,
        started: Instant,
    ) -> TradeOutcome {
        let attempt_id = uuid::Uuid::new_v4().to_string();
        let path = build_trade_path(opportunity, self.deadline_window);

        info!(
            opportunity_id = %opportunity.id,
            attempt_id = %attempt_id,
            net_profit = %breakdown.net_profit_usd,
            "Submitting trade path to settlement"
        );

        let handle = match self.settlement.submit(&path).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Settlement submission failed for {}: {}", opportunity.id, e);
                return self.failed_outcome(opportunity, attempt_id, None, started, e.to_string());
            }
        };

        let confirmation = tokio::time::timeout(
            self.settlement_timeout,
            self.settlement
                .await_confirmation(&handle, self.settlement_timeout),
        )
        .await;

        let receipt = match confirmation {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                warn!("Settlement failed for {}: {}", opportunity.id, e);
                return self.failed_outcome(
                    opportunity,
                    attempt_id,
                    Some(handle),
                    started,
                    e.to_string(),
                );
            }
            Err(_) => {
                let e = EngineError::SettlementTimeout {
                    opportunity_id: opportunity.id.clone(),
                    elapsed: started.elapsed(),
                };
                warn!("{}", e);
                return self.failed_outcome(
                    opportunity,
                    attempt_id,
                    Some(handle),
                    started,
                    e.to_string(),
                );
            }
        };

        if !receipt.success {
            let reason = receipt
                .error_reason
                .unwrap_or_else(|| "settlement reported failure".to_string());
            return self.failed_outcome(opportunity, attempt_id, Some(receipt.handle), started, reason);
        }

        // Realized profit: advertised gross minus what execution actually
        // cost, never reported below zero.
        let actual_profit =
            (breakdown.gross_profit_usd - receipt.execution_cost_usd).max(dec!(0));

        info!(
            opportunity_id = %opportunity.id,
            actual_profit = %actual_profit,
            gas_used = ?receipt.gas_used,
            "Trade settled successfully"
        );

        TradeOutcome {
            opportunity_id: opportunity.id.clone(),
            attempt_id,
            settlement_handle: Some(receipt.handle),
            finalized_at: Utc::now(),
            status: OutcomeStatus::Success,
            actual_profit_usd: Some(actual_profit),
            gas_used: receipt.gas_used,
            execution_time_ms: started.elapsed().as_millis() as u64,
            error_reason: None,
        }
    }

    fn failed_outcome(
        &self,
        opportunity: &Opportunity,
        attempt_id: String,
        handle: Option<SettlementHandle>,
        started: Instant,
        error: String,
    ) -> TradeOutcome {
        TradeOutcome {
            opportunity_id: opportunity.id.clone(),
            attempt_id,
            settlement_handle: handle,
            finalized_at: Utc::now(),
            status: OutcomeStatus::Failed,
            actual_profit_usd: None,
            gas_used: None,
            execution_time_ms: started.elapsed().as_millis() as u64,
            error_reason: Some(error),
        }
    }
}

/// Translate an opportunity into the settlement boundary's request shape:
/// buy the base token on the cheap venue, sell it on the expensive one.
fn build_trade_path(opportunity: &Opportunity, deadline_window: Duration) -> TradePath {
    let deadline = Utc::now() + ChronoDuration::from_std(deadline_window).unwrap_or_default();
    TradePath {
        opportunity_id: opportunity.id.clone(),
        legs: vec![
            TradeLeg {
                venue: opportunity.buy_venue.clone(),
                token_in: opportunity.pair.quote.clone(),
                token_out: opportunity.pair.base.clone(),
                amount_in: opportunity.buy_price * opportunity.amount,
            },
            TradeLeg {
                venue: opportunity.sell_venue.clone(),
                token_in: opportunity.pair.base.clone(),
                token_out: opportunity.pair.quote.clone(),
                amount_in: opportunity.amount,
            },
        ],
        deadline,
    }
}
