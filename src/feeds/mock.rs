//! Shared in-memory collaborator mocks for unit tests.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use crate::errors::{EngineError, EngineResult};
use crate::feeds::traits::*;
use crate::types::*;

pub struct MockPriceSource {
    pub prices: HashMap<(String, TokenPair), Decimal>,
}

impl MockPriceSource {
    pub fn new(entries: &[(&str, TokenPair, Decimal)]) -> Self {
        Self {
            prices: entries
                .iter()
                .map(|(v, p, price)| ((v.to_string(), p.clone()), *price))
                .collect(),
        }
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch(&self, venue: &str, pair: &TokenPair) -> EngineResult<PriceQuote> {
        match self.prices.get(&(venue.to_string(), pair.clone())) {
            Some(price) => Ok(PriceQuote {
                venue: venue.to_string(),
                pair: pair.clone(),
                price: *price,
                observed_at: Utc::now(),
            }),
            None => Err(EngineError::QuoteUnavailable {
                venue: venue.to_string(),
                pair: pair.clone(),
                source: None,
            }),
        }
    }
}

/// `None` models an unavailable feed.
pub struct MockGasFeed(pub Option<u64>);

#[async_trait]
impl GasPriceFeed for MockGasFeed {
    async fn current_gas_price_gwei(&self) -> EngineResult<u64> {
        self.0.ok_or_else(|| EngineError::Network {
            message: "gas feed down".to_string(),
            source: None,
            retry_count: 0,
        })
    }
}

pub struct MockReferenceFeed(pub Option<Decimal>);

#[async_trait]
impl ReferencePriceFeed for MockReferenceFeed {
    async fn native_price_usd(&self) -> EngineResult<Decimal> {
        self.0.ok_or_else(|| EngineError::Network {
            message: "reference feed down".to_string(),
            source: None,
            retry_count: 0,
        })
    }
}

pub struct MockReserveFeed(pub Option<(Decimal, Decimal)>);

#[async_trait]
impl ReserveFeed for MockReserveFeed {
    async fn reserves(&self, _venue: &str, _pair: &TokenPair) -> EngineResult<(Decimal, Decimal)> {
        self.0.ok_or_else(|| EngineError::Network {
            message: "reserve feed down".to_string(),
            source: None,
            retry_count: 0,
        })
    }
}

pub enum SettlementBehavior {
    /// Confirm successfully, reporting the given execution cost.
    Succeed { execution_cost_usd: Decimal },
    /// Confirm as a failed trade.
    Fail { reason: String },
    /// Reject at submission time.
    RejectSubmission,
    /// Never confirm; forces the caller's timeout path.
    Hang,
}

pub struct MockSettlement {
    pub behavior: SettlementBehavior,
    pub submissions: AtomicUsize,
    pub submit_delay: Duration,
}

impl MockSettlement {
    pub fn new(behavior: SettlementBehavior) -> Self {
        Self {
            behavior,
            submissions: AtomicUsize::new(0),
            submit_delay: Duration::ZERO,
        }
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettlementBoundary for MockSettlement {
    async fn submit(&self, path: &TradePath) -> EngineResult<SettlementHandle> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        if matches!(self.behavior, SettlementBehavior::RejectSubmission) {
            return Err(EngineError::SettlementRejected {
                opportunity_id: path.opportunity_id.clone(),
                reason: "rejected by mock".to_string(),
            });
        }
        Ok(SettlementHandle(format!("handle-{}", path.opportunity_id)))
    }

    async fn await_confirmation(
        &self,
        handle: &SettlementHandle,
        timeout: Duration,
    ) -> EngineResult<SettlementReceipt> {
        match &self.behavior {
            SettlementBehavior::Succeed { execution_cost_usd } => Ok(SettlementReceipt {
                handle: handle.clone(),
                success: true,
                amounts_out: vec![],
                execution_cost_usd: *execution_cost_usd,
                gas_used: Some(180_000),
                error_reason: None,
            }),
            SettlementBehavior::Fail { reason } => Ok(SettlementReceipt {
                handle: handle.clone(),
                success: false,
                amounts_out: vec![],
                execution_cost_usd: Decimal::ZERO,
                gas_used: Some(90_000),
                error_reason: Some(reason.clone()),
            }),
            SettlementBehavior::Hang => {
                tokio::time::sleep(timeout).await;
                Err(EngineError::SettlementTimeout {
                    opportunity_id: handle.0.clone(),
                    elapsed: timeout,
                })
            }
            SettlementBehavior::RejectSubmission => unreachable!("rejected at submit"),
        }
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub opportunities: Mutex<Vec<(String, String)>>,
    pub outcomes: Mutex<Vec<TradeOutcome>>,
}

impl PersistenceSink for MemorySink {
    fn record_opportunity(&self, opportunity: &Opportunity, status: &str) -> anyhow::Result<()> {
        self.opportunities
            .lock()
            .unwrap()
            .push((opportunity.id.clone(), status.to_string()));
        Ok(())
    }

    fn record_outcome(&self, outcome: &TradeOutcome) -> anyhow::Result<()> {
        self.outcomes.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}
