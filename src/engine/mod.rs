//! Cycle driver: fetch -> detect -> estimate -> gate -> dispatch
//!
//! One `ArbEngine` instance owns the pipeline. The caller drives it with
//! `run_cycle` at a fixed interval; the loop is non-reentrant because a cycle
//! only returns once its opportunity processing has drained.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};
use crate::config::Config;
use crate::detector::Detector;
use crate::dispatch::{DispatchResult, Dispatcher};
use crate::estimator::ProfitEstimator;
use crate::feeds::{PersistenceSink, PriceSource};
use crate::risk::RiskGate;
use crate::types::{
    EngineMetrics, HealthStatus, Opportunity, PriceSnapshot, RiskSnapshot, TradingHalt,
};
use crate::utils::{print_opportunity, print_trade_outcome};

const STALENESS_HEALTH_SECS: u64 = 10;

#[derive(Debug, Default)]
struct MetricsState {
    opportunities_found: u64,
    trades_executed: u64,
    successful_trades: u64,
    total_profit_usd: Decimal,
    total_execution_time_ms: u64,
    error_counts: HashMap<String, u32>,
}

/// What one cycle did, consumed by the driver loop for logging/stats.
#[derive(Debug, Default)]
pub struct CycleSummary {
    pub halted: Option<TradingHalt>,
    pub quotes_fetched: usize,
    pub candidates: usize,
    pub dispatched: usize,
}

pub struct ArbEngine {
    config: Config,
    source: Arc<dyn PriceSource>,
    detector: Detector,
    estimator: ProfitEstimator,
    gate: Arc<RiskGate>,
    dispatcher: Dispatcher,
    sink: Arc<dyn PersistenceSink>,
    metrics: RwLock<MetricsState>,
    last_snapshot_at: RwLock<Option<Instant>>,
    started_at: Instant,
}

impl ArbEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        source: Arc<dyn PriceSource>,
        detector: Detector,
        estimator: ProfitEstimator,
        gate: Arc<RiskGate>,
        dispatcher: Dispatcher,
        sink: Arc<dyn PersistenceSink>,
    ) -> Self {
        Self {
            config,
            source,
            detector,
            estimator,
            gate,
            dispatcher,
            sink,
            metrics: RwLock::new(MetricsState::default()),
            last_snapshot_at: RwLock::new(None),
            started_at: Instant::now(),
        }
    }

    /// Run one full detection/estimation/gating/dispatch cycle.
    ///
    /// Errors local to one venue or one opportunity never abort the cycle;
    /// an `Err` from here means the driver itself is broken and the process
    /// should stop.
    pub async fn run_cycle(&self) -> anyhow::Result<CycleSummary> {
        // Config is treated as an atomic snapshot for the whole cycle.
        let config = self.config.clone();
        let mut summary = CycleSummary::default();

        if let Err(halt) = self.gate.can_trade().await {
            warn!("Cycle skipped: {}", halt);
            summary.halted = Some(halt);
            return Ok(summary);
        }

        let cycle_ts = Utc::now();
        let snapshot = self.fetch_snapshot(&config).await;
        summary.quotes_fetched = snapshot.values().map(|quotes| quotes.len()).sum();
        *self.last_snapshot_at.write().await = Some(Instant::now());

        let in_flight = self.dispatcher.in_flight_ids().await;
        let candidates =
            self.detector
                .scan(&snapshot, &config.monitored_pairs, &in_flight, cycle_ts);
        summary.candidates = candidates.len();

        if !candidates.is_empty() {
            debug!("Cycle found {} candidate(s)", candidates.len());
        }
        self.metrics.write().await.opportunities_found += candidates.len() as u64;

        for mut opportunity in candidates {
            // A failure earlier in this cycle may have tripped the breaker.
            if let Err(halt) = self.gate.can_trade().await {
                warn!("Stopping candidate processing mid-cycle: {}", halt);
                summary.halted = Some(halt);
                break;
            }
            if self.process_candidate(&mut opportunity, &config).await {
                summary.dispatched += 1;
            }
        }

        Ok(summary)
    }

    /// Estimate, validate and (if it survives) dispatch one candidate.
    /// Returns true when a settlement attempt was made.
    async fn process_candidate(&self, opportunity: &mut Opportunity, config: &Config) -> bool {
        let breakdown = match self.estimator.estimate(opportunity, config).await {
            Ok(breakdown) => breakdown,
            Err(e) => {
                warn!("Dropping {}: {}", opportunity.id, e);
                self.count_error("estimation").await;
                return false;
            }
        };
        opportunity.profit = Some(breakdown.clone());

        let verdict = self.gate.validate_opportunity(opportunity, &breakdown);
        opportunity.verdict = Some(verdict.clone());

        if !verdict.all_passed {
            debug!(
                "Rejected {}: {:?}",
                opportunity.id, verdict.warnings
            );
            if let Err(e) = self.sink.record_opportunity(opportunity, "rejected") {
                error!("Failed to persist rejected opportunity: {}", e);
                self.count_error("persist_opportunity").await;
            }
            return false;
        }

        // Candidates are cycle-local; a cycle that drags past the opportunity
        // lifetime must not dispatch on stale prices.
        if opportunity.age_ms(Utc::now()) > config.opportunity_timeout_ms {
            warn!("Evicting {}: exceeded opportunity lifetime", opportunity.id);
            self.count_error("expired").await;
            return false;
        }

        print_opportunity(opportunity, &breakdown);

        match self.dispatcher.dispatch(opportunity, &breakdown).await {
            DispatchResult::Skipped { opportunity_id } => {
                debug!("Dispatch skipped for {}", opportunity_id);
                false
            }
            DispatchResult::Completed(outcome) => {
                print_trade_outcome(&outcome);
                {
                    let mut metrics = self.metrics.write().await;
                    metrics.trades_executed += 1;
                    metrics.total_execution_time_ms += outcome.execution_time_ms;
                    if outcome.is_success() {
                        metrics.successful_trades += 1;
                        metrics.total_profit_usd +=
                            outcome.actual_profit_usd.unwrap_or_default();
                    }
                }

                let status = if outcome.is_success() {
                    self.gate.record_success().await;
                    "executed"
                } else {
                    // A failed attempt still burns gas, so it counts toward
                    // the daily loss cap as well as the failure streak.
                    self.gate.record_failure().await;
                    self.gate.record_loss(breakdown.gas_estimate_usd).await;
                    self.count_error("settlement").await;
                    "failed"
                };

                if let Err(e) = self.sink.record_opportunity(opportunity, status) {
                    error!("Failed to persist opportunity: {}", e);
                    self.count_error("persist_opportunity").await;
                }
                true
            }
        }
    }

    /// Assemble the per-cycle price snapshot. An unavailable venue/pair is a
    /// skip, never a cycle abort.
    async fn fetch_snapshot(&self, config: &Config) -> PriceSnapshot {
        let timeout = std::time::Duration::from_secs(config.price_fetch_timeout_secs);
        let mut snapshot: PriceSnapshot = HashMap::new();

        for venue in &config.monitored_venues {
            for pair in &config.monitored_pairs {
                match tokio::time::timeout(timeout, self.source.fetch(venue, pair)).await {
                    Ok(Ok(quote)) => {
                        snapshot
                            .entry(venue.clone())
                            .or_default()
                            .insert(pair.clone(), quote);
                    }
                    Ok(Err(e)) => {
                        debug!("Quote unavailable for {} {}: {}", venue, pair, e);
                        self.count_error("quote_fetch").await;
                    }
                    Err(_) => {
                        debug!("Quote fetch timed out for {} {}", venue, pair);
                        self.count_error("quote_timeout").await;
                    }
                }
            }
        }

        snapshot
    }

    async fn count_error(&self, kind: &str) {
        *self
            .metrics
            .write()
            .await
            .error_counts
            .entry(kind.to_string())
            .or_insert(0) += 1;
    }

    // --- operator surface -------------------------------------------------

    pub async fn metrics(&self) -> EngineMetrics {
        let metrics = self.metrics.read().await;
        EngineMetrics {
            opportunities_found: metrics.opportunities_found,
            trades_executed: metrics.trades_executed,
            successful_trades: metrics.successful_trades,
            total_profit_usd: metrics.total_profit_usd,
            average_execution_time_ms: if metrics.trades_executed > 0 {
                metrics.total_execution_time_ms / metrics.trades_executed
            } else {
                0
            },
            active_opportunities: self.dispatcher.in_flight_count().await,
        }
    }

    pub async fn error_counts(&self) -> HashMap<String, u32> {
        self.metrics.read().await.error_counts.clone()
    }

    pub async fn risk_state(&self) -> RiskSnapshot {
        self.gate.snapshot().await
    }

    pub async fn pause_trading(&self) {
        self.gate.pause_trading().await;
    }

    pub async fn resume_trading(&self) {
        self.gate.resume_trading().await;
    }

    pub async fn health(&self) -> HealthStatus {
        let risk = self.gate.snapshot().await;
        let last_snapshot_at = *self.last_snapshot_at.read().await;
        HealthStatus {
            price_feed_fresh: last_snapshot_at
                .map(|t| t.elapsed().as_secs() < STALENESS_HEALTH_SECS)
                .unwrap_or(false),
            last_snapshot_at,
            consecutive_failures: risk.consecutive_failures,
            circuit_breaker_open: risk.circuit_breaker_open,
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }
}
