//! Collaborator contracts consumed by the core pipeline.
//!
//! Everything the engine needs from the outside world comes through these
//! traits, which keeps the detection/estimation/risk/dispatch pipeline fully
//! mockable.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use crate::errors::EngineResult;
use crate::types::{
    Opportunity, PriceQuote, SettlementHandle, SettlementReceipt, TokenPair, TradeOutcome,
    TradePath,
};

/// Per-venue, per-pair price quotes. Latency-bounded by the caller.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, venue: &str, pair: &TokenPair) -> EngineResult<PriceQuote>;
}

/// Current gas price in gwei.
#[async_trait]
pub trait GasPriceFeed: Send + Sync {
    async fn current_gas_price_gwei(&self) -> EngineResult<u64>;
}

/// Reference-asset (native token) USD price, used for gas-cost conversion.
#[async_trait]
pub trait ReferencePriceFeed: Send + Sync {
    async fn native_price_usd(&self) -> EngineResult<Decimal>;
}

/// Reserve depth for a venue's pool, as (reserve_in, reserve_out) in the
/// trade direction.
#[async_trait]
pub trait ReserveFeed: Send + Sync {
    async fn reserves(&self, venue: &str, pair: &TokenPair) -> EngineResult<(Decimal, Decimal)>;
}

/// The external system that actually executes token swaps.
#[async_trait]
pub trait SettlementBoundary: Send + Sync {
    async fn submit(&self, path: &TradePath) -> EngineResult<SettlementHandle>;

    /// Await confirmation for a submitted path, bounded by `timeout`.
    /// Implementations must return `SettlementTimeout` rather than hang.
    async fn await_confirmation(
        &self,
        handle: &SettlementHandle,
        timeout: Duration,
    ) -> EngineResult<SettlementReceipt>;
}

/// Fire-and-forget persistence. Failures are logged by callers, never allowed
/// to block the pipeline.
pub trait PersistenceSink: Send + Sync {
    fn record_opportunity(&self, opportunity: &Opportunity, status: &str) -> anyhow::Result<()>;
    fn record_outcome(&self, outcome: &TradeOutcome) -> anyhow::Result<()>;
}
