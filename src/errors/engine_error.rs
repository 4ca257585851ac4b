//! Custom error types for the engine

use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;
use crate::types::TokenPair;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Quote unavailable: {venue} {pair}")]
    QuoteUnavailable {
        venue: String,
        pair: TokenPair,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Price validation failed: {venue} price ${price} is invalid - {reason}")]
    PriceValidation {
        venue: String,
        price: Decimal,
        reason: String,
    },

    #[error("Profit estimation failed for {opportunity_id}: {reason}")]
    EstimationFailure {
        opportunity_id: String,
        reason: String,
    },

    #[error("Settlement timed out after {elapsed:?} (opportunity {opportunity_id})")]
    SettlementTimeout {
        opportunity_id: String,
        elapsed: Duration,
    },

    #[error("Settlement rejected (opportunity {opportunity_id}): {reason}")]
    SettlementRejected {
        opportunity_id: String,
        reason: String,
    },

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
