//! Data persistence and file operations

pub mod opportunities;
pub mod outcomes;

pub use opportunities::*;
pub use outcomes::*;

use crate::feeds::PersistenceSink;
use crate::types::{Opportunity, TradeOutcome};

/// Daily-rotated JSONL persistence under `output/`.
pub struct JsonlSink;

impl PersistenceSink for JsonlSink {
    fn record_opportunity(&self, opportunity: &Opportunity, status: &str) -> anyhow::Result<()> {
        save_opportunity(opportunity, status)
    }

    fn record_outcome(&self, outcome: &TradeOutcome) -> anyhow::Result<()> {
        save_trade_outcome(outcome)
    }
}
