//! Trade outcome storage

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::info;
use crate::types::TradeOutcome;

pub fn save_trade_outcome(outcome: &TradeOutcome) -> Result<()> {
    let filename = format!(
        "output/outcomes/trades_{}.jsonl",
        Utc::now().format("%Y-%m-%d")
    );

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(outcome)?)?;

    info!(
        opportunity_id = %outcome.opportunity_id,
        status = ?outcome.status,
        actual_profit = ?outcome.actual_profit_usd,
        "Saved trade outcome"
    );

    Ok(())
}
