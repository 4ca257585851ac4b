//! Opportunity storage

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::info;
use crate::types::Opportunity;

#[derive(Serialize)]
struct OpportunityRecord<'a> {
    status: &'a str,
    #[serde(flatten)]
    opportunity: &'a Opportunity,
}

pub fn save_opportunity(opportunity: &Opportunity, status: &str) -> Result<()> {
    let filename = format!(
        "output/opportunities/opportunities_{}.jsonl",
        Utc::now().format("%Y-%m-%d")
    );

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    let record = OpportunityRecord {
        status,
        opportunity,
    };
    writeln!(file, "{}", serde_json::to_string(&record)?)?;

    info!(
        opportunity_id = %opportunity.id,
        status = %status,
        spread_pct = %opportunity.spread_pct,
        "Saved opportunity"
    );

    Ok(())
}
