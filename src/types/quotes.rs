//! Venue price quote types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A monitored token pair, e.g. WETH/USDC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    pub base: String,
    pub quote: String,
}

impl TokenPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for TokenPair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once('/')
            .ok_or_else(|| anyhow::anyhow!("Invalid token pair (expected BASE/QUOTE): {}", s))?;
        if base.is_empty() || quote.is_empty() {
            return Err(anyhow::anyhow!("Empty token symbol in pair: {}", s));
        }
        Ok(Self::new(base, quote))
    }
}

/// Immutable per-venue price snapshot, consumed once per detection cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub venue: String,
    pub pair: TokenPair,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Venue name -> pair -> quote, assembled once per cycle.
pub type PriceSnapshot = HashMap<String, HashMap<TokenPair, PriceQuote>>;
