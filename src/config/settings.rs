//! Engine configuration settings and environment variable handling

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::env;
use std::str::FromStr;
use crate::errors::{EngineError, EngineResult};
use crate::types::TokenPair;

// Configuration bounds
pub const MIN_SPREAD_FLOOR_PCT: Decimal = dec!(0.05);
pub const MAX_SPREAD_CEILING_PCT: Decimal = dec!(10);
pub const MIN_PROFIT_FLOOR_USD: Decimal = dec!(0.10);
pub const MAX_TRANSACTION_CEILING_USD: Decimal = dec!(100000);
pub const PRICE_STALENESS_SECONDS: i64 = 10;

// Cost model constants
pub const CROSS_DEX_SWAP_GAS_LIMIT: u64 = 400_000;
pub const DEFAULT_GAS_PRICE_GWEI: u64 = 30;
pub const MAX_GAS_PRICE_GWEI: u64 = 500;
pub const GAS_BUFFER_MULTIPLIER: Decimal = dec!(1.2);
/// Conservative (high) native-asset price used when the reference feed is
/// down, so gas cost is over- rather than under-estimated.
pub const FALLBACK_NATIVE_PRICE_USD: Decimal = dec!(4000);
pub const DEFAULT_VENUE_FEE_RATE: Decimal = dec!(0.003);

#[derive(Debug, Clone)]
pub struct Config {
    // Cycle driver
    pub cycle_interval_ms: u64,
    pub price_fetch_timeout_secs: u64,
    // Detection
    pub min_spread_percent: Decimal,
    pub max_transaction_value_usd: Decimal,
    pub monitored_venues: Vec<String>,
    pub monitored_pairs: Vec<TokenPair>,
    // Estimation
    pub min_profit_usd: Decimal,
    pub gas_limit_per_trade: u64,
    pub fallback_slippage_percent: Decimal,
    pub venue_fee_rates: HashMap<String, Decimal>,
    // Risk limits
    pub max_slippage_percent: Decimal,
    pub min_liquidity_usd: Decimal,
    pub liquidity_utilization_cap: Decimal,
    pub max_consecutive_failures: u32,
    pub circuit_breaker_timeout_ms: u64,
    pub max_daily_loss_usd: Decimal,
    pub blacklisted_tokens: HashSet<String>,
    // Dispatch
    pub settlement_timeout_secs: u64,
    pub settlement_deadline_secs: u64,
    pub opportunity_timeout_ms: i64,
    // Collaborator endpoints
    pub quote_api_url: String,
    pub executor_api_url: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            cycle_interval_ms: env::var("CYCLE_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000)
                .max(100),
            price_fetch_timeout_secs: env::var("PRICE_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            min_spread_percent: env::var("MIN_SPREAD_PERCENT")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(0.5))
                .max(MIN_SPREAD_FLOOR_PCT)
                .min(MAX_SPREAD_CEILING_PCT),
            max_transaction_value_usd: env::var("MAX_TRANSACTION_VALUE_USD")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(5000))
                .min(MAX_TRANSACTION_CEILING_USD),
            monitored_venues: parse_list(
                env::var("MONITORED_VENUES").ok(),
                &["uniswap", "sushiswap", "pancakeswap"],
            ),
            monitored_pairs: parse_pairs(
                env::var("MONITORED_PAIRS").ok(),
                &["WETH/USDC", "WBTC/USDC"],
            ),
            min_profit_usd: env::var("MIN_PROFIT_USD")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(10))
                .max(MIN_PROFIT_FLOOR_USD),
            gas_limit_per_trade: env::var("GAS_LIMIT_PER_TRADE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(CROSS_DEX_SWAP_GAS_LIMIT),
            fallback_slippage_percent: env::var("FALLBACK_SLIPPAGE_PERCENT")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(0.5)),
            venue_fee_rates: default_fee_rates(),
            max_slippage_percent: env::var("MAX_SLIPPAGE_PERCENT")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(1)),
            min_liquidity_usd: env::var("MIN_LIQUIDITY_USD")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(50000)),
            liquidity_utilization_cap: env::var("LIQUIDITY_UTILIZATION_CAP")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(0.1)),
            max_consecutive_failures: env::var("MAX_CONSECUTIVE_FAILURES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5)
                .max(1),
            circuit_breaker_timeout_ms: env::var("CIRCUIT_BREAKER_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300_000),
            max_daily_loss_usd: env::var("MAX_DAILY_LOSS_USD")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(500)),
            blacklisted_tokens: env::var("BLACKLISTED_TOKENS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|t| t.trim().to_uppercase())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            settlement_timeout_secs: env::var("SETTLEMENT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            settlement_deadline_secs: env::var("SETTLEMENT_DEADLINE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120),
            opportunity_timeout_ms: env::var("OPPORTUNITY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            quote_api_url: env::var("QUOTE_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            executor_api_url: env::var("EXECUTOR_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string()),
        }
    }

    /// Reject configurations the engine cannot meaningfully run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.monitored_venues.len() < 2 {
            return Err(EngineError::Config(format!(
                "need at least two venues to arbitrage, got {:?}",
                self.monitored_venues
            )));
        }
        if self.monitored_pairs.is_empty() {
            return Err(EngineError::Config(
                "no monitored token pairs configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Proportional fee rate for a venue; unknown venues fall back to the
    /// default rate rather than erroring.
    pub fn venue_fee_rate(&self, venue: &str) -> Decimal {
        self.venue_fee_rates
            .get(venue)
            .copied()
            .unwrap_or(DEFAULT_VENUE_FEE_RATE)
    }
}

fn default_fee_rates() -> HashMap<String, Decimal> {
    let mut rates = HashMap::new();
    rates.insert("uniswap".to_string(), dec!(0.003));
    rates.insert("sushiswap".to_string(), dec!(0.003));
    rates.insert("pancakeswap".to_string(), dec!(0.0025));
    rates
}

fn parse_list(raw: Option<String>, defaults: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = raw
        .map(|s| {
            s.split(',')
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if parsed.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}

fn parse_pairs(raw: Option<String>, defaults: &[&str]) -> Vec<TokenPair> {
    let parsed: Vec<TokenPair> = raw
        .map(|s| {
            s.split(',')
                .filter_map(|p| p.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();
    if parsed.is_empty() {
        defaults.iter().filter_map(|p| p.parse().ok()).collect()
    } else {
        parsed
    }
}
