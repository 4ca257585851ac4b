//! Arbitrage opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use super::{RiskVerdict, TokenPair};

/// A detected candidate cross-venue trade.
///
/// Created by the detector, enriched by the estimator (profit breakdown) and
/// the risk gate (verdict). Lives for at most one cycle unless dispatched.
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub pair: TokenPair,
    pub buy_venue: String,
    pub sell_venue: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub spread_pct: Decimal,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub profit: Option<ProfitBreakdown>,
    pub verdict: Option<RiskVerdict>,
}

impl Opportunity {
    /// Deterministic id: same pair, venues and cycle timestamp always map to
    /// the same id, which is what the in-flight dedup set keys on.
    pub fn deterministic_id(
        pair: &TokenPair,
        buy_venue: &str,
        sell_venue: &str,
        cycle_ts: DateTime<Utc>,
    ) -> String {
        format!(
            "{}:{}>{}@{}",
            pair,
            buy_venue,
            sell_venue,
            cycle_ts.timestamp_millis()
        )
    }

    /// Notional value of the buy leg in USD.
    pub fn notional_usd(&self) -> Decimal {
        self.buy_price * self.amount
    }

    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_milliseconds()
    }
}

/// Itemized cost/profit breakdown attached to an opportunity.
///
/// Every cost term stays individually inspectable for audit logging; the
/// breakdown never collapses to a single opaque number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitBreakdown {
    pub gross_profit_usd: Decimal,
    pub gas_estimate_usd: Decimal,
    pub platform_fees_usd: Decimal,
    pub slippage_impact_usd: Decimal,
    pub net_profit_usd: Decimal,
    pub profit_margin_pct: Decimal,
    pub profitable: bool,
}

impl ProfitBreakdown {
    /// Estimated slippage as a percentage of the buy-leg notional.
    pub fn slippage_pct(&self, notional_usd: Decimal) -> Decimal {
        if notional_usd <= dec!(0) {
            return dec!(0);
        }
        (self.slippage_impact_usd / notional_usd) * dec!(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_deterministic_for_same_cycle() {
        let pair = TokenPair::new("WETH", "USDC");
        let ts = Utc::now();
        let a = Opportunity::deterministic_id(&pair, "uniswap", "sushiswap", ts);
        let b = Opportunity::deterministic_id(&pair, "uniswap", "sushiswap", ts);
        assert_eq!(a, b);

        let reversed = Opportunity::deterministic_id(&pair, "sushiswap", "uniswap", ts);
        assert_ne!(a, reversed);
    }

    #[test]
    fn slippage_pct_guards_zero_notional() {
        let breakdown = ProfitBreakdown {
            gross_profit_usd: dec!(10),
            gas_estimate_usd: dec!(1),
            platform_fees_usd: dec!(2),
            slippage_impact_usd: dec!(5),
            net_profit_usd: dec!(2),
            profit_margin_pct: dec!(0.1),
            profitable: false,
        };
        assert_eq!(breakdown.slippage_pct(dec!(0)), dec!(0));
        assert_eq!(breakdown.slippage_pct(dec!(1000)), dec!(0.5));
    }
}
