//! Per-opportunity validation against static risk limits

use rust_decimal_macros::dec;
use crate::risk::blacklist::blacklisted_token;
use crate::risk::gate::RiskGate;
use crate::types::{Opportunity, ProfitBreakdown, RiskVerdict};

impl RiskGate {
    /// Run every independent check and keep the failing reasons; a single
    /// failing check rejects the whole opportunity.
    pub fn validate_opportunity(
        &self,
        opportunity: &Opportunity,
        breakdown: &ProfitBreakdown,
    ) -> RiskVerdict {
        let mut verdict = RiskVerdict::default();
        let notional = opportunity.notional_usd();

        verdict.profit_check = breakdown.net_profit_usd >= self.limits.min_profit_usd;
        if !verdict.profit_check {
            verdict.warnings.push(format!(
                "Net profit ${} below ${} minimum",
                breakdown.net_profit_usd, self.limits.min_profit_usd
            ));
        }

        let slippage_pct = breakdown.slippage_pct(notional);
        verdict.slippage_check = slippage_pct <= self.limits.max_slippage_percent;
        if !verdict.slippage_check {
            verdict.warnings.push(format!(
                "Estimated slippage {:.3}% exceeds {}% maximum",
                slippage_pct, self.limits.max_slippage_percent
            ));
        }

        verdict.notional_check = notional <= self.limits.max_transaction_value_usd;
        if !verdict.notional_check {
            verdict.warnings.push(format!(
                "Notional ${} exceeds ${} transaction ceiling",
                notional, self.limits.max_transaction_value_usd
            ));
        }

        // Heuristic liquidity gate: never commit more than a fraction of the
        // minimum liquidity we require a pool to hold.
        let liquidity_cap = self.limits.min_liquidity_usd * self.limits.liquidity_utilization_cap;
        verdict.liquidity_check = notional <= liquidity_cap;
        if !verdict.liquidity_check {
            verdict.warnings.push(format!(
                "Notional ${} exceeds ${} liquidity utilization cap",
                notional, liquidity_cap
            ));
        }

        match blacklisted_token(&self.limits.blacklisted_tokens, &opportunity.pair) {
            Some(token) => {
                verdict.token_safety = false;
                verdict
                    .warnings
                    .push(format!("Token {} is blacklisted", token));
            }
            None => verdict.token_safety = true,
        }

        verdict.all_passed = verdict.profit_check
            && verdict.slippage_check
            && verdict.notional_check
            && verdict.liquidity_check
            && verdict.token_safety
            && breakdown.net_profit_usd > dec!(0);

        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::time::Duration;
    use crate::risk::gate::RiskLimits;
    use crate::types::TokenPair;

    fn gate(blacklist: &[&str]) -> RiskGate {
        RiskGate::new(RiskLimits {
            min_profit_usd: dec!(10),
            max_slippage_percent: dec!(1),
            max_transaction_value_usd: dec!(5000),
            min_liquidity_usd: dec!(50000),
            liquidity_utilization_cap: dec!(0.1),
            max_consecutive_failures: 5,
            circuit_breaker_timeout: Duration::from_secs(300),
            max_daily_loss_usd: dec!(500),
            blacklisted_tokens: blacklist.iter().map(|t| t.to_string()).collect::<HashSet<_>>(),
        })
    }

    fn opportunity(pair: TokenPair, buy: Decimal, amount: Decimal) -> Opportunity {
        let now = Utc::now();
        Opportunity {
            id: Opportunity::deterministic_id(&pair, "uniswap", "sushiswap", now),
            pair,
            buy_venue: "uniswap".to_string(),
            sell_venue: "sushiswap".to_string(),
            buy_price: buy,
            sell_price: buy * dec!(1.01),
            spread_pct: dec!(1),
            amount,
            created_at: now,
            profit: None,
            verdict: None,
        }
    }

    fn breakdown(net: Decimal, slippage: Decimal) -> ProfitBreakdown {
        ProfitBreakdown {
            gross_profit_usd: net + dec!(20),
            gas_estimate_usd: dec!(10),
            platform_fees_usd: dec!(8),
            slippage_impact_usd: slippage,
            net_profit_usd: net,
            profit_margin_pct: dec!(1),
            profitable: net >= dec!(10),
        }
    }

    #[test]
    fn passes_when_every_check_passes() {
        let gate = gate(&[]);
        let opp = opportunity(TokenPair::new("WETH", "USDC"), dec!(2000), dec!(1));
        let verdict = gate.validate_opportunity(&opp, &breakdown(dec!(25), dec!(2)));

        assert!(verdict.all_passed);
        assert!(verdict.warnings.is_empty());
    }

    #[test]
    fn rejects_sub_threshold_net_profit() {
        let gate = gate(&[]);
        let opp = opportunity(TokenPair::new("WETH", "USDC"), dec!(2000), dec!(1));
        let verdict = gate.validate_opportunity(&opp, &breakdown(dec!(5), dec!(2)));

        assert!(!verdict.profit_check);
        assert!(!verdict.all_passed);
        assert!(!verdict.warnings.is_empty());
    }

    #[test]
    fn rejects_excessive_slippage() {
        let gate = gate(&[]);
        let opp = opportunity(TokenPair::new("WETH", "USDC"), dec!(2000), dec!(1));
        // $30 slippage on a $2000 notional is 1.5%, above the 1% cap
        let verdict = gate.validate_opportunity(&opp, &breakdown(dec!(25), dec!(30)));

        assert!(!verdict.slippage_check);
        assert!(!verdict.all_passed);
    }

    #[test]
    fn rejects_oversized_notional() {
        let gate = gate(&[]);
        let opp = opportunity(TokenPair::new("WETH", "USDC"), dec!(2000), dec!(3));
        let verdict = gate.validate_opportunity(&opp, &breakdown(dec!(25), dec!(2)));

        assert!(!verdict.notional_check);
        // $6000 also breaches the $5000 liquidity utilization cap
        assert!(!verdict.liquidity_check);
        assert!(!verdict.all_passed);
        assert_eq!(verdict.warnings.len(), 2);
    }

    #[test]
    fn rejects_blacklisted_token_on_either_leg() {
        let gate = gate(&["SCAM"]);
        let opp = opportunity(TokenPair::new("SCAM", "USDC"), dec!(2000), dec!(1));
        let verdict = gate.validate_opportunity(&opp, &breakdown(dec!(25), dec!(2)));

        assert!(!verdict.token_safety);
        assert!(!verdict.all_passed);
    }

    #[test]
    fn failing_reasons_are_retained_for_audit() {
        let gate = gate(&["SCAM"]);
        let opp = opportunity(TokenPair::new("SCAM", "USDC"), dec!(2000), dec!(3));
        let verdict = gate.validate_opportunity(&opp, &breakdown(dec!(5), dec!(100)));

        assert_eq!(verdict.warnings.len(), 5);
    }
}
