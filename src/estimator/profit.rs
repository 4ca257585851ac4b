//! Profit breakdown computation

use rust_decimal_macros::dec;
use std::sync::Arc;
use crate::config::Config;
use crate::errors::{EngineError, EngineResult};
use crate::feeds::{GasPriceFeed, ReferencePriceFeed, ReserveFeed};
use crate::types::{Opportunity, ProfitBreakdown};

pub struct ProfitEstimator {
    pub(super) gas_feed: Arc<dyn GasPriceFeed>,
    pub(super) reference_feed: Arc<dyn ReferencePriceFeed>,
    pub(super) reserve_feed: Arc<dyn ReserveFeed>,
}

impl ProfitEstimator {
    pub fn new(
        gas_feed: Arc<dyn GasPriceFeed>,
        reference_feed: Arc<dyn ReferencePriceFeed>,
        reserve_feed: Arc<dyn ReserveFeed>,
    ) -> Self {
        Self {
            gas_feed,
            reference_feed,
            reserve_feed,
        }
    }

    /// Compute the full cost/profit breakdown for a candidate.
    ///
    /// Deterministic for unchanged inputs and feeds. Fails hard only on
    /// malformed input; unavailable cost feeds soft-fail to conservative
    /// fallbacks inside the individual cost models.
    pub async fn estimate(
        &self,
        opportunity: &Opportunity,
        config: &Config,
    ) -> EngineResult<ProfitBreakdown> {
        if opportunity.amount <= dec!(0) {
            return Err(EngineError::EstimationFailure {
                opportunity_id: opportunity.id.clone(),
                reason: format!("non-positive amount {}", opportunity.amount),
            });
        }
        if opportunity.buy_price <= dec!(0) || opportunity.sell_price <= dec!(0) {
            return Err(EngineError::EstimationFailure {
                opportunity_id: opportunity.id.clone(),
                reason: "non-positive leg price".to_string(),
            });
        }

        let gross_profit_usd =
            (opportunity.sell_price - opportunity.buy_price) * opportunity.amount;
        let gas_estimate_usd = self.gas_estimate_usd(config).await;
        let platform_fees_usd = self.platform_fees_usd(opportunity, config);
        let slippage_impact_usd = self.slippage_impact_usd(opportunity, config).await;

        let net_profit_usd =
            gross_profit_usd - gas_estimate_usd - platform_fees_usd - slippage_impact_usd;

        let profit_margin_pct = if net_profit_usd > dec!(0) {
            net_profit_usd / (opportunity.buy_price * opportunity.amount) * dec!(100)
        } else {
            dec!(0)
        };

        Ok(ProfitBreakdown {
            gross_profit_usd,
            gas_estimate_usd,
            platform_fees_usd,
            slippage_impact_usd,
            net_profit_usd,
            profit_margin_pct,
            profitable: net_profit_usd >= config.min_profit_usd,
        })
    }
}
