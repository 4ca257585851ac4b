//! Cost models: gas, platform fees, slippage impact
//!
//! Every cost term soft-fails to a documented conservative fallback when its
//! upstream feed is unavailable; a single dead feed must not drop every
//! opportunity on the floor.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::warn;
use crate::config::{
    Config, DEFAULT_GAS_PRICE_GWEI, FALLBACK_NATIVE_PRICE_USD, GAS_BUFFER_MULTIPLIER,
    MAX_GAS_PRICE_GWEI,
};
use crate::estimator::profit::ProfitEstimator;
use crate::types::Opportunity;

impl ProfitEstimator {
    /// Gas cost of one cross-DEX trade in USD: gas limit x current gas price
    /// x buffer, converted via the reference-asset feed.
    pub(super) async fn gas_estimate_usd(&self, config: &Config) -> Decimal {
        let gwei = match self.gas_feed.current_gas_price_gwei().await {
            Ok(gwei) => gwei.min(MAX_GAS_PRICE_GWEI),
            Err(e) => {
                warn!("Gas feed unavailable ({}), using {} gwei default", e, DEFAULT_GAS_PRICE_GWEI);
                DEFAULT_GAS_PRICE_GWEI
            }
        };

        let native_usd = match self.reference_feed.native_price_usd().await {
            Ok(price) => price,
            Err(e) => {
                warn!(
                    "Reference price feed unavailable ({}), using ${} fallback",
                    e, FALLBACK_NATIVE_PRICE_USD
                );
                FALLBACK_NATIVE_PRICE_USD
            }
        };

        let gas_native =
            Decimal::from(config.gas_limit_per_trade) * Decimal::from(gwei) / dec!(1_000_000_000);
        gas_native * GAS_BUFFER_MULTIPLIER * native_usd
    }

    /// Proportional venue fees over both legs' notional values.
    pub(super) fn platform_fees_usd(&self, opportunity: &Opportunity, config: &Config) -> Decimal {
        let buy_notional = opportunity.buy_price * opportunity.amount;
        let sell_notional = opportunity.sell_price * opportunity.amount;
        config.venue_fee_rate(&opportunity.buy_venue) * buy_notional
            + config.venue_fee_rate(&opportunity.sell_venue) * sell_notional
    }

    /// Price impact over both legs via the constant-product approximation
    /// `amount_out = a * R_out / (R_in + a)`; the impact is the deviation from
    /// the naive linear price applied to the leg's notional. Unavailable
    /// reserves fall back to the configured fixed slippage percentage.
    pub(super) async fn slippage_impact_usd(
        &self,
        opportunity: &Opportunity,
        config: &Config,
    ) -> Decimal {
        let legs = [
            (&opportunity.buy_venue, opportunity.buy_price * opportunity.amount),
            (&opportunity.sell_venue, opportunity.sell_price * opportunity.amount),
        ];

        let mut total = dec!(0);
        for (venue, notional) in legs {
            total += match self.reserve_feed.reserves(venue, &opportunity.pair).await {
                Ok((reserve_in, reserve_out))
                    if reserve_in > dec!(0) && reserve_out > dec!(0) =>
                {
                    let amount = opportunity.amount;
                    let amount_out = amount * reserve_out / (reserve_in + amount);
                    let linear_out = amount * reserve_out / reserve_in;
                    let impact_fraction = if linear_out > dec!(0) {
                        (linear_out - amount_out) / linear_out
                    } else {
                        dec!(0)
                    };
                    impact_fraction * notional
                }
                Ok((reserve_in, reserve_out)) => {
                    warn!(
                        "Degenerate reserves for {} {} ({}, {}), using fallback slippage",
                        venue, opportunity.pair, reserve_in, reserve_out
                    );
                    config.fallback_slippage_percent / dec!(100) * notional
                }
                Err(e) => {
                    warn!(
                        "Reserve feed unavailable for {} {} ({}), using fallback slippage",
                        venue, opportunity.pair, e
                    );
                    config.fallback_slippage_percent / dec!(100) * notional
                }
            };
        }
        total
    }
}
