//! Trade sizing policies

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use crate::types::PriceQuote;

/// Sizing policy for a candidate trade. The detector computes the amount per
/// candidate through this seam so a liquidity-aware policy can replace the
/// default without touching the detection contract.
pub trait SizingPolicy: Send + Sync {
    /// Trade amount in base-token units for the given buy/sell quotes.
    fn size(&self, buy: &PriceQuote, sell: &PriceQuote) -> Decimal;
}

/// Sizes every trade to the configured maximum notional value.
pub struct MaxNotionalSizing {
    pub max_transaction_value_usd: Decimal,
}

impl SizingPolicy for MaxNotionalSizing {
    fn size(&self, buy: &PriceQuote, _sell: &PriceQuote) -> Decimal {
        if buy.price <= dec!(0) {
            return dec!(0);
        }
        self.max_transaction_value_usd / buy.price
    }
}
