//! Pairwise cross-venue spread scan

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use tracing::{debug, warn};
use crate::config::PRICE_STALENESS_SECONDS;
use crate::detector::sizing::SizingPolicy;
use crate::types::{Opportunity, PriceQuote, PriceSnapshot, TokenPair};

pub struct Detector {
    pub min_spread_percent: Decimal,
    pub sizing: Box<dyn SizingPolicy>,
}

impl Detector {
    /// Scan one price snapshot for candidate cross-venue trades.
    ///
    /// Pure function of its input: no side effects, state is cycle-local.
    /// For each monitored pair and each unordered venue combination both
    /// directions are evaluated; a candidate is emitted only when the
    /// relative spread exceeds the configured minimum. Missing, stale or
    /// malformed quotes skip the combination, never the cycle.
    pub fn scan(
        &self,
        snapshot: &PriceSnapshot,
        monitored_pairs: &[TokenPair],
        in_flight: &HashSet<String>,
        cycle_ts: DateTime<Utc>,
    ) -> Vec<Opportunity> {
        let mut venues: Vec<&String> = snapshot.keys().collect();
        venues.sort();

        let mut candidates = Vec::new();

        for pair in monitored_pairs {
            for i in 0..venues.len() {
                for j in (i + 1)..venues.len() {
                    let (Some(quote_i), Some(quote_j)) = (
                        self.usable_quote(snapshot, venues[i], pair, cycle_ts),
                        self.usable_quote(snapshot, venues[j], pair, cycle_ts),
                    ) else {
                        continue;
                    };

                    for (buy, sell) in [(quote_i, quote_j), (quote_j, quote_i)] {
                        if let Some(opp) = self.evaluate_direction(buy, sell, cycle_ts) {
                            if in_flight.contains(&opp.id) {
                                debug!("Skipping {}: already in flight", opp.id);
                                continue;
                            }
                            candidates.push(opp);
                        }
                    }
                }
            }
        }

        candidates
    }

    fn usable_quote<'a>(
        &self,
        snapshot: &'a PriceSnapshot,
        venue: &str,
        pair: &TokenPair,
        cycle_ts: DateTime<Utc>,
    ) -> Option<&'a PriceQuote> {
        let quote = snapshot.get(venue)?.get(pair)?;

        if quote.price <= dec!(0) {
            warn!(
                "Malformed quote from {} for {}: price {} is not positive, skipping",
                venue, pair, quote.price
            );
            return None;
        }

        let age = (cycle_ts - quote.observed_at).num_seconds();
        if age > PRICE_STALENESS_SECONDS {
            debug!("Stale quote from {} for {} ({}s old), skipping", venue, pair, age);
            return None;
        }

        Some(quote)
    }

    fn evaluate_direction(
        &self,
        buy: &PriceQuote,
        sell: &PriceQuote,
        cycle_ts: DateTime<Utc>,
    ) -> Option<Opportunity> {
        let spread_pct = ((sell.price - buy.price) / buy.price) * dec!(100);
        if spread_pct <= self.min_spread_percent {
            return None;
        }

        let amount = self.sizing.size(buy, sell);
        if amount <= dec!(0) {
            return None;
        }

        Some(Opportunity {
            id: Opportunity::deterministic_id(&buy.pair, &buy.venue, &sell.venue, cycle_ts),
            pair: buy.pair.clone(),
            buy_venue: buy.venue.clone(),
            sell_venue: sell.venue.clone(),
            buy_price: buy.price,
            sell_price: sell.price,
            spread_pct,
            amount,
            created_at: cycle_ts,
            profit: None,
            verdict: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use crate::detector::sizing::MaxNotionalSizing;

    fn detector(min_spread: Decimal) -> Detector {
        Detector {
            min_spread_percent: min_spread,
            sizing: Box::new(MaxNotionalSizing {
                max_transaction_value_usd: dec!(5000),
            }),
        }
    }

    fn pair() -> TokenPair {
        TokenPair::new("WETH", "USDC")
    }

    fn snapshot(prices: &[(&str, Decimal)], observed_at: DateTime<Utc>) -> PriceSnapshot {
        let mut snap: PriceSnapshot = HashMap::new();
        for (venue, price) in prices {
            snap.entry(venue.to_string()).or_default().insert(
                pair(),
                PriceQuote {
                    venue: venue.to_string(),
                    pair: pair(),
                    price: *price,
                    observed_at,
                },
            );
        }
        snap
    }

    #[test]
    fn emits_candidate_above_minimum_spread() {
        let now = Utc::now();
        let snap = snapshot(&[("uniswap", dec!(2000)), ("sushiswap", dec!(2020))], now);
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);

        assert_eq!(candidates.len(), 1);
        let opp = &candidates[0];
        assert_eq!(opp.buy_venue, "uniswap");
        assert_eq!(opp.sell_venue, "sushiswap");
        assert_eq!(opp.spread_pct, dec!(1));
        assert_eq!(opp.notional_usd(), dec!(5000));
    }

    #[test]
    fn sub_threshold_spread_emits_nothing() {
        // buy 2000, sell 2000.5: 0.025% spread, below the 0.5% minimum
        let now = Utc::now();
        let snap = snapshot(&[("uniswap", dec!(2000)), ("sushiswap", dec!(2000.5))], now);
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);
        assert!(candidates.is_empty());
    }

    #[test]
    fn identical_prices_never_emit() {
        let now = Utc::now();
        let snap = snapshot(&[("uniswap", dec!(2000)), ("sushiswap", dec!(2000))], now);
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);
        assert!(candidates.is_empty());
    }

    #[test]
    fn spread_exactly_at_minimum_is_not_emitted() {
        let now = Utc::now();
        let snap = snapshot(&[("uniswap", dec!(2000)), ("sushiswap", dec!(2010))], now);
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);
        assert!(candidates.is_empty());
    }

    #[test]
    fn non_positive_price_is_skipped_not_fatal() {
        let now = Utc::now();
        let snap = snapshot(
            &[
                ("uniswap", dec!(-1)),
                ("sushiswap", dec!(2000)),
                ("pancakeswap", dec!(2100)),
            ],
            now,
        );
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);

        // The malformed venue drops out; the healthy combination survives.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].buy_venue, "sushiswap");
        assert_eq!(candidates[0].sell_venue, "pancakeswap");
    }

    #[test]
    fn stale_quote_is_skipped() {
        let now = Utc::now();
        let stale = now - Duration::seconds(PRICE_STALENESS_SECONDS + 5);
        let mut snap = snapshot(&[("uniswap", dec!(2000))], stale);
        for (venue, quotes) in snapshot(&[("sushiswap", dec!(2100))], now) {
            snap.insert(venue, quotes);
        }
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);
        assert!(candidates.is_empty());
    }

    #[test]
    fn missing_pair_for_a_venue_is_skipped() {
        let now = Utc::now();
        let mut snap = snapshot(&[("uniswap", dec!(2000)), ("sushiswap", dec!(2100))], now);
        snap.insert("pancakeswap".to_string(), HashMap::new());
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn in_flight_candidates_are_skipped() {
        let now = Utc::now();
        let snap = snapshot(&[("uniswap", dec!(2000)), ("sushiswap", dec!(2100))], now);
        let id = Opportunity::deterministic_id(&pair(), "uniswap", "sushiswap", now);
        let in_flight: HashSet<String> = [id].into_iter().collect();
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &in_flight, now);
        assert!(candidates.is_empty());
    }

    #[test]
    fn three_venues_emit_all_profitable_directions() {
        let now = Utc::now();
        let snap = snapshot(
            &[
                ("uniswap", dec!(2000)),
                ("sushiswap", dec!(2050)),
                ("pancakeswap", dec!(2100)),
            ],
            now,
        );
        let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);

        // Three upward spreads: uni->sushi, uni->pancake, sushi->pancake.
        assert_eq!(candidates.len(), 3);
        for opp in &candidates {
            assert!(opp.buy_price < opp.sell_price);
            assert!(opp.spread_pct > dec!(0.5));
        }
    }

    proptest! {
        #[test]
        fn spreads_below_minimum_never_emit(
            buy in 100u32..100_000,
            bump_bps in 0u32..50,
        ) {
            // bump below 0.5% of the buy price keeps the spread sub-threshold
            let now = Utc::now();
            let buy_price = Decimal::from(buy);
            let sell_price = buy_price + buy_price * Decimal::new(bump_bps as i64, 4);
            let snap = snapshot(&[("uniswap", buy_price), ("sushiswap", sell_price)], now);
            let candidates = detector(dec!(0.5)).scan(&snap, &[pair()], &HashSet::new(), now);
            prop_assert!(candidates.is_empty());
        }
    }
}
