//! HTTP implementations of the collaborator contracts

use async_trait::async_trait;
use anyhow::Context;
use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use crate::errors::{EngineError, EngineResult};
use crate::feeds::retry::{retry_with_backoff, RetryConfig};
use crate::feeds::traits::{
    GasPriceFeed, PriceSource, ReferencePriceFeed, ReserveFeed, SettlementBoundary,
};
use crate::types::{PriceQuote, SettlementHandle, SettlementReceipt, TokenPair, TradePath};

const SETTLEMENT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Price/gas/reserve feed adapter backed by a DEX quote-aggregator API.
pub struct HttpQuoteApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuoteApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Network {
                message: "Failed to build HTTP client".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: String, context: &str) -> EngineResult<serde_json::Value> {
        let operation = || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .context("HTTP request failed")?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(anyhow::anyhow!("Quote API error: {} - {}", status, body));
                }

                response
                    .json::<serde_json::Value>()
                    .await
                    .context("Failed to parse JSON response")
            }
        };

        retry_with_backoff(operation, &RetryConfig::quick(), context).await
    }
}

fn decimal_field(json: &serde_json::Value, field: &str, context: &str) -> EngineResult<Decimal> {
    let raw = match &json[field] {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => {
            return Err(EngineError::DataParsing {
                context: format!("{}: missing '{}' field", context, field),
                source: anyhow::anyhow!("field absent or wrong type"),
            });
        }
    };
    Decimal::from_str(&raw).map_err(|e| EngineError::DataParsing {
        context: format!("{}: invalid '{}' value '{}'", context, field, raw),
        source: e.into(),
    })
}

#[async_trait]
impl PriceSource for HttpQuoteApi {
    async fn fetch(&self, venue: &str, pair: &TokenPair) -> EngineResult<PriceQuote> {
        let url = format!(
            "{}/quote?venue={}&base={}&quote={}",
            self.base_url, venue, pair.base, pair.quote
        );
        let json = self
            .get_json(url, &format!("{} {} quote", venue, pair))
            .await
            .map_err(|e| EngineError::QuoteUnavailable {
                venue: venue.to_string(),
                pair: pair.clone(),
                source: Some(e.into()),
            })?;

        let price = decimal_field(&json, "price", "price quote")?;
        if price <= dec!(0) {
            warn!("Invalid price from {} for {}: {}", venue, pair, price);
            return Err(EngineError::PriceValidation {
                venue: venue.to_string(),
                price,
                reason: "Price is zero or negative".to_string(),
            });
        }

        Ok(PriceQuote {
            venue: venue.to_string(),
            pair: pair.clone(),
            price,
            observed_at: Utc::now(),
        })
    }
}

#[async_trait]
impl GasPriceFeed for HttpQuoteApi {
    async fn current_gas_price_gwei(&self) -> EngineResult<u64> {
        let url = format!("{}/gas", self.base_url);
        let json = self.get_json(url, "gas price").await?;
        json["gwei"].as_u64().ok_or_else(|| EngineError::DataParsing {
            context: "gas price: missing 'gwei' field".to_string(),
            source: anyhow::anyhow!("field absent or wrong type"),
        })
    }
}

#[async_trait]
impl ReferencePriceFeed for HttpQuoteApi {
    async fn native_price_usd(&self) -> EngineResult<Decimal> {
        let url = format!("{}/native-price", self.base_url);
        let json = self.get_json(url, "native price").await?;
        let price = decimal_field(&json, "usd", "native price")?;
        if price <= dec!(0) {
            return Err(EngineError::PriceValidation {
                venue: "reference-feed".to_string(),
                price,
                reason: "Native asset price is zero or negative".to_string(),
            });
        }
        Ok(price)
    }
}

#[async_trait]
impl ReserveFeed for HttpQuoteApi {
    async fn reserves(&self, venue: &str, pair: &TokenPair) -> EngineResult<(Decimal, Decimal)> {
        let url = format!(
            "{}/reserves?venue={}&base={}&quote={}",
            self.base_url, venue, pair.base, pair.quote
        );
        let json = self
            .get_json(url, &format!("{} {} reserves", venue, pair))
            .await?;
        let reserve_in = decimal_field(&json, "reserve_in", "reserves")?;
        let reserve_out = decimal_field(&json, "reserve_out", "reserves")?;
        Ok((reserve_in, reserve_out))
    }
}

/// Settlement boundary reached over the executor service's HTTP API.
pub struct HttpSettlementClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSettlementClient {
    pub fn new(base_url: impl Into<String>) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EngineError::Network {
                message: "Failed to build HTTP client".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SettlementBoundary for HttpSettlementClient {
    async fn submit(&self, path: &TradePath) -> EngineResult<SettlementHandle> {
        let url = format!("{}/execute", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(path)
            .send()
            .await
            .map_err(|e| EngineError::Network {
                message: "Settlement submission failed".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::SettlementRejected {
                opportunity_id: path.opportunity_id.clone(),
                reason: format!("{} - {}", status, body),
            });
        }

        let json: serde_json::Value =
            response.json().await.map_err(|e| EngineError::DataParsing {
                context: "settlement submission response".to_string(),
                source: e.into(),
            })?;
        let handle = json["handle"]
            .as_str()
            .ok_or_else(|| EngineError::DataParsing {
                context: "settlement submission: missing 'handle'".to_string(),
                source: anyhow::anyhow!("field absent"),
            })?;

        debug!("Submitted {} to settlement, handle {}", path.opportunity_id, handle);
        Ok(SettlementHandle(handle.to_string()))
    }

    async fn await_confirmation(
        &self,
        handle: &SettlementHandle,
        timeout: Duration,
    ) -> EngineResult<SettlementReceipt> {
        let started = Instant::now();
        let url = format!("{}/status/{}", self.base_url, handle.0);

        loop {
            let json = match self.client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    resp.json::<serde_json::Value>().await.ok()
                }
                _ => None,
            };

            if let Some(json) = json {
                match json["status"].as_str() {
                    Some("success") | Some("failed") => {
                        let success = json["status"] == "success";
                        let amounts_out = json["amounts_out"]
                            .as_array()
                            .map(|arr| {
                                arr.iter()
                                    .filter_map(|v| {
                                        v.as_str().and_then(|s| Decimal::from_str(s).ok())
                                    })
                                    .collect()
                            })
                            .unwrap_or_default();
                        let execution_cost_usd =
                            decimal_field(&json, "execution_cost_usd", "settlement status")
                                .unwrap_or_default();
                        return Ok(SettlementReceipt {
                            handle: handle.clone(),
                            success,
                            amounts_out,
                            execution_cost_usd,
                            gas_used: json["gas_used"].as_u64(),
                            error_reason: json["error"].as_str().map(String::from),
                        });
                    }
                    _ => {}
                }
            }

            let elapsed = started.elapsed();
            if elapsed + SETTLEMENT_POLL_INTERVAL > timeout {
                return Err(EngineError::SettlementTimeout {
                    opportunity_id: handle.0.clone(),
                    elapsed,
                });
            }
            tokio::time::sleep(SETTLEMENT_POLL_INTERVAL).await;
        }
    }
}
