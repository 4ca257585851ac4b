//! Cross-DEX Arbitrage Engine - Main Entry Point

use cross_arb_engine::*;
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{error, info};
use cross_arb_engine::detector::{Detector, MaxNotionalSizing};
use cross_arb_engine::dispatch::Dispatcher;
use cross_arb_engine::engine::ArbEngine;
use cross_arb_engine::estimator::ProfitEstimator;
use cross_arb_engine::feeds::{HttpQuoteApi, HttpSettlementClient};
use cross_arb_engine::risk::{RiskGate, RiskLimits};
use cross_arb_engine::storage::JsonlSink;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories()?;

    // Load configuration
    let config = CONFIG.clone();

    info!("⚖️  Cross-DEX Arbitrage Engine v0.5.0");
    info!("📋 Configuration:");
    info!("   Venues: {:?}", config.monitored_venues);
    info!(
        "   Pairs: {:?}",
        config.monitored_pairs.iter().map(|p| p.to_string()).collect::<Vec<_>>()
    );
    info!("   Cycle Interval: {}ms", config.cycle_interval_ms);
    info!("   Min Spread: {}%", config.min_spread_percent);
    info!("   Min Profit: ${}", config.min_profit_usd);
    info!("   Max Transaction: ${}", config.max_transaction_value_usd);
    info!("   Max Daily Loss: ${}", config.max_daily_loss_usd);
    info!("   Circuit Breaker: {} failures / {}ms cooldown",
        config.max_consecutive_failures, config.circuit_breaker_timeout_ms);
    info!("   Settlement Timeout: {}s", config.settlement_timeout_secs);

    // Validate configuration
    config.validate()?;

    // Wire collaborators
    let quote_api = Arc::new(HttpQuoteApi::new(
        &config.quote_api_url,
        Duration::from_secs(config.price_fetch_timeout_secs),
    )?);
    let settlement = Arc::new(HttpSettlementClient::new(&config.executor_api_url)?);
    let sink = Arc::new(JsonlSink);

    let detector = Detector {
        min_spread_percent: config.min_spread_percent,
        sizing: Box::new(MaxNotionalSizing {
            max_transaction_value_usd: config.max_transaction_value_usd,
        }),
    };
    let estimator = ProfitEstimator::new(quote_api.clone(), quote_api.clone(), quote_api.clone());
    let gate = Arc::new(RiskGate::new(RiskLimits::from(&config)));
    let dispatcher = Dispatcher::new(
        settlement,
        sink.clone(),
        Duration::from_secs(config.settlement_timeout_secs),
        Duration::from_secs(config.settlement_deadline_secs),
    );

    let engine = ArbEngine::new(
        config.clone(),
        quote_api,
        detector,
        estimator,
        gate,
        dispatcher,
        sink,
    );

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    let shutdown_tx = Arc::new(tokio::sync::Mutex::new(Some(shutdown_tx)));

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        if let Some(tx) = shutdown_tx.lock().await.take() {
            let _ = tx.send(());
        }
    });

    info!("\n🚀 Starting detection loop...\n");

    let start_time = Instant::now();
    let mut interval = time::interval(Duration::from_millis(config.cycle_interval_ms));
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    let mut cycles: u64 = 0;

    // Main driver loop. Non-reentrant: the next tick is not consumed until
    // the previous cycle has fully drained.
    loop {
        tokio::select! {
            _ = interval.tick() => {
                cycles += 1;
                if let Err(e) = engine.run_cycle().await {
                    // Driver-level failure: flush logs and stop.
                    error!("Fatal driver error: {}", e);
                    break;
                }

                if cycles % 60 == 0 {
                    let metrics = engine.metrics().await;
                    let risk = engine.risk_state().await;
                    let errors = engine.error_counts().await;
                    utils::print_session_stats(start_time, &metrics, &risk, &errors);
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting main loop...");
                break;
            }
        }
    }

    // In-flight dispatches have completed or timed out inside run_cycle;
    // nothing is silently abandoned past this point.
    let metrics = engine.metrics().await;
    let risk = engine.risk_state().await;
    info!("\n🛑 Shutting down gracefully...");
    info!("Final statistics:");
    info!("   Total runtime: {:?}", start_time.elapsed());
    info!("   Cycles run: {}", cycles);
    info!("   Opportunities found: {}", metrics.opportunities_found);
    info!("   Trades executed: {}", metrics.trades_executed);
    info!("   Successful trades: {}", metrics.successful_trades);
    info!("   Total realized profit: ${:.2}", metrics.total_profit_usd);
    info!("   Daily loss at shutdown: ${:.2}", risk.daily_loss_usd);

    Ok(())
}
