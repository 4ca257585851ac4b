//! Display and printing utilities

use std::collections::HashMap;
use std::time::Instant;
use tracing::{error, info, warn};
use crate::types::{
    EngineMetrics, Opportunity, OutcomeStatus, ProfitBreakdown, RiskSnapshot, TradeOutcome,
};

pub fn print_opportunity(opportunity: &Opportunity, breakdown: &ProfitBreakdown) {
    warn!("\n🎯 ARBITRAGE OPPORTUNITY {}", opportunity.id);
    warn!("📍 Pair: {}", opportunity.pair);
    warn!(
        "📋 Route: buy on {} @ ${:.4} → sell on {} @ ${:.4}",
        opportunity.buy_venue, opportunity.buy_price,
        opportunity.sell_venue, opportunity.sell_price
    );
    warn!("   Spread: {:.3}% | Amount: {:.6}", opportunity.spread_pct, opportunity.amount);
    warn!("💰 Profit Breakdown:");
    warn!("   Gross:    ${:.2}", breakdown.gross_profit_usd);
    warn!("   Gas:      ${:.2}", breakdown.gas_estimate_usd);
    warn!("   Fees:     ${:.2}", breakdown.platform_fees_usd);
    warn!("   Slippage: ${:.2}", breakdown.slippage_impact_usd);
    warn!("   Net:      ${:.2} ({:.3}% margin)",
        breakdown.net_profit_usd, breakdown.profit_margin_pct);
}

pub fn print_trade_outcome(outcome: &TradeOutcome) {
    match outcome.status {
        OutcomeStatus::Success => {
            warn!("\n✅ TRADE SETTLED {}", outcome.opportunity_id);
            if let Some(handle) = &outcome.settlement_handle {
                warn!("   Handle: {}", handle.0);
            }
            if let Some(profit) = outcome.actual_profit_usd {
                warn!("   Actual Profit: ${:.2}", profit);
            }
            if let Some(gas) = outcome.gas_used {
                warn!("   Gas Used: {}", gas);
            }
            warn!("   Execution Time: {}ms", outcome.execution_time_ms);
        }
        OutcomeStatus::Failed => {
            error!("\n❌ TRADE FAILED {}", outcome.opportunity_id);
            error!(
                "   Error: {}",
                outcome.error_reason.as_deref().unwrap_or("Unknown")
            );
        }
    }
}

pub fn print_session_stats(
    start_time: Instant,
    metrics: &EngineMetrics,
    risk: &RiskSnapshot,
    error_counts: &HashMap<String, u32>,
) {
    let runtime = start_time.elapsed().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   📈 PIPELINE:");
    info!("     Opportunities found: {}", metrics.opportunities_found);
    info!("     Trades executed: {}", metrics.trades_executed);
    info!("     Successful: {}", metrics.successful_trades);
    info!("     Success rate: {:.1}%",
        if metrics.trades_executed > 0 {
            (metrics.successful_trades as f64 / metrics.trades_executed as f64) * 100.0
        } else {
            0.0
        }
    );
    info!("     Total realized profit: ${:.2}", metrics.total_profit_usd);
    info!("     Avg execution time: {}ms", metrics.average_execution_time_ms);
    info!("     In flight: {}", metrics.active_opportunities);

    info!("   ⚙️  RISK:");
    info!("     Circuit breaker: {}",
        if risk.circuit_breaker_open { "OPEN" } else { "CLOSED" }
    );
    info!("     Consecutive failures: {}", risk.consecutive_failures);
    info!("     Daily loss: ${:.2}", risk.daily_loss_usd);
    if risk.manually_paused {
        info!("     ⏸️  Trading manually paused");
    }

    if !error_counts.is_empty() {
        info!("     Error summary:");
        for (error_type, count) in error_counts.iter() {
            info!("       {}: {}", error_type, count);
        }
    }

    info!("");
}
