//! Health monitoring types

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub price_feed_fresh: bool,
    pub last_snapshot_at: Option<Instant>,
    pub consecutive_failures: u32,
    pub circuit_breaker_open: bool,
    pub uptime_seconds: u64,
}
