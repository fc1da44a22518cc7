use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Engine-wide usage counters for fan-out and campaign dispatch.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    pub notifications_created: AtomicU64,
    pub notification_failures: AtomicU64,
    pub campaign_sends: AtomicU64,
    pub campaign_failures: AtomicU64,
    pub rate_limit_hits: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_notification_created(&self) {
        self.notifications_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_failure(&self) {
        self.notification_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_campaign_send(&self) {
        self.campaign_sends.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_campaign_failure(&self) {
        self.campaign_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limit_hit(&self) {
        self.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
        warn!("send collaborator reported a rate limit");
    }

    pub fn get_stats(&self) -> EngineStats {
        EngineStats {
            notifications_created: self.notifications_created.load(Ordering::Relaxed),
            notification_failures: self.notification_failures.load(Ordering::Relaxed),
            campaign_sends: self.campaign_sends.load(Ordering::Relaxed),
            campaign_failures: self.campaign_failures.load(Ordering::Relaxed),
            rate_limit_hits: self.rate_limit_hits.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "engine metrics: notifications={}, notification_failures={}, sends={}, send_failures={}, rate_limits={}",
            stats.notifications_created,
            stats.notification_failures,
            stats.campaign_sends,
            stats.campaign_failures,
            stats.rate_limit_hits
        );
    }
}

#[derive(Debug, Clone)]
pub struct EngineStats {
    pub notifications_created: u64,
    pub notification_failures: u64,
    pub campaign_sends: u64,
    pub campaign_failures: u64,
    pub rate_limit_hits: u64,
}

/// Global metrics instance
static ENGINE_METRICS: std::sync::LazyLock<EngineMetrics> =
    std::sync::LazyLock::new(EngineMetrics::new);

pub fn engine_metrics() -> &'static EngineMetrics {
    &ENGINE_METRICS
}

/// Time an operation and log its duration on drop.
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            operation = %self.operation,
            duration_ms = self.elapsed().as_millis() as u64,
            "operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = EngineMetrics::new();
        metrics.record_notification_created();
        metrics.record_notification_created();
        metrics.record_campaign_failure();

        let stats = metrics.get_stats();
        assert_eq!(stats.notifications_created, 2);
        assert_eq!(stats.campaign_failures, 1);
        assert_eq!(stats.campaign_sends, 0);
    }
}
