// Rate-limited batch runner. Strictly sequential: the send collaborator has
// a hard 2 req/s ceiling, so items are dispatched by a single logical worker
// with a fixed delay floor between them. One item's failure never aborts the
// batch.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use rand::Rng;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::campaign::sender::{SendError, SendReceipt};
use crate::observability::engine_metrics;

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Slept before every item except the first. 600ms keeps a sequential
    /// run at ~1.67 req/s, under the 2 req/s provider ceiling.
    pub inter_item_delay: Duration,
    /// Each send carries its own timeout; a timed-out item is a failure
    /// like any other.
    pub per_item_timeout: Duration,
    /// Cap for the rate-limit backoff ramp.
    pub max_backoff: Duration,
    pub sends_per_second: NonZeroU32,
    pub burst_capacity: NonZeroU32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            inter_item_delay: Duration::from_millis(600),
            per_item_timeout: Duration::from_secs(10),
            max_backoff: Duration::from_secs(30),
            sends_per_second: NonZeroU32::MIN.saturating_add(1),
            burst_capacity: NonZeroU32::MIN.saturating_add(1),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Delivered { index: usize, receipt: SendReceipt },
    Failed { index: usize, reason: String },
}

/// Aggregate result of one batch run. The per-item log is retained for
/// observability; `sent`/`failed`/`total` are the minimal contract.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
    pub cancelled: bool,
    pub outcomes: Vec<ItemOutcome>,
}

/// Cooperative cancellation: flips a watch flag the dispatcher checks
/// before each item, so a run stops between items, never mid-item.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// A token that never fires, for callers without a cancel path.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

pub struct BatchDispatcher {
    config: DispatcherConfig,
    limiter: DefaultDirectRateLimiter,
}

impl BatchDispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        let quota =
            Quota::per_second(config.sends_per_second).allow_burst(config.burst_capacity);
        Self {
            config,
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Dispatch every item through `send_one`, strictly in order.
    ///
    /// Failure semantics are partial, not all-or-nothing: an `Err`, a
    /// timeout, or a panic-free rejection is counted against that item and
    /// the loop moves on. Re-running the same batch is the caller's concern;
    /// the dispatcher itself guarantees nothing about idempotence.
    pub async fn run<T, F, Fut>(
        &self,
        items: Vec<T>,
        mut send_one: F,
        cancel: &CancelToken,
    ) -> DispatchReport
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<SendReceipt, SendError>>,
    {
        let total = items.len();
        let mut report = DispatchReport {
            total,
            ..DispatchReport::default()
        };
        let mut consecutive_rate_limits: u32 = 0;

        for (index, item) in items.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!(
                    dispatched = index,
                    total, "batch run cancelled before next item"
                );
                report.cancelled = true;
                break;
            }

            if index > 0 {
                sleep(self.pacing_delay(consecutive_rate_limits)).await;
            }
            self.limiter
                .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
                .await;

            let outcome = match timeout(self.config.per_item_timeout, send_one(item)).await {
                Ok(Ok(receipt)) => {
                    report.sent += 1;
                    consecutive_rate_limits = 0;
                    engine_metrics().record_campaign_send();
                    debug!(index, message_id = %receipt.message_id, "item sent");
                    ItemOutcome::Delivered { index, receipt }
                }
                Ok(Err(error)) => {
                    report.failed += 1;
                    engine_metrics().record_campaign_failure();
                    if error.is_rate_limited() {
                        consecutive_rate_limits += 1;
                        engine_metrics().record_rate_limit_hit();
                    }
                    warn!(index, error = %error, "item send failed, continuing");
                    ItemOutcome::Failed {
                        index,
                        reason: error.to_string(),
                    }
                }
                Err(_) => {
                    report.failed += 1;
                    engine_metrics().record_campaign_failure();
                    warn!(
                        index,
                        timeout_ms = self.config.per_item_timeout.as_millis() as u64,
                        "item send timed out, continuing"
                    );
                    ItemOutcome::Failed {
                        index,
                        reason: format!(
                            "timed out after {}ms",
                            self.config.per_item_timeout.as_millis()
                        ),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            total = report.total,
            cancelled = report.cancelled,
            "batch run finished"
        );
        report
    }

    /// The fixed delay is the floor; after rate-limited failures it ramps
    /// exponentially (with jitter) up to the configured cap.
    fn pacing_delay(&self, consecutive_rate_limits: u32) -> Duration {
        if consecutive_rate_limits == 0 {
            return self.config.inter_item_delay;
        }
        let exponent = consecutive_rate_limits.min(5);
        let backoff = self.config.inter_item_delay * 2u32.pow(exponent);
        let jitter = Duration::from_millis(rand::rng().random_range(0..100));
        backoff.min(self.config.max_backoff) + jitter
    }
}
