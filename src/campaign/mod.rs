//! Rate-limited revival campaigns: segment selection feeding a strictly
//! sequential, failure-isolated batch dispatcher.

pub mod dispatcher;
pub mod selector;
pub mod sender;
pub mod types;

pub use dispatcher::{
    cancel_pair, BatchDispatcher, CancelHandle, CancelToken, DispatchReport, DispatcherConfig,
    ItemOutcome,
};
pub use selector::{CampaignSelector, REVIVAL_STATUSES};
pub use sender::{ProspectSender, SendError, SendReceipt};
pub use types::{ContactRecord, ProspectStatus};

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::info;

use crate::config::CampaignConfig;
use crate::error::EngineError;
use crate::observability::OperationTimer;
use crate::store::ContactStore;

/// Wires selector, dispatcher, and the send collaborator together into the
/// operator-facing campaign surface.
pub struct CampaignRunner {
    selector: CampaignSelector,
    dispatcher: BatchDispatcher,
    sender: Arc<dyn ProspectSender>,
    default_staleness: Duration,
}

impl CampaignRunner {
    pub fn new(
        contacts: Arc<dyn ContactStore>,
        sender: Arc<dyn ProspectSender>,
        config: &CampaignConfig,
    ) -> Self {
        let dispatcher_config = DispatcherConfig {
            inter_item_delay: StdDuration::from_millis(config.inter_item_delay_ms),
            per_item_timeout: StdDuration::from_secs(config.send_timeout_seconds),
            max_backoff: StdDuration::from_millis(config.max_backoff_ms),
            sends_per_second: NonZeroU32::new(config.sends_per_second).unwrap_or(NonZeroU32::MIN),
            burst_capacity: NonZeroU32::new(config.burst_capacity).unwrap_or(NonZeroU32::MIN),
        };
        Self {
            selector: CampaignSelector::new(contacts),
            dispatcher: BatchDispatcher::new(dispatcher_config),
            sender,
            default_staleness: config.staleness(),
        }
    }

    /// Dry-run preview: how many contacts the campaign would target.
    pub async fn count_stale_prospects(
        &self,
        staleness: Option<Duration>,
    ) -> Result<usize, EngineError> {
        self.selector
            .count_stale_prospects(staleness.unwrap_or(self.default_staleness))
            .await
    }

    /// Select the stale segment and dispatch one send per contact.
    ///
    /// Re-running resends to any contact whose status was not advanced past
    /// the selection filter by the previous run; the filter, not the
    /// dispatcher, is what makes repeated runs converge.
    pub async fn run_revival_campaign(
        &self,
        staleness: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<DispatchReport, EngineError> {
        let _timer = OperationTimer::new("revival_campaign");
        let staleness = staleness.unwrap_or(self.default_staleness);
        let targets = self.selector.select_stale_prospects(staleness).await?;
        info!(targets = targets.len(), "starting revival campaign");

        let sender = Arc::clone(&self.sender);
        let report = self
            .dispatcher
            .run(
                targets,
                move |contact| {
                    let sender = Arc::clone(&sender);
                    async move { sender.send(&contact).await }
                },
                cancel,
            )
            .await;

        info!(
            sent = report.sent,
            failed = report.failed,
            total = report.total,
            "revival campaign finished"
        );
        Ok(report)
    }
}
