// Event fan-out: one notification record per resolved recipient, with
// per-recipient failure isolation. No retry, no cross-recipient ordering.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::notify::audience::AudienceSelector;
use crate::notify::types::NotificationEvent;
use crate::observability::engine_metrics;
use crate::store::{ContactStore, NotificationStore, ProjectStore};

#[derive(Debug, Clone)]
pub struct FanoutFailure {
    pub recipient_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct FanoutReport {
    pub created: usize,
    pub failures: Vec<FanoutFailure>,
}

pub struct NotificationFanout {
    notifications: Arc<dyn NotificationStore>,
    contacts: Arc<dyn ContactStore>,
    projects: Arc<dyn ProjectStore>,
}

impl NotificationFanout {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        contacts: Arc<dyn ContactStore>,
        projects: Arc<dyn ProjectStore>,
    ) -> Self {
        Self {
            notifications,
            contacts,
            projects,
        }
    }

    /// Write one notification per recipient of the resolved audience.
    ///
    /// A failure writing one recipient's record is recorded in the report
    /// and does not stop the remaining recipients. Failing to resolve the
    /// audience at all is a dependency error - there is nobody to isolate.
    pub async fn fanout(
        &self,
        event: NotificationEvent,
        audience: AudienceSelector,
    ) -> Result<FanoutReport, EngineError> {
        let recipients = audience
            .resolve(self.contacts.as_ref(), self.projects.as_ref())
            .await
            .map_err(EngineError::Dependency)?;

        debug!(
            kind = ?event.kind,
            recipients = recipients.len(),
            title = %event.title,
            "fanning out notification event"
        );

        let mut report = FanoutReport::default();
        for recipient_id in recipients {
            let record = event.record_for(recipient_id);
            match self.notifications.insert_notification(record).await {
                Ok(()) => {
                    report.created += 1;
                    engine_metrics().record_notification_created();
                }
                Err(error) => {
                    warn!(
                        recipient_id = %recipient_id,
                        error = %error,
                        "notification write failed, continuing with remaining recipients"
                    );
                    engine_metrics().record_notification_failure();
                    report.failures.push(FanoutFailure {
                        recipient_id,
                        error: error.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}
