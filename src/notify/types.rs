use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    System,
    OnboardingUpdate,
    Success,
}

/// One notification record per recipient, created exclusively by the
/// fan-out; the recipient marking it read is the only later mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub project_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub metadata: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// What happened, before any audience is attached. One event fans out to
/// one record per resolved recipient.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub metadata: serde_json::Value,
}

impl NotificationEvent {
    pub fn new(
        kind: NotificationKind,
        project_id: Option<Uuid>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            project_id,
            title: title.into(),
            body: body.into(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Materialize the record for one recipient.
    pub(crate) fn record_for(&self, recipient_id: Uuid) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient_id,
            project_id: self.project_id,
            kind: self.kind,
            title: self.title.clone(),
            body: self.body.clone(),
            metadata: self.metadata.clone(),
            read: false,
            created_at: Utc::now(),
        }
    }
}
