// Trait seams for the persistence collaborator - the engine never reaches a
// concrete backend directly, so tests and the CLI inject their own.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::campaign::{ContactRecord, ProspectStatus};
use crate::lifecycle::{Brief, Project};
use crate::notify::Notification;

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert_project(&self, project: Project) -> Result<()>;

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>>;

    /// Replace the stored record wholesale. The engine is the only writer.
    async fn update_project(&self, project: &Project) -> Result<()>;
}

#[async_trait]
pub trait BriefStore: Send + Sync {
    /// Append a new version. Earlier versions are immutable history.
    async fn append_brief(&self, brief: Brief) -> Result<()>;

    /// The highest-version brief for a project, i.e. the only one whose
    /// status may still change.
    async fn latest_brief(&self, project_id: Uuid) -> Result<Option<Brief>>;

    /// Update the brief identified by `(project_id, version)`. Callers only
    /// ever pass the latest version.
    async fn update_brief(&self, brief: &Brief) -> Result<()>;

    /// Full version history, ascending.
    async fn briefs_for_project(&self, project_id: Uuid) -> Result<Vec<Brief>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: Notification) -> Result<()>;

    async fn notifications_for(&self, recipient_id: Uuid) -> Result<Vec<Notification>>;

    /// Recipient-owned mutation; the only write besides creation.
    async fn mark_read(&self, notification_id: Uuid, recipient_id: Uuid) -> Result<()>;

    /// Count of `read == false` rows, kept consistent with the rows
    /// themselves rather than stored separately.
    async fn unread_count(&self, recipient_id: Uuid) -> Result<usize>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn get_contact(&self, id: Uuid) -> Result<Option<ContactRecord>>;

    /// All staff contacts, re-queried at every call so membership changes
    /// between events are always reflected.
    async fn staff_contacts(&self) -> Result<Vec<ContactRecord>>;

    /// Contacts in one of `statuses` created strictly before the cutoff.
    /// A record created exactly at the cutoff is excluded.
    async fn contacts_by_status_created_before(
        &self,
        statuses: &[ProspectStatus],
        created_before: DateTime<Utc>,
    ) -> Result<Vec<ContactRecord>>;
}
