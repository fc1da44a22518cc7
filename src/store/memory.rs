// In-memory store backing the test suite and the CLI snapshot runner.
// Persistence technology proper is a collaborator concern, not ours.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::campaign::{ContactRecord, ProspectStatus};
use crate::lifecycle::{Brief, Project};
use crate::notify::Notification;
use crate::store::traits::{BriefStore, ContactStore, NotificationStore, ProjectStore};

#[derive(Default)]
pub struct MemoryStore {
    projects: Mutex<HashMap<Uuid, Project>>,
    /// Per-project version history, ascending.
    briefs: Mutex<HashMap<Uuid, Vec<Brief>>>,
    notifications: Mutex<Vec<Notification>>,
    contacts: Mutex<HashMap<Uuid, ContactRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a contact record. Contacts are collaborator-owned data, so this
    /// is a loader helper rather than part of the store traits.
    pub async fn add_contact(&self, contact: ContactRecord) {
        self.contacts.lock().await.insert(contact.id, contact);
    }

    pub async fn contact_count(&self) -> usize {
        self.contacts.lock().await.len()
    }

    pub async fn notification_count(&self) -> usize {
        self.notifications.lock().await.len()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn insert_project(&self, project: Project) -> Result<()> {
        self.projects.lock().await.insert(project.id, project);
        Ok(())
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        Ok(self.projects.lock().await.get(&id).cloned())
    }

    async fn update_project(&self, project: &Project) -> Result<()> {
        let mut projects = self.projects.lock().await;
        match projects.get_mut(&project.id) {
            Some(existing) => {
                *existing = project.clone();
                Ok(())
            }
            None => Err(anyhow!("project {} not stored", project.id)),
        }
    }
}

#[async_trait]
impl BriefStore for MemoryStore {
    async fn append_brief(&self, brief: Brief) -> Result<()> {
        let mut briefs = self.briefs.lock().await;
        let history = briefs.entry(brief.project_id).or_default();
        if let Some(last) = history.last() {
            if brief.version <= last.version {
                return Err(anyhow!(
                    "brief version {} for project {} is not past {}",
                    brief.version,
                    brief.project_id,
                    last.version
                ));
            }
        }
        history.push(brief);
        Ok(())
    }

    async fn latest_brief(&self, project_id: Uuid) -> Result<Option<Brief>> {
        let briefs = self.briefs.lock().await;
        Ok(briefs
            .get(&project_id)
            .and_then(|history| history.last().cloned()))
    }

    async fn update_brief(&self, brief: &Brief) -> Result<()> {
        let mut briefs = self.briefs.lock().await;
        let history = briefs
            .get_mut(&brief.project_id)
            .ok_or_else(|| anyhow!("no briefs for project {}", brief.project_id))?;
        let slot = history
            .iter_mut()
            .find(|stored| stored.version == brief.version)
            .ok_or_else(|| {
                anyhow!(
                    "brief v{} for project {} not stored",
                    brief.version,
                    brief.project_id
                )
            })?;
        *slot = brief.clone();
        Ok(())
    }

    async fn briefs_for_project(&self, project_id: Uuid) -> Result<Vec<Brief>> {
        let briefs = self.briefs.lock().await;
        Ok(briefs.get(&project_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: Notification) -> Result<()> {
        self.notifications.lock().await.push(notification);
        Ok(())
    }

    async fn notifications_for(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = self.notifications.lock().await;
        Ok(notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, notification_id: Uuid, recipient_id: Uuid) -> Result<()> {
        let mut notifications = self.notifications.lock().await;
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.recipient_id == recipient_id)
            .ok_or_else(|| anyhow!("notification {notification_id} not found for recipient"))?;
        notification.read = true;
        Ok(())
    }

    async fn unread_count(&self, recipient_id: Uuid) -> Result<usize> {
        let notifications = self.notifications.lock().await;
        Ok(notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .count())
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn get_contact(&self, id: Uuid) -> Result<Option<ContactRecord>> {
        Ok(self.contacts.lock().await.get(&id).cloned())
    }

    async fn staff_contacts(&self) -> Result<Vec<ContactRecord>> {
        let contacts = self.contacts.lock().await;
        Ok(contacts
            .values()
            .filter(|c| c.role == crate::access::Role::Staff)
            .cloned()
            .collect())
    }

    async fn contacts_by_status_created_before(
        &self,
        statuses: &[ProspectStatus],
        created_before: DateTime<Utc>,
    ) -> Result<Vec<ContactRecord>> {
        let contacts = self.contacts.lock().await;
        Ok(contacts
            .values()
            .filter(|c| statuses.contains(&c.prospect_status) && c.created_at < created_before)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use chrono::Duration;

    fn contact(role: Role, status: ProspectStatus, age_days: i64) -> ContactRecord {
        ContactRecord {
            id: Uuid::new_v4(),
            name: "Test Contact".to_string(),
            email: "contact@example.com".to_string(),
            role,
            prospect_status: status,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn brief_history_rejects_stale_versions() {
        let store = MemoryStore::new();
        let project_id = Uuid::new_v4();
        store
            .append_brief(Brief::new(project_id, 1, "v1".to_string()))
            .await
            .unwrap();
        store
            .append_brief(Brief::new(project_id, 2, "v2".to_string()))
            .await
            .unwrap();

        let result = store
            .append_brief(Brief::new(project_id, 2, "dup".to_string()))
            .await;
        assert!(result.is_err());

        let latest = store.latest_brief(project_id).await.unwrap().unwrap();
        assert_eq!(latest.version, 2);
    }

    #[tokio::test]
    async fn unread_count_tracks_rows() {
        let store = MemoryStore::new();
        let recipient = Uuid::new_v4();
        let event = crate::notify::NotificationEvent::new(
            crate::notify::NotificationKind::System,
            None,
            "title",
            "body",
        );
        let first = event.record_for(recipient);
        let first_id = first.id;
        store.insert_notification(first).await.unwrap();
        store
            .insert_notification(event.record_for(recipient))
            .await
            .unwrap();

        assert_eq!(store.unread_count(recipient).await.unwrap(), 2);
        store.mark_read(first_id, recipient).await.unwrap();
        assert_eq!(store.unread_count(recipient).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn created_before_filter_is_strict() {
        let store = MemoryStore::new();
        let cutoff = Utc::now();
        let mut boundary = contact(Role::Prospect, ProspectStatus::New, 0);
        boundary.created_at = cutoff;
        let older = contact(Role::Prospect, ProspectStatus::New, 10);
        let older_id = older.id;
        store.add_contact(boundary).await;
        store.add_contact(older).await;

        let matched = store
            .contacts_by_status_created_before(&[ProspectStatus::New], cutoff)
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, older_id);
    }
}
