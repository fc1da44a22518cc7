//! Notification fan-out tests
//!
//! Audience selectors are resolved at call time, every recipient gets one
//! record, and one recipient's write failure never blocks the rest.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use atelier::{
    AudienceSelector, ContactRecord, EngineError, MemoryStore, Notification, NotificationEvent,
    NotificationFanout, NotificationKind, NotificationStore, ProjectStore, ProspectStatus, Role,
};
use chrono::Utc;
use uuid::Uuid;

fn contact(role: Role) -> ContactRecord {
    ContactRecord {
        id: Uuid::new_v4(),
        name: "Somebody".to_string(),
        email: "somebody@example.com".to_string(),
        role,
        prospect_status: ProspectStatus::Won,
        created_at: Utc::now(),
    }
}

fn system_event() -> NotificationEvent {
    NotificationEvent::new(
        NotificationKind::System,
        None,
        "Modification requested",
        "A project went back to build.",
    )
}

/// Delegates to the in-memory store but refuses writes for one recipient.
struct FlakyNotificationStore {
    inner: MemoryStore,
    poisoned: Uuid,
}

#[async_trait]
impl NotificationStore for FlakyNotificationStore {
    async fn insert_notification(&self, notification: Notification) -> Result<()> {
        if notification.recipient_id == self.poisoned {
            bail!("write refused for recipient {}", notification.recipient_id);
        }
        self.inner.insert_notification(notification).await
    }

    async fn notifications_for(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
        self.inner.notifications_for(recipient_id).await
    }

    async fn mark_read(&self, notification_id: Uuid, recipient_id: Uuid) -> Result<()> {
        self.inner.mark_read(notification_id, recipient_id).await
    }

    async fn unread_count(&self, recipient_id: Uuid) -> Result<usize> {
        self.inner.unread_count(recipient_id).await
    }
}

#[tokio::test]
async fn staff_audience_is_resolved_at_call_time() {
    let store = Arc::new(MemoryStore::new());
    store.add_contact(contact(Role::Staff)).await;
    store.add_contact(contact(Role::Staff)).await;
    store.add_contact(contact(Role::Client)).await;

    let fanout = NotificationFanout::new(store.clone(), store.clone(), store.clone());
    let report = fanout
        .fanout(system_event(), AudienceSelector::AllStaff)
        .await
        .unwrap();
    assert_eq!(report.created, 2);
    assert!(report.failures.is_empty());

    // Staff membership changed between events; the next fan-out sees it.
    store.add_contact(contact(Role::Staff)).await;
    let report = fanout
        .fanout(system_event(), AudienceSelector::AllStaff)
        .await
        .unwrap();
    assert_eq!(report.created, 3);
}

#[tokio::test]
async fn project_owner_audience_is_the_single_owner() {
    let store = Arc::new(MemoryStore::new());
    let owner = contact(Role::Client);
    let owner_id = owner.id;
    store.add_contact(owner).await;

    let project = atelier::Project::new(owner_id);
    let project_id = project.id;
    store.insert_project(project).await.unwrap();

    let fanout = NotificationFanout::new(store.clone(), store.clone(), store.clone());
    let report = fanout
        .fanout(
            NotificationEvent::new(
                NotificationKind::OnboardingUpdate,
                Some(project_id),
                "Ready for review",
                "Take a look.",
            ),
            AudienceSelector::ProjectOwner(project_id),
        )
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    let records = store.notifications_for(owner_id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].project_id, Some(project_id));
    assert!(!records[0].read);
}

#[tokio::test]
async fn one_failing_recipient_does_not_block_the_rest() {
    let contacts = Arc::new(MemoryStore::new());
    let poisoned = contact(Role::Staff);
    let poisoned_id = poisoned.id;
    contacts.add_contact(poisoned).await;
    let healthy_a = contact(Role::Staff);
    let healthy_a_id = healthy_a.id;
    contacts.add_contact(healthy_a).await;
    let healthy_b = contact(Role::Staff);
    let healthy_b_id = healthy_b.id;
    contacts.add_contact(healthy_b).await;

    let notifications = Arc::new(FlakyNotificationStore {
        inner: MemoryStore::new(),
        poisoned: poisoned_id,
    });

    let fanout = NotificationFanout::new(notifications.clone(), contacts.clone(), contacts.clone());
    let report = fanout
        .fanout(system_event(), AudienceSelector::AllStaff)
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].recipient_id, poisoned_id);

    // Both healthy recipients actually got their record.
    for id in [healthy_a_id, healthy_b_id] {
        assert_eq!(notifications.notifications_for(id).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn unresolvable_audience_is_a_dependency_error() {
    let store = Arc::new(MemoryStore::new());
    let fanout = NotificationFanout::new(store.clone(), store.clone(), store.clone());

    let result = fanout
        .fanout(
            system_event(),
            AudienceSelector::ProjectOwner(Uuid::new_v4()),
        )
        .await;
    assert!(matches!(result, Err(EngineError::Dependency(_))));
}

#[tokio::test]
async fn unread_count_follows_the_rows() {
    let store = Arc::new(MemoryStore::new());
    let staff = contact(Role::Staff);
    let staff_id = staff.id;
    store.add_contact(staff).await;

    let fanout = NotificationFanout::new(store.clone(), store.clone(), store.clone());
    fanout
        .fanout(system_event(), AudienceSelector::AllStaff)
        .await
        .unwrap();
    fanout
        .fanout(system_event(), AudienceSelector::AllStaff)
        .await
        .unwrap();

    assert_eq!(store.unread_count(staff_id).await.unwrap(), 2);

    let records = store.notifications_for(staff_id).await.unwrap();
    store.mark_read(records[0].id, staff_id).await.unwrap();
    assert_eq!(store.unread_count(staff_id).await.unwrap(), 1);
}

#[tokio::test]
async fn empty_staff_audience_creates_nothing() {
    let store = Arc::new(MemoryStore::new());
    store.add_contact(contact(Role::Client)).await;

    let fanout = NotificationFanout::new(store.clone(), store.clone(), store.clone());
    let report = fanout
        .fanout(system_event(), AudienceSelector::AllStaff)
        .await
        .unwrap();
    assert_eq!(report.created, 0);
    assert!(report.failures.is_empty());
    assert_eq!(store.notification_count().await, 0);
}
