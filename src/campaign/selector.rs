// Segment selection for revival campaigns. Purely a read: the same filter
// backs both the dry-run count and the actual run, so both always agree.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::campaign::types::{ContactRecord, ProspectStatus};
use crate::error::EngineError;
use crate::store::ContactStore;

/// Statuses a revival campaign targets: contacts that never progressed past
/// first contact.
pub const REVIVAL_STATUSES: &[ProspectStatus] = &[ProspectStatus::New, ProspectStatus::Contacted];

pub struct CampaignSelector {
    contacts: Arc<dyn ContactStore>,
}

impl CampaignSelector {
    pub fn new(contacts: Arc<dyn ContactStore>) -> Self {
        Self { contacts }
    }

    /// Contacts with a revivable status created strictly before
    /// `now - staleness`. A contact created exactly at the boundary is
    /// excluded. Zero matches is a valid outcome, not an error.
    pub async fn select_stale_prospects(
        &self,
        staleness: Duration,
    ) -> Result<Vec<ContactRecord>, EngineError> {
        if staleness < Duration::zero() {
            return Err(EngineError::invalid_state(
                "staleness window must not be negative",
            ));
        }

        let cutoff = Utc::now() - staleness;
        let matched = self
            .contacts
            .contacts_by_status_created_before(REVIVAL_STATUSES, cutoff)
            .await?;

        debug!(
            matched = matched.len(),
            cutoff = %cutoff,
            "selected stale prospects"
        );
        Ok(matched)
    }

    /// Dry-run preview; same filter as the campaign run.
    pub async fn count_stale_prospects(&self, staleness: Duration) -> Result<usize, EngineError> {
        Ok(self.select_stale_prospects(staleness).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::store::MemoryStore;
    use uuid::Uuid;

    fn prospect(status: ProspectStatus, age_days: i64) -> ContactRecord {
        ContactRecord {
            id: Uuid::new_v4(),
            name: "Prospect".to_string(),
            email: "prospect@example.com".to_string(),
            role: Role::Prospect,
            prospect_status: status,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn filters_by_status_and_age() {
        let store = Arc::new(MemoryStore::new());
        store.add_contact(prospect(ProspectStatus::New, 10)).await;
        store
            .add_contact(prospect(ProspectStatus::Contacted, 8))
            .await;
        // Too fresh.
        store.add_contact(prospect(ProspectStatus::New, 2)).await;
        // Already progressed.
        store.add_contact(prospect(ProspectStatus::Won, 30)).await;

        let selector = CampaignSelector::new(store);
        let matched = selector
            .select_stale_prospects(Duration::days(7))
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|c| c.prospect_status.is_revivable()));
    }

    #[tokio::test]
    async fn empty_segment_is_not_an_error() {
        let store = Arc::new(MemoryStore::new());
        let selector = CampaignSelector::new(store);
        let count = selector
            .count_stale_prospects(Duration::days(7))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn negative_staleness_is_invalid() {
        let store = Arc::new(MemoryStore::new());
        let selector = CampaignSelector::new(store);
        let result = selector.select_stale_prospects(Duration::days(-1)).await;
        assert!(matches!(result, Err(EngineError::InvalidState { .. })));
    }
}
