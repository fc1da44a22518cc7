use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::store::{ContactStore, ProjectStore};

/// Who an event is for. Selectors resolve to a concrete, finite recipient
/// list at call time - staff membership is re-queried for every event, never
/// cached, so promotions and departures between events are always seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudienceSelector {
    AllStaff,
    ProjectOwner(Uuid),
    User(Uuid),
}

impl AudienceSelector {
    pub(crate) async fn resolve(
        &self,
        contacts: &dyn ContactStore,
        projects: &dyn ProjectStore,
    ) -> Result<Vec<Uuid>> {
        match self {
            AudienceSelector::AllStaff => {
                let staff = contacts.staff_contacts().await?;
                Ok(staff.into_iter().map(|c| c.id).collect())
            }
            AudienceSelector::ProjectOwner(project_id) => {
                let project = projects
                    .get_project(*project_id)
                    .await?
                    .ok_or_else(|| anyhow!("project {project_id} not found"))?;
                Ok(vec![project.owner_id])
            }
            AudienceSelector::User(id) => Ok(vec![*id]),
        }
    }
}
