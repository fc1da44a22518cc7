use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Role;

/// Sales-pipeline position of a contact. Owned by the contact collaborator;
/// consumed read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectStatus {
    New,
    Contacted,
    DemoSent,
    OfferSent,
    Negotiation,
    Meeting,
    Proposal,
    Won,
    Lost,
}

impl ProspectStatus {
    /// Statuses eligible for a revival campaign: nothing past first contact.
    pub fn is_revivable(self) -> bool {
        matches!(self, ProspectStatus::New | ProspectStatus::Contacted)
    }
}

/// External contact record shape, read-only in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub prospect_status: ProspectStatus,
    pub created_at: DateTime<Utc>,
}
