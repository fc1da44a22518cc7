// Role and ownership predicates - no side effects, no storage access

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact roles as supplied by the session collaborator. A contact may be
/// promoted prospect -> client externally; this module only reads the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Prospect,
    Client,
    Staff,
}

/// The acting principal for an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn staff(id: Uuid) -> Self {
        Self::new(id, Role::Staff)
    }

    pub fn client(id: Uuid) -> Self {
        Self::new(id, Role::Client)
    }
}

pub fn is_staff(actor: &Actor) -> bool {
    actor.role == Role::Staff
}

/// Ownership is exclusive: only the contact the project was opened for.
pub fn is_project_owner(actor: &Actor, owner_id: Uuid) -> bool {
    actor.id == owner_id
}

/// Briefs are authored and submitted by staff.
pub fn can_submit_brief(actor: &Actor) -> bool {
    is_staff(actor)
}

/// Approve / reject / request-modification / validate-delivery are owner
/// actions on the owner's own project.
pub fn can_review_brief(actor: &Actor, owner_id: Uuid) -> bool {
    is_project_owner(actor, owner_id)
}

/// Intermediate stage advancement (design -> build -> review) is staff work.
pub fn can_advance_stage(actor: &Actor) -> bool {
    is_staff(actor)
}
