use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery pipeline stages, in order. `Review` and `Build` may cycle via
/// modification requests; `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Onboarding,
    Design,
    Build,
    Review,
    Delivered,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Onboarding => "onboarding",
            Stage::Design => "design",
            Stage::Build => "build",
            Stage::Review => "review",
            Stage::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client project moving through the delivery pipeline. Mutated only by
/// the lifecycle engine; never hard-deleted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub stage: Stage,
    /// Set exactly once, on entering `Delivered`; never cleared.
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            stage: Stage::Onboarding,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefStatus {
    Sent,
    Approved,
    Rejected,
}

/// A versioned brief document. Versions are per-project, start at 1, and
/// strictly increase; only the latest version is status-mutable, everything
/// earlier is immutable history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    pub project_id: Uuid,
    pub version: u32,
    pub content: String,
    pub status: BriefStatus,
    pub client_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Brief {
    /// A fresh version is always created with status `Sent`.
    pub fn new(project_id: Uuid, version: u32, content: String) -> Self {
        Self {
            project_id,
            version,
            content,
            status: BriefStatus::Sent,
            client_comment: None,
            created_at: Utc::now(),
        }
    }
}
