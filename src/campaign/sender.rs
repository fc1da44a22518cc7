// Seam for the email/send collaborator. Transport-level delivery lives
// outside this crate; the engine only needs a sendable surface whose
// rate-limit responses it can recognize.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::campaign::types::ContactRecord;

#[derive(Debug, Error)]
pub enum SendError {
    /// The provider pushed back on request rate. The dispatcher backs off
    /// before the next item when it sees this.
    #[error("send collaborator rate limited the request")]
    RateLimited,

    #[error("send rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl SendError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SendError::RateLimited)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Uuid,
}

impl SendReceipt {
    pub fn new() -> Self {
        Self {
            message_id: Uuid::new_v4(),
        }
    }
}

impl Default for SendReceipt {
    fn default() -> Self {
        Self::new()
    }
}

/// One outbound email to one contact. Implementations are expected to
/// enforce, or at least document, the provider's rate ceiling; the
/// dispatcher stays under it regardless.
#[async_trait]
pub trait ProspectSender: Send + Sync {
    async fn send(&self, contact: &ContactRecord) -> Result<SendReceipt, SendError>;
}
