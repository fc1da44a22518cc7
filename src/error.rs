use thiserror::Error;

/// Error taxonomy for every engine operation.
///
/// The first three variants are local validation failures: they surface
/// immediately, carry no side effect, and are never retried. `Dependency`
/// wraps a failure in an underlying store or send collaborator; during
/// fan-out and batch dispatch it is isolated per item, during a stage write
/// it fails the whole call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unauthorized: {action}")]
    Unauthorized { action: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error(transparent)]
    Dependency(#[from] anyhow::Error),
}

impl EngineError {
    pub fn unauthorized(action: impl Into<String>) -> Self {
        EngineError::Unauthorized {
            action: action.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound { what: what.into() }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        EngineError::InvalidState {
            reason: reason.into(),
        }
    }

    /// True for the validation classes that must leave no side effect.
    pub fn is_validation(&self) -> bool {
        !matches!(self, EngineError::Dependency(_))
    }
}
