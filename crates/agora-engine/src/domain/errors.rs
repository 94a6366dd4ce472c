use agora_store::StoreError;
use thiserror::Error;

/// Error taxonomy of the engine.
///
/// Every mutating operation validates completely before its first write, so
/// any of these (other than `Store`) means no state change occurred.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced entity is absent.
    #[error("not found: {entity}")]
    NotFound { entity: String },

    /// A unique key already holds an entry.
    #[error("already exists: {entity}")]
    AlreadyExists { entity: String },

    /// Structural validation failed.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Caller identity is not allowed to perform the operation.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// The entity exists but is in a state that forbids the operation.
    #[error("failed precondition: {reason}")]
    FailedPrecondition { reason: String },

    /// The storage layer failed; the store is assumed unusable.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>) -> Self {
        EngineError::AlreadyExists {
            entity: entity.into(),
        }
    }

    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn permission_denied(reason: impl Into<String>) -> Self {
        EngineError::PermissionDenied {
            reason: reason.into(),
        }
    }

    pub fn failed_precondition(reason: impl Into<String>) -> Self {
        EngineError::FailedPrecondition {
            reason: reason.into(),
        }
    }

    /// Whether this error is fatal to the surrounding batch. Store errors
    /// mean the store itself is unusable; everything else is scoped to the
    /// single entity being processed.
    pub fn is_store_error(&self) -> bool {
        matches!(self, EngineError::Store(_))
    }
}
