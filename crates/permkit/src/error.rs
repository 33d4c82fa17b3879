//! Error types for the engine.

use permkit_access::Denial;
use permkit_audit::AuditError;
use permkit_core::{CoreError, HolderId};
use permkit_store::StoreError;
use thiserror::Error;

/// Why a mutation did not happen.
///
/// Every variant is an ordinary outcome the command layer reacts to. None of
/// them leave the holder changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// Malformed input, or an unknown holder.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The authorization gate refused the request.
    #[error(transparent)]
    NoPermission(#[from] Denial),

    /// The holder already has an equivalent node.
    #[error("{holder} already has {node}")]
    AlreadyPresent { holder: HolderId, node: String },

    /// Nothing matched the node to remove.
    #[error("{holder} does not have {node}")]
    NotPresent { holder: HolderId, node: String },
}

impl MutationError {
    /// The request would have had no effect.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            MutationError::AlreadyPresent { .. } | MutationError::NotPresent { .. }
        )
    }

    /// The authorization gate refused the request.
    pub fn is_denial(&self) -> bool {
        matches!(self, MutationError::NoPermission(_))
    }

    /// The denial, if this is one.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            MutationError::NoPermission(denial) => Some(denial),
            _ => None,
        }
    }
}

impl From<CoreError> for MutationError {
    fn from(e: CoreError) -> Self {
        MutationError::InvalidArgument(e.to_string())
    }
}

impl From<StoreError> for MutationError {
    fn from(e: StoreError) -> Self {
        MutationError::InvalidArgument(e.to_string())
    }
}

/// Errors from engine housekeeping: loading holders and flushing queues.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Storage or holder store error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Audit log error.
    #[error("audit error: {0}")]
    Audit(#[from] AuditError),
}

/// Result type for mutations.
pub type Result<T> = std::result::Result<T, MutationError>;
