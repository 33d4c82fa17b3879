//! Error types for the audit module.

use thiserror::Error;

/// Errors that can occur while recording or delivering audit entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    /// The audit worker has shut down.
    #[error("audit log closed")]
    Closed,

    /// The sink refused or failed to store an entry.
    #[error("audit sink error: {0}")]
    Sink(String),

    /// An entry could not be serialized.
    #[error("audit serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AuditError {
    fn from(e: serde_json::Error) -> Self {
        AuditError::Serialization(e.to_string())
    }
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
