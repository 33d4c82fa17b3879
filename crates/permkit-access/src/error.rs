//! Denial reasons returned by the authorization gate.

use permkit_core::HolderId;
use thiserror::Error;

/// Why the authorization gate refused a mutation.
///
/// Denials are ordinary results: the command layer renders them as a "no
/// permission" message and aborts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    /// The actor may not modify this holder.
    #[error("no permission to modify {target}: {reason}")]
    Modify { target: HolderId, reason: String },

    /// The actor may not apply changes in this context.
    #[error("no permission to use context {context}: {reason}")]
    Context { context: String, reason: String },

    /// The actor may not use this argument.
    #[error("no permission to use argument '{argument}'")]
    Argument { argument: String },
}

impl Denial {
    /// Stable outcome code for the command layer.
    pub fn code(&self) -> &'static str {
        match self {
            Denial::Modify { .. } => "NoPermission",
            Denial::Context { .. } => "NoContextPermission",
            Denial::Argument { .. } => "NoArgumentPermission",
        }
    }
}
