//! Storage trait: the persistence bridge for enduring node collections.
//!
//! Concrete backends (flat files, SQL) live outside this workspace and
//! implement this trait. Only enduring collections are ever handed to
//! storage; transient nodes die with the process.

use async_trait::async_trait;
use permkit_core::{HolderId, Node};

use crate::error::Result;

/// Result of saving a holder's enduring collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The collection was written.
    Written,
    /// The stored collection was already identical (idempotent save).
    Unchanged,
}

/// Async interface for durable holder storage.
///
/// # Contract
///
/// - **Idempotent saves**: saving the same collection twice must be safe and
///   should report `Unchanged` the second time.
/// - **Failure isolation**: a failed save must not touch in-memory state. The
///   in-memory store stays authoritative until the next successful save.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a holder's enduring collection.
    async fn save(&self, holder: &HolderId, nodes: &[Node]) -> Result<SaveOutcome>;

    /// Load a holder's enduring collection, if one was stored.
    async fn load(&self, holder: &HolderId) -> Result<Option<Vec<Node>>>;
}
