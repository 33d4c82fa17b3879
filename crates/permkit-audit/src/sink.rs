//! Audit sink abstraction.
//!
//! A sink is wherever audit entries end up: a database table, a broadcast
//! channel to other servers, a log file. Implementations must be thread-safe.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::entry::AuditEntry;
use crate::error::{AuditError, Result};

/// Destination for audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Store one entry. Entries arrive in sequence order.
    async fn submit(&self, entry: &AuditEntry) -> Result<()>;
}

/// In-memory sink, primarily for tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    entries: RwLock<Vec<AuditEntry>>,
    fail_next: AtomicUsize,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` submissions fail.
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Every entry stored so far, in arrival order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn submit(&self, entry: &AuditEntry) -> Result<()> {
        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AuditError::Sink("injected failure".into()));
        }

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}

/// Sink that writes each entry to the `tracing` stream as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn submit(&self, entry: &AuditEntry) -> Result<()> {
        let json = entry.to_json()?;
        tracing::info!(target: "permkit::audit", seq = entry.seq(), entry = %json, "audit");
        Ok(())
    }
}
