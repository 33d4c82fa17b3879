//! In-memory implementation of the Storage trait.
//!
//! This is primarily for testing. Collections are stored in their encoded
//! form so loads go through the same decode and validation path a real
//! backend would. Tests can pause the backend or make saves fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::watch;

use permkit_core::{decode_nodes, encode_nodes, Fingerprint, HolderId, Node};

use crate::error::{Result, StoreError};
use crate::traits::{SaveOutcome, Storage};

struct StoredHolder {
    bytes: Bytes,
    fingerprint: Fingerprint,
}

/// In-memory storage backend.
pub struct MemoryStorage {
    holders: RwLock<HashMap<HolderId, StoredHolder>>,
    paused: watch::Sender<bool>,
    fail_next: AtomicUsize,
    writes: AtomicUsize,
    attempts: AtomicUsize,
}

impl MemoryStorage {
    /// Create an empty backend.
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            holders: RwLock::new(HashMap::new()),
            paused,
            fail_next: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Hold every save until [`MemoryStorage::resume`] is called.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Release paused saves.
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Make the next `count` saves fail.
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Number of saves that actually wrote data.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of save calls, including failed and unchanged ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Fingerprint of the stored collection for a holder.
    pub fn fingerprint(&self, holder: &HolderId) -> Option<Fingerprint> {
        let holders = self.holders.read().unwrap_or_else(PoisonError::into_inner);
        holders.get(holder).map(|stored| stored.fingerprint)
    }

    /// Seed a stored collection directly, bypassing the queue.
    pub fn insert(&self, holder: HolderId, nodes: &[Node]) -> Result<()> {
        let bytes = encode_nodes(nodes)?;
        let fingerprint = Fingerprint::of_bytes(&bytes);
        let mut holders = self.holders.write().unwrap_or_else(PoisonError::into_inner);
        holders.insert(holder, StoredHolder { bytes, fingerprint });
        Ok(())
    }

    fn take_failure(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save(&self, holder: &HolderId, nodes: &[Node]) -> Result<SaveOutcome> {
        let mut paused = self.paused.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = paused.wait_for(|p| !*p).await;

        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(StoreError::Backend(format!("injected failure saving {}", holder)));
        }

        let bytes = encode_nodes(nodes)?;
        let fingerprint = Fingerprint::of_bytes(&bytes);

        let mut holders = self.holders.write().unwrap_or_else(PoisonError::into_inner);
        if holders.get(holder).map(|s| s.fingerprint) == Some(fingerprint) {
            return Ok(SaveOutcome::Unchanged);
        }
        holders.insert(holder.clone(), StoredHolder { bytes, fingerprint });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(SaveOutcome::Written)
    }

    async fn load(&self, holder: &HolderId) -> Result<Option<Vec<Node>>> {
        let bytes = {
            let holders = self.holders.read().unwrap_or_else(PoisonError::into_inner);
            match holders.get(holder) {
                Some(stored) => stored.bytes.clone(),
                None => return Ok(None),
            }
        };
        Ok(Some(decode_nodes(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permkit_core::ContextSet;

    fn nodes() -> Vec<Node> {
        vec![
            Node::grant("fly").build().unwrap(),
            Node::meta("prefix", "[Mod]")
                .context(ContextSet::singleton("server", "lobby").unwrap())
                .build()
                .unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let holder = HolderId::group("mods");

        assert!(storage.load(&holder).await.unwrap().is_none());
        assert_eq!(storage.save(&holder, &nodes()).await.unwrap(), SaveOutcome::Written);
        assert_eq!(storage.load(&holder).await.unwrap().unwrap(), nodes());
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let storage = MemoryStorage::new();
        let holder = HolderId::group("mods");

        storage.save(&holder, &nodes()).await.unwrap();
        assert_eq!(storage.save(&holder, &nodes()).await.unwrap(), SaveOutcome::Unchanged);
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.attempts(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_previous_data() {
        let storage = MemoryStorage::new();
        let holder = HolderId::group("mods");
        storage.save(&holder, &nodes()).await.unwrap();
        let before = storage.fingerprint(&holder);

        storage.fail_next(1);
        assert!(storage.save(&holder, &[]).await.is_err());
        assert_eq!(storage.fingerprint(&holder), before);

        assert_eq!(storage.save(&holder, &[]).await.unwrap(), SaveOutcome::Written);
    }
}
