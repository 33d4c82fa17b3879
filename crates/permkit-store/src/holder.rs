//! The holder store: per-holder node collections with copy-on-write publication.
//!
//! Each collection lives behind `RwLock<Arc<Vec<Node>>>`. Readers clone the
//! `Arc` and never observe a partial edit. Writers must hold the holder's
//! [`WriterGuard`]; they build the next collection on a private copy and
//! publish it by swapping the pointer. The publication lock is held only for
//! that swap.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, OwnedMutexGuard};

use permkit_core::{ContextSet, EqualityMode, HolderId, Node};

use crate::error::{Result, StoreError};

/// Which of a holder's two collections an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapType {
    /// Persisted nodes.
    Enduring,
    /// Session-only nodes, never persisted.
    Transient,
}

/// An immutable view of a holder's collections at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderSnapshot {
    pub holder: HolderId,
    pub enduring: Arc<Vec<Node>>,
    pub transient: Arc<Vec<Node>>,
}

impl HolderSnapshot {
    /// The collection for a map type.
    pub fn nodes(&self, map: MapType) -> &Arc<Vec<Node>> {
        match map {
            MapType::Enduring => &self.enduring,
            MapType::Transient => &self.transient,
        }
    }

    /// Enduring then transient nodes.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.enduring.iter().chain(self.transient.iter())
    }

    /// The highest weight carried by the holder's global `weight.<n>` grants.
    pub fn weight(&self) -> Option<i32> {
        self.all_nodes()
            .filter(|n| n.context().is_empty())
            .filter_map(Node::weight)
            .max()
    }

    /// Whether a node equal under `mode` exists in the collection.
    pub fn has_node(&self, map: MapType, node: &Node, mode: EqualityMode) -> bool {
        self.nodes(map).iter().any(|n| n.equals(node, mode))
    }
}

struct HolderEntry {
    writer: Arc<Mutex<()>>,
    enduring: RwLock<Arc<Vec<Node>>>,
    transient: RwLock<Arc<Vec<Node>>>,
}

impl HolderEntry {
    fn new() -> Self {
        Self {
            writer: Arc::new(Mutex::new(())),
            enduring: RwLock::new(Arc::new(Vec::new())),
            transient: RwLock::new(Arc::new(Vec::new())),
        }
    }

    fn slot(&self, map: MapType) -> &RwLock<Arc<Vec<Node>>> {
        match map {
            MapType::Enduring => &self.enduring,
            MapType::Transient => &self.transient,
        }
    }

    fn load(&self, map: MapType) -> Arc<Vec<Node>> {
        let guard = self.slot(map).read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn publish(&self, map: MapType, next: Vec<Node>) {
        let mut guard = self.slot(map).write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
    }

    fn snapshot(&self, holder: &HolderId) -> HolderSnapshot {
        HolderSnapshot {
            holder: holder.clone(),
            enduring: self.load(MapType::Enduring),
            transient: self.load(MapType::Transient),
        }
    }
}

/// Owns every registered holder's node collections.
#[derive(Default)]
pub struct HolderStore {
    holders: RwLock<HashMap<HolderId, Arc<HolderEntry>>>,
}

impl HolderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a holder with empty collections. Returns `true` if it was new.
    pub fn ensure_holder(&self, holder: &HolderId) -> bool {
        let mut holders = self.holders.write().unwrap_or_else(PoisonError::into_inner);
        if holders.contains_key(holder) {
            return false;
        }
        holders.insert(holder.clone(), Arc::new(HolderEntry::new()));
        true
    }

    /// Whether the holder is registered.
    pub fn contains(&self, holder: &HolderId) -> bool {
        self.entry(holder).is_some()
    }

    /// All registered holders, sorted.
    pub fn holders(&self) -> Vec<HolderId> {
        let holders = self.holders.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<HolderId> = holders.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// A snapshot of both collections. Never waits on writers.
    pub fn snapshot(&self, holder: &HolderId) -> Option<HolderSnapshot> {
        self.entry(holder).map(|entry| entry.snapshot(holder))
    }

    /// A snapshot of one collection.
    pub fn nodes(&self, holder: &HolderId, map: MapType) -> Option<Arc<Vec<Node>>> {
        self.entry(holder).map(|entry| entry.load(map))
    }

    /// Acquire exclusive writer access to a holder.
    ///
    /// Writers for the same holder queue up in FIFO order; writers for
    /// different holders never contend.
    pub async fn lock_writer(&self, holder: &HolderId) -> Result<WriterGuard> {
        let entry = self
            .entry(holder)
            .ok_or_else(|| StoreError::UnknownHolder(holder.clone()))?;
        let lock = Arc::clone(&entry.writer).lock_owned().await;
        Ok(WriterGuard {
            holder: holder.clone(),
            entry,
            _lock: lock,
        })
    }

    fn entry(&self, holder: &HolderId) -> Option<Arc<HolderEntry>> {
        let holders = self.holders.read().unwrap_or_else(PoisonError::into_inner);
        holders.get(holder).cloned()
    }
}

/// Exclusive writer access to one holder's collections.
///
/// Every mutation is computed on a private copy and published atomically.
/// Dropping the guard lets the next writer in.
pub struct WriterGuard {
    holder: HolderId,
    entry: Arc<HolderEntry>,
    _lock: OwnedMutexGuard<()>,
}

impl WriterGuard {
    /// The holder this guard writes.
    pub fn holder(&self) -> &HolderId {
        &self.holder
    }

    /// Current snapshot of both collections.
    pub fn snapshot(&self) -> HolderSnapshot {
        self.entry.snapshot(&self.holder)
    }

    /// Current snapshot of one collection.
    pub fn nodes(&self, map: MapType) -> Arc<Vec<Node>> {
        self.entry.load(map)
    }

    /// Append a node.
    pub fn insert(&self, map: MapType, node: Node) {
        let mut next = self.copy(map);
        next.push(node);
        self.entry.publish(map, next);
    }

    /// Remove every node equal to `node` under `mode`. Returns the count removed.
    pub fn remove(&self, map: MapType, node: &Node, mode: EqualityMode) -> usize {
        self.remove_where(map, |n| n.equals(node, mode))
    }

    /// Remove every meta node with `key` scoped exactly to `context`.
    pub fn clear_meta_keys(&self, map: MapType, key: &str, context: &ContextSet) -> usize {
        self.remove_where(map, |n| n.is_meta() && n.key() == key && n.context() == context)
    }

    /// Remove temporary nodes whose expiry is before `now`.
    pub fn purge_expired(&self, map: MapType, now: i64) -> usize {
        self.remove_where(map, |n| n.has_expired(now))
    }

    /// Remove every node matching `predicate`. Publishes only if something changed.
    pub fn remove_where(&self, map: MapType, predicate: impl Fn(&Node) -> bool) -> usize {
        let current = self.entry.load(map);
        let next: Vec<Node> = current.iter().filter(|n| !predicate(n)).cloned().collect();
        let removed = current.len() - next.len();
        if removed > 0 {
            self.entry.publish(map, next);
        }
        removed
    }

    /// Remove every node sharing `node`'s slot, then append `node`, as one
    /// publication. Returns the number of nodes evicted.
    pub fn replace_slot(&self, map: MapType, node: Node) -> usize {
        let current = self.entry.load(map);
        let mut next: Vec<Node> = current.iter().filter(|n| !n.shares_slot(&node)).cloned().collect();
        let evicted = current.len() - next.len();
        next.push(node);
        self.entry.publish(map, next);
        evicted
    }

    /// Replace a whole collection, e.g. after loading from storage.
    pub fn replace_all(&self, map: MapType, nodes: Vec<Node>) {
        self.entry.publish(map, nodes);
    }

    fn copy(&self, map: MapType) -> Vec<Node> {
        self.entry.load(map).as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn nether() -> ContextSet {
        ContextSet::singleton("world", "nether").unwrap()
    }

    #[tokio::test]
    async fn test_unknown_holder() {
        let store = HolderStore::new();
        let holder = HolderId::user("nobody");
        assert!(store.snapshot(&holder).is_none());
        assert!(matches!(
            store.lock_writer(&holder).await,
            Err(StoreError::UnknownHolder(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_is_isolated_from_later_writes() {
        let store = HolderStore::new();
        let holder = HolderId::group("mods");
        assert!(store.ensure_holder(&holder));
        assert!(!store.ensure_holder(&holder));

        let before = store.snapshot(&holder).unwrap();

        let writer = store.lock_writer(&holder).await.unwrap();
        writer.insert(MapType::Enduring, Node::grant("kick").build().unwrap());
        drop(writer);

        assert!(before.enduring.is_empty());
        assert_eq!(store.snapshot(&holder).unwrap().enduring.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_meta_keys_matches_exact_context() {
        let store = HolderStore::new();
        let holder = HolderId::group("mods");
        store.ensure_holder(&holder);

        let writer = store.lock_writer(&holder).await.unwrap();
        writer.insert(MapType::Enduring, Node::meta("prefix", "A").context(nether()).build().unwrap());
        writer.insert(MapType::Enduring, Node::meta("prefix", "B").build().unwrap());
        writer.insert(MapType::Enduring, Node::grant("prefix").context(nether()).build().unwrap());

        assert_eq!(writer.clear_meta_keys(MapType::Enduring, "prefix", &nether()), 1);
        assert_eq!(writer.nodes(MapType::Enduring).len(), 2);
        assert_eq!(writer.clear_meta_keys(MapType::Transient, "prefix", &nether()), 0);
    }

    #[tokio::test]
    async fn test_replace_slot_evicts_then_inserts() {
        let store = HolderStore::new();
        let holder = HolderId::user("u1");
        store.ensure_holder(&holder);

        let writer = store.lock_writer(&holder).await.unwrap();
        writer.insert(MapType::Enduring, Node::meta("suffix", "x").build().unwrap());
        writer.insert(MapType::Enduring, Node::meta("suffix", "y").build().unwrap());

        let evicted = writer.replace_slot(MapType::Enduring, Node::meta("suffix", "z").build().unwrap());
        assert_eq!(evicted, 2);

        let nodes = writer.nodes(MapType::Enduring);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].meta_value(), Some("z"));
    }

    #[tokio::test]
    async fn test_remove_without_match_keeps_pointer() {
        let store = HolderStore::new();
        let holder = HolderId::user("u1");
        store.ensure_holder(&holder);

        let writer = store.lock_writer(&holder).await.unwrap();
        writer.insert(MapType::Enduring, Node::grant("fly").build().unwrap());
        let before = writer.nodes(MapType::Enduring);

        let missing = Node::grant("build").build().unwrap();
        assert_eq!(writer.remove(MapType::Enduring, &missing, EqualityMode::Exact), 0);
        assert!(Arc::ptr_eq(&before, &writer.nodes(MapType::Enduring)));
    }

    #[tokio::test]
    async fn test_writers_for_same_holder_are_serialized() {
        let store = Arc::new(HolderStore::new());
        let holder = HolderId::user("u1");
        store.ensure_holder(&holder);

        let first = store.lock_writer(&holder).await.unwrap();

        let contender = {
            let store = Arc::clone(&store);
            let holder = holder.clone();
            tokio::spawn(async move { store.lock_writer(&holder).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        // A different holder is not blocked.
        let other = HolderId::user("u2");
        store.ensure_holder(&other);
        assert!(store.lock_writer(&other).await.is_ok());

        drop(first);
        assert!(contender.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_permanent_nodes() {
        let store = HolderStore::new();
        let holder = HolderId::user("u1");
        store.ensure_holder(&holder);

        let writer = store.lock_writer(&holder).await.unwrap();
        writer.insert(MapType::Enduring, Node::grant("fly").expiry(100).build().unwrap());
        writer.insert(MapType::Enduring, Node::grant("build").expiry(300).build().unwrap());
        writer.insert(MapType::Enduring, Node::grant("chat").build().unwrap());

        assert_eq!(writer.purge_expired(MapType::Enduring, 200), 1);
        let nodes = writer.nodes(MapType::Enduring);
        let keys: Vec<&str> = nodes.iter().map(|n| n.key()).collect();
        assert_eq!(keys, ["build", "chat"]);
    }

    #[test]
    fn test_snapshot_weight() {
        let snapshot = HolderSnapshot {
            holder: HolderId::group("admin"),
            enduring: Arc::new(vec![
                Node::grant("weight.10").build().unwrap(),
                Node::grant("weight.50").context(nether()).build().unwrap(),
            ]),
            transient: Arc::new(vec![Node::grant("weight.20").build().unwrap()]),
        };
        assert_eq!(snapshot.weight(), Some(20));
    }
}
