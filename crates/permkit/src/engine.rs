//! The Engine: the mutation protocol over holders, gate, audit and storage.
//!
//! Every gated mutation runs the same linear sequence:
//!
//! 1. validate the input and build the candidate node;
//! 2. take the holder's writer lock;
//! 3. run the authorization gate against the current snapshot;
//! 4. reject a duplicate (`AlreadyPresent`) or a missing target (`NotPresent`);
//! 5. reserve room on the save queue;
//! 6. evict and insert as one publication;
//! 7. record the audit entry;
//! 8. send the save, still holding the writer so saves keep mutation order.
//!
//! Nothing is touched before step 6, so every error leaves the holder as it
//! was. Steps 6 to 8 never wait, so a caller that gives up on a mutation
//! does so before anything changed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use permkit_access::{
    AccessPolicy, Action, Actor, AuthorizationGate, GateConfig, GateRequest, StandardPolicy,
};
use permkit_audit::{
    ActionRecord, AuditConfig, AuditEntry, AuditFailureReceiver, AuditLog, AuditSink,
};
use permkit_core::{
    now_millis, resolve_grant, resolve_meta, ContextSet, EqualityMode, HolderId, Node, Tristate,
};
use permkit_store::{
    FailureReceiver, HolderSnapshot, HolderStore, MapType, PersistenceConfig, PersistenceQueue,
    SaveSlot, SaveStatus, Storage, WriterGuard,
};

use crate::error::{EngineError, MutationError, Result};

/// Configuration for the Engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Authorization gate settings.
    pub gate: GateConfig,
    /// Save queue settings.
    pub persistence: PersistenceConfig,
    /// Audit log settings.
    pub audit: AuditConfig,
}

/// Asynchronous failure channels handed out when the engine starts.
///
/// Failures arrive here after the mutation that caused them has already
/// returned successfully.
pub struct EngineChannels {
    pub storage_failures: FailureReceiver,
    pub audit_failures: AuditFailureReceiver,
}

/// The outcome of a successful mutation.
#[derive(Debug, Clone)]
pub struct MutationReceipt {
    /// The audit entry recorded for this mutation.
    pub audit: Option<Arc<AuditEntry>>,
    /// Nodes removed: evicted by a set, or matched by an unset.
    pub removed: usize,
    /// What happened to the save request.
    pub save: SaveStatus,
}

impl MutationReceipt {
    /// Sequence number of the audit entry, if one was recorded.
    pub fn audit_seq(&self) -> Option<u64> {
        self.audit.as_ref().map(|entry| entry.seq())
    }
}

/// One gated request, before it touches the holder.
struct Request<'a> {
    actor: &'a Actor,
    holder: &'a HolderId,
    action: Action,
    map: MapType,
    context: &'a ContextSet,
    argument: &'a str,
    params: Vec<String>,
}

/// The mutation engine.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct Engine<P: AccessPolicy = StandardPolicy> {
    store: HolderStore,
    gate: AuthorizationGate<P>,
    storage: Arc<dyn Storage>,
    queue: PersistenceQueue,
    audit: AuditLog,
}

impl Engine<StandardPolicy> {
    /// Start an engine with the standard access policy.
    ///
    /// Spawns the save and audit workers, so it must be called from within a
    /// Tokio runtime.
    pub fn new(
        storage: Arc<dyn Storage>,
        sink: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> (Self, EngineChannels) {
        let policy = StandardPolicy::new(config.gate);
        Self::with_policy(policy, storage, sink, config.persistence, config.audit)
    }
}

impl<P: AccessPolicy> Engine<P> {
    /// Start an engine with a custom access policy.
    pub fn with_policy(
        policy: P,
        storage: Arc<dyn Storage>,
        sink: Arc<dyn AuditSink>,
        persistence: PersistenceConfig,
        audit: AuditConfig,
    ) -> (Self, EngineChannels) {
        let (queue, storage_failures) = PersistenceQueue::spawn(Arc::clone(&storage), persistence);
        let (audit, audit_failures) = AuditLog::spawn(sink, audit);

        let engine = Self {
            store: HolderStore::new(),
            gate: AuthorizationGate::new(policy),
            storage,
            queue,
            audit,
        };
        let channels = EngineChannels {
            storage_failures,
            audit_failures,
        };
        (engine, channels)
    }

    /// Get the holder store.
    pub fn store(&self) -> &HolderStore {
        &self.store
    }

    /// Get the audit log.
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Holder Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a holder with empty collections. Returns `true` if it was new.
    pub fn ensure_holder(&self, holder: &HolderId) -> bool {
        self.store.ensure_holder(holder)
    }

    /// Load a holder's enduring collection from storage.
    ///
    /// Registers the holder if needed. A holder unknown to storage is loaded
    /// as empty. Returns the number of nodes loaded.
    pub async fn load_holder(&self, holder: &HolderId) -> std::result::Result<usize, EngineError> {
        let nodes = self.storage.load(holder).await?.unwrap_or_default();
        let count = nodes.len();

        self.store.ensure_holder(holder);
        let writer = self.store.lock_writer(holder).await?;
        writer.replace_all(MapType::Enduring, nodes);

        tracing::info!(holder = %holder, nodes = count, "holder loaded");
        Ok(count)
    }

    /// Wait until every audit entry and save queued so far has been handled.
    pub async fn flush(&self) -> std::result::Result<(), EngineError> {
        self.audit.flush().await?;
        self.queue.flush().await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Meta Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Set a meta value, replacing any other value for the key in `context`.
    pub async fn set_meta(
        &self,
        actor: &Actor,
        holder: &HolderId,
        key: &str,
        value: &str,
        context: ContextSet,
    ) -> Result<MutationReceipt> {
        let node = Node::meta(key, value).context(context).build()?;
        let params = vec![node.key().to_string(), value.to_string()];
        self.apply_set(actor, holder, Action::MetaSet, MapType::Enduring, node, params)
            .await
    }

    /// Set a meta value that expires at `expiry` (Unix milliseconds).
    pub async fn set_temp_meta(
        &self,
        actor: &Actor,
        holder: &HolderId,
        key: &str,
        value: &str,
        context: ContextSet,
        expiry: i64,
    ) -> Result<MutationReceipt> {
        check_expiry(expiry)?;
        let node = Node::meta(key, value)
            .context(context)
            .expiry(expiry)
            .build()?;
        let params = vec![node.key().to_string(), value.to_string(), expiry.to_string()];
        self.apply_set(actor, holder, Action::MetaSetTemp, MapType::Enduring, node, params)
            .await
    }

    /// Set a session-only meta value. Audited, never persisted.
    pub async fn set_transient_meta(
        &self,
        actor: &Actor,
        holder: &HolderId,
        key: &str,
        value: &str,
        context: ContextSet,
    ) -> Result<MutationReceipt> {
        let node = Node::meta(key, value).context(context).build()?;
        let params = vec![node.key().to_string(), value.to_string()];
        self.apply_set(actor, holder, Action::MetaSet, MapType::Transient, node, params)
            .await
    }

    /// Remove every value of a meta key in `context`.
    pub async fn unset_meta(
        &self,
        actor: &Actor,
        holder: &HolderId,
        key: &str,
        context: ContextSet,
    ) -> Result<MutationReceipt> {
        let key = key.trim();
        if key.is_empty() {
            return Err(MutationError::InvalidArgument("meta key is empty".into()));
        }
        context.validate()?;

        let request = Request {
            actor,
            holder,
            action: Action::MetaUnset,
            map: MapType::Enduring,
            context: &context,
            argument: key,
            params: vec![key.to_string()],
        };
        self.apply_unset(request, |n| {
            n.is_meta() && n.key() == key && n.context() == &context
        })
        .await
    }

    /// Remove every meta value for `key` in exactly `context`, without a gate
    /// check or an audit entry. Persisted when anything was removed.
    pub async fn clear_meta(
        &self,
        holder: &HolderId,
        key: &str,
        context: &ContextSet,
    ) -> Result<usize> {
        let writer = self.lock(holder).await?;
        let slot = self.queue.reserve(holder).await;
        let removed = writer.clear_meta_keys(MapType::Enduring, key.trim(), context);
        if removed > 0 {
            tracing::debug!(holder = %holder, key = key, removed, "meta cleared");
            save(&writer, slot);
        }
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Set a grant, replacing any grant for the same permission in `context`.
    ///
    /// With an expiry the grant is temporary; an expiry in the past is
    /// rejected.
    pub async fn set_grant(
        &self,
        actor: &Actor,
        holder: &HolderId,
        permission: &str,
        value: bool,
        context: ContextSet,
        expiry: Option<i64>,
    ) -> Result<MutationReceipt> {
        if let Some(expiry) = expiry {
            check_expiry(expiry)?;
        }
        let node = Node::grant(permission)
            .value(value)
            .context(context)
            .expiry_opt(expiry)
            .build()?;

        let mut params = vec![node.key().to_string(), value.to_string()];
        let action = match expiry {
            Some(expiry) => {
                params.push(expiry.to_string());
                Action::PermissionSetTemp
            }
            None => Action::PermissionSet,
        };
        self.apply_set(actor, holder, action, MapType::Enduring, node, params)
            .await
    }

    /// Set a session-only grant. Audited, never persisted.
    pub async fn set_transient_grant(
        &self,
        actor: &Actor,
        holder: &HolderId,
        permission: &str,
        value: bool,
        context: ContextSet,
    ) -> Result<MutationReceipt> {
        let node = Node::grant(permission).value(value).context(context).build()?;
        let params = vec![node.key().to_string(), value.to_string()];
        self.apply_set(actor, holder, Action::PermissionSet, MapType::Transient, node, params)
            .await
    }

    /// Remove every grant of `permission` in `context`, whatever its value or
    /// expiry.
    pub async fn unset_grant(
        &self,
        actor: &Actor,
        holder: &HolderId,
        permission: &str,
        context: ContextSet,
    ) -> Result<MutationReceipt> {
        // Normalizes the permission the same way a set would.
        let probe = Node::grant(permission).context(context).build()?;
        let context = probe.context().clone();

        let request = Request {
            actor,
            holder,
            action: Action::PermissionUnset,
            map: MapType::Enduring,
            context: &context,
            argument: probe.key(),
            params: vec![probe.key().to_string()],
        };
        self.apply_unset(request, |n| n.is_grant() && n.shares_slot(&probe))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Housekeeping
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove expired temporary nodes from both collections.
    ///
    /// Not audited. The enduring collection is saved if it changed.
    pub async fn purge_expired(&self, holder: &HolderId) -> Result<usize> {
        let now = now_millis();
        let writer = self.lock(holder).await?;
        let slot = self.queue.reserve(holder).await;

        let enduring = writer.purge_expired(MapType::Enduring, now);
        let transient = writer.purge_expired(MapType::Transient, now);
        if enduring > 0 {
            save(&writer, slot);
        }
        if enduring + transient > 0 {
            tracing::debug!(holder = %holder, enduring, transient, "expired nodes purged");
        }
        Ok(enduring + transient)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Current enduring and transient collections. Never waits on writers.
    pub fn snapshot(&self, holder: &HolderId) -> Option<HolderSnapshot> {
        self.store.snapshot(holder)
    }

    /// Every meta key the holder has, sorted and deduplicated.
    pub fn meta_keys(&self, holder: &HolderId) -> Vec<String> {
        let Some(snapshot) = self.store.snapshot(holder) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = snapshot
            .all_nodes()
            .filter(|n| n.is_meta())
            .map(|n| n.key().to_string())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// The meta value applying to `key` in `active`, from the holder's own
    /// nodes. Transient nodes take part after enduring ones.
    pub fn meta_value(&self, holder: &HolderId, key: &str, active: &ContextSet) -> Option<String> {
        let snapshot = self.store.snapshot(holder)?;
        let nodes: Vec<Node> = snapshot.all_nodes().cloned().collect();
        resolve_meta(&nodes, key.trim(), active, now_millis())
            .and_then(Node::meta_value)
            .map(str::to_string)
    }

    /// The grant value applying to `permission` in `active`, from the
    /// holder's own nodes.
    pub fn grant_value(&self, holder: &HolderId, permission: &str, active: &ContextSet) -> Tristate {
        let Some(snapshot) = self.store.snapshot(holder) else {
            return Tristate::Undefined;
        };
        let nodes: Vec<Node> = snapshot.all_nodes().cloned().collect();
        resolve_grant(&nodes, &permission.trim().to_lowercase(), active, now_millis())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    async fn apply_set(
        &self,
        actor: &Actor,
        holder: &HolderId,
        action: Action,
        map: MapType,
        node: Node,
        params: Vec<String>,
    ) -> Result<MutationReceipt> {
        let dedup = if node.is_meta() {
            EqualityMode::IgnoreExpiryAndValue
        } else {
            EqualityMode::IgnoreExpiry
        };
        let context = node.context().clone();
        let argument = node.key().to_string();
        let request = Request {
            actor,
            holder,
            action,
            map,
            context: &context,
            argument: &argument,
            params,
        };

        let writer = self.lock(holder).await?;
        let snapshot = writer.snapshot();
        self.authorize(&request, &snapshot)?;

        if snapshot.has_node(map, &node, dedup) {
            return Err(MutationError::AlreadyPresent {
                holder: holder.clone(),
                node: describe(&node),
            });
        }
        let slot = self.reserve(map, holder).await;

        let described = describe(&node);
        let removed = writer.replace_slot(map, node);
        tracing::debug!(
            holder = %holder,
            action = action.verb(),
            node = %described,
            evicted = removed,
            "mutation applied"
        );

        Ok(self.finish(writer, request, removed, slot))
    }

    async fn apply_unset(
        &self,
        request: Request<'_>,
        matches: impl Fn(&Node) -> bool,
    ) -> Result<MutationReceipt> {
        let holder = request.holder;
        let writer = self.lock(holder).await?;
        let snapshot = writer.snapshot();
        self.authorize(&request, &snapshot)?;

        if !snapshot.nodes(request.map).iter().any(|n| matches(n)) {
            return Err(MutationError::NotPresent {
                holder: holder.clone(),
                node: format!("{} in {}", request.argument, request.context),
            });
        }
        let slot = self.reserve(request.map, holder).await;

        let removed = writer.remove_where(request.map, matches);
        tracing::debug!(
            holder = %holder,
            action = request.action.verb(),
            removed,
            "mutation applied"
        );

        Ok(self.finish(writer, request, removed, slot))
    }

    fn authorize(&self, request: &Request<'_>, target: &HolderSnapshot) -> Result<()> {
        let arguments = [request.argument];
        let gate_request = GateRequest {
            actor: request.actor,
            target,
            action: request.action,
            context: request.context,
            arguments: &arguments,
        };
        self.gate.check(&gate_request).map_err(|denial| {
            tracing::warn!(
                actor = %request.actor.id(),
                holder = %request.holder,
                code = denial.code(),
                reason = %denial,
                "mutation denied"
            );
            MutationError::NoPermission(denial)
        })
    }

    /// Record the audit entry and send the save. The writer is released
    /// only after the save is queued.
    fn finish(
        &self,
        writer: WriterGuard,
        request: Request<'_>,
        removed: usize,
        slot: Option<SaveSlot>,
    ) -> MutationReceipt {
        let record = ActionRecord::new(
            request.actor.id().clone(),
            request.holder.clone(),
            request.action.verb(),
        )
        .params(request.params)
        .context(request.context.clone());

        let audit = match self.audit.record(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(holder = %request.holder, error = %e, "failed to record audit entry");
                None
            }
        };

        let save = match slot {
            Some(slot) => save(&writer, slot),
            None => SaveStatus::Skipped,
        };
        drop(writer);

        MutationReceipt {
            audit,
            removed,
            save,
        }
    }

    /// Take capacity for the save a change to `map` will need.
    async fn reserve(&self, map: MapType, holder: &HolderId) -> Option<SaveSlot> {
        match map {
            MapType::Enduring => Some(self.queue.reserve(holder).await),
            MapType::Transient => None,
        }
    }

    async fn lock(&self, holder: &HolderId) -> Result<WriterGuard> {
        if !holder.is_valid() {
            return Err(MutationError::InvalidArgument(format!(
                "invalid holder '{}'",
                holder
            )));
        }
        Ok(self.store.lock_writer(holder).await?)
    }
}

fn save(writer: &WriterGuard, slot: SaveSlot) -> SaveStatus {
    slot.send(writer.nodes(MapType::Enduring))
}

fn describe(node: &Node) -> String {
    match node.meta_value() {
        Some(value) => format!("meta {}={} in {}", node.key(), value, node.context()),
        None => format!("{}={} in {}", node.key(), node.value(), node.context()),
    }
}

fn check_expiry(expiry: i64) -> Result<()> {
    if expiry <= now_millis() {
        return Err(MutationError::InvalidArgument(format!(
            "expiry {} is in the past",
            expiry
        )));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use permkit_audit::MemoryAuditSink;
    use permkit_store::MemoryStorage;

    async fn engine() -> (Engine, Arc<MemoryStorage>, Arc<MemoryAuditSink>) {
        let storage = Arc::new(MemoryStorage::new());
        let sink = Arc::new(MemoryAuditSink::new());
        let (engine, _channels) = Engine::new(storage.clone(), sink.clone(), EngineConfig::default());
        (engine, storage, sink)
    }

    fn lobby() -> ContextSet {
        ContextSet::singleton("server", "lobby").unwrap()
    }

    #[tokio::test]
    async fn test_set_meta_records_and_saves() {
        let (engine, storage, sink) = engine().await;
        let holder = HolderId::group("mods");
        engine.ensure_holder(&holder);

        let receipt = engine
            .set_meta(&Actor::console(), &holder, "prefix", "[Mod]", lobby())
            .await
            .unwrap();
        assert_eq!(receipt.removed, 0);
        assert_eq!(receipt.save, SaveStatus::Queued);
        assert_eq!(receipt.audit_seq(), Some(1));

        engine.flush().await.unwrap();
        let entries = sink.entries();
        assert_eq!(entries[0].verb(), "meta set");
        assert_eq!(entries[0].params(), ["prefix".to_string(), "[Mod]".to_string()]);
        assert_eq!(storage.load(&holder).await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_holder_is_invalid_argument() {
        let (engine, _storage, sink) = engine().await;
        let err = engine
            .set_meta(&Actor::console(), &HolderId::user("ghost"), "prefix", "x", lobby())
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::InvalidArgument(_)));
        engine.flush().await.unwrap();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_key_rejected_before_gate() {
        let (engine, _storage, _sink) = engine().await;
        let holder = HolderId::user("u1");
        engine.ensure_holder(&holder);

        let err = engine
            .set_grant(
                &Actor::holder(HolderId::user("nobody")),
                &holder,
                "meta.prefix.x",
                true,
                lobby(),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MutationError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_past_expiry_rejected() {
        let (engine, _storage, _sink) = engine().await;
        let holder = HolderId::user("u1");
        engine.ensure_holder(&holder);

        let err = engine
            .set_grant(&Actor::console(), &holder, "fly", true, ContextSet::global(), Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, MutationError::InvalidArgument(_)));
        assert!(engine.snapshot(&holder).unwrap().enduring.is_empty());
    }

    #[tokio::test]
    async fn test_grant_value_change_replaces() {
        let (engine, _storage, _sink) = engine().await;
        let holder = HolderId::user("u1");
        engine.ensure_holder(&holder);
        let console = Actor::console();

        engine
            .set_grant(&console, &holder, "Fly", true, lobby(), None)
            .await
            .unwrap();
        let err = engine
            .set_grant(&console, &holder, "fly", true, lobby(), None)
            .await
            .unwrap_err();
        assert!(err.is_state_error());

        let receipt = engine
            .set_grant(&console, &holder, "fly", false, lobby(), None)
            .await
            .unwrap();
        assert_eq!(receipt.removed, 1);
        assert_eq!(engine.grant_value(&holder, "fly", &lobby()), Tristate::False);
    }

    #[tokio::test]
    async fn test_transient_meta_skips_save() {
        let (engine, storage, sink) = engine().await;
        let holder = HolderId::user("u1");
        engine.ensure_holder(&holder);

        let receipt = engine
            .set_transient_meta(&Actor::console(), &holder, "suffix", "*", ContextSet::global())
            .await
            .unwrap();
        assert_eq!(receipt.save, SaveStatus::Skipped);

        engine.flush().await.unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(storage.attempts(), 0);
        assert_eq!(engine.snapshot(&holder).unwrap().transient.len(), 1);
        assert_eq!(engine.meta_keys(&holder), ["suffix"]);
    }

    #[tokio::test]
    async fn test_unset_meta_not_present() {
        let (engine, _storage, _sink) = engine().await;
        let holder = HolderId::user("u1");
        engine.ensure_holder(&holder);
        let console = Actor::console();

        let err = engine
            .unset_meta(&console, &holder, "prefix", lobby())
            .await
            .unwrap_err();
        assert!(matches!(err, MutationError::NotPresent { .. }));

        engine.set_meta(&console, &holder, "prefix", "A", lobby()).await.unwrap();
        engine.set_meta(&console, &holder, "prefix", "B", ContextSet::global()).await.unwrap();

        let receipt = engine.unset_meta(&console, &holder, "prefix", lobby()).await.unwrap();
        assert_eq!(receipt.removed, 1);
        assert_eq!(engine.meta_value(&holder, "prefix", &lobby()), Some("B".to_string()));
    }

    #[tokio::test]
    async fn test_clear_meta_is_unaudited() {
        let (engine, storage, sink) = engine().await;
        let holder = HolderId::group("mods");
        engine.ensure_holder(&holder);
        let console = Actor::console();

        engine.set_meta(&console, &holder, "prefix", "A", lobby()).await.unwrap();
        assert_eq!(engine.clear_meta(&holder, "prefix", &lobby()).await.unwrap(), 1);
        assert_eq!(engine.clear_meta(&holder, "prefix", &lobby()).await.unwrap(), 0);

        engine.flush().await.unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(storage.attempts(), 2);
        assert!(storage.load(&holder).await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired_after_load() {
        let (engine, storage, sink) = engine().await;
        let holder = HolderId::user("u1");
        let expired = Node::grant("fly").expiry(1).build().unwrap();
        let permanent = Node::grant("build").build().unwrap();
        storage.insert(holder.clone(), &[expired, permanent]).unwrap();

        assert_eq!(engine.load_holder(&holder).await.unwrap(), 2);
        assert_eq!(engine.grant_value(&holder, "fly", &ContextSet::global()), Tristate::Undefined);

        assert_eq!(engine.purge_expired(&holder).await.unwrap(), 1);
        assert_eq!(engine.purge_expired(&holder).await.unwrap(), 0);

        engine.flush().await.unwrap();
        assert!(sink.is_empty());
        assert_eq!(storage.load(&holder).await.unwrap().unwrap().len(), 1);
    }
}
