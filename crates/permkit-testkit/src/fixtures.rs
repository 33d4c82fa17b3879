//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use permkit::{Engine, EngineChannels, EngineConfig};
use permkit_access::Actor;
use permkit_audit::{AuditEntry, MemoryAuditSink};
use permkit_core::{ContextSet, HolderId};
use permkit_store::MemoryStorage;

/// An engine wired to in-memory storage and an in-memory audit sink.
pub struct EngineFixture {
    pub engine: Arc<Engine>,
    pub storage: Arc<MemoryStorage>,
    pub sink: Arc<MemoryAuditSink>,
    pub channels: EngineChannels,
}

impl EngineFixture {
    /// Create a fixture with the default configuration.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a fixture with a custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let sink = Arc::new(MemoryAuditSink::new());
        let (engine, channels) = Engine::new(storage.clone(), sink.clone(), config);
        Self {
            engine: Arc::new(engine),
            storage,
            sink,
            channels,
        }
    }

    /// Register a group and return its id.
    pub fn group(&self, name: &str) -> HolderId {
        let holder = HolderId::group(name);
        self.engine.ensure_holder(&holder);
        holder
    }

    /// Register a user and return its id.
    pub fn user(&self, name: &str) -> HolderId {
        let holder = HolderId::user(name);
        self.engine.ensure_holder(&holder);
        holder
    }

    /// An actor holding each of `permissions` as TRUE.
    pub fn operator(name: &str, permissions: &[&str]) -> Actor {
        permissions
            .iter()
            .fold(Actor::holder(HolderId::user(name)), |actor, permission| {
                actor.with_permission(permission, true)
            })
    }

    /// Flush the audit and save queues, then return every audit entry.
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.engine.flush().await.expect("engine flush");
        self.sink.entries()
    }
}

/// The `server=lobby` context.
pub fn lobby() -> ContextSet {
    ContextSet::singleton("server", "lobby").expect("valid context")
}

#[cfg(test)]
mod tests {
    use super::*;
    use permkit_core::Tristate;

    #[tokio::test]
    async fn test_fixture_registers_holders() {
        let fixture = EngineFixture::new();
        let mods = fixture.group("Mods");

        assert_eq!(mods, HolderId::group("mods"));
        assert!(fixture.engine.snapshot(&mods).is_some());
    }

    #[tokio::test]
    async fn test_operator_permissions() {
        let actor = EngineFixture::operator("alice", &["permkit.user.meta.set", "permkit.group.*"]);
        assert_eq!(actor.permission("permkit.user.meta.set"), Tristate::True);
        assert_eq!(actor.permission("permkit.group.permission.set"), Tristate::True);
        assert_eq!(actor.permission("permkit.user.permission.set"), Tristate::Undefined);
    }

    #[tokio::test]
    async fn test_audit_entries_flushes() {
        let fixture = EngineFixture::new();
        let mods = fixture.group("mods");
        fixture
            .engine
            .set_meta(&Actor::console(), &mods, "prefix", "[Mod]", lobby())
            .await
            .unwrap();

        assert_eq!(fixture.audit_entries().await.len(), 1);
    }
}
