//! # permkit
//!
//! A context-scoped permission and meta mutation engine.
//!
//! ## Overview
//!
//! permkit decides which grants and meta values a holder (a user or a group)
//! carries, scoped to runtime contexts such as a world or a server. Its
//! [`Engine`] is the single entry point for changing a holder:
//!
//! - **Gate first**: every mutation passes the three-stage authorization gate
//!   before anything is touched.
//! - **One writer per holder**: mutations against one holder are serialized,
//!   mutations against different holders run independently.
//! - **Copy-on-write reads**: readers take immutable snapshots and never
//!   wait for writers.
//! - **Audited, then persisted**: every successful mutation records an audit
//!   entry and queues a save. Neither blocks the caller on I/O.
//!
//! ## Key Concepts
//!
//! - **Node**: one grant or meta assignment with a context and optional
//!   expiry. Nodes are immutable; a change replaces the node.
//! - **Slot**: a key in a context. Setting a value evicts whatever else
//!   occupies the slot.
//! - **State errors**: `AlreadyPresent` and `NotPresent` mean the request
//!   would have changed nothing. They are not failures.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use permkit::{Actor, ContextSet, Engine, EngineConfig, HolderId};
//! use permkit::audit::MemoryAuditSink;
//! use permkit::store::MemoryStorage;
//!
//! async fn example() {
//!     let storage = Arc::new(MemoryStorage::new());
//!     let sink = Arc::new(MemoryAuditSink::new());
//!     let (engine, _channels) = Engine::new(storage, sink, EngineConfig::default());
//!
//!     let mods = HolderId::group("mods");
//!     engine.load_holder(&mods).await.unwrap();
//!
//!     let lobby = ContextSet::singleton("server", "lobby").unwrap();
//!     engine
//!         .set_meta(&Actor::console(), &mods, "prefix", "[Mod]", lobby.clone())
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(engine.meta_value(&mods, "prefix", &lobby).as_deref(), Some("[Mod]"));
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `permkit::core` - Nodes, context sets, equality modes, resolution
//! - `permkit::store` - Holder store, storage trait, save queue
//! - `permkit::access` - Actors, actions, authorization gate
//! - `permkit::audit` - Audit entries, sinks, audit log

pub mod engine;
pub mod error;

// Re-export component crates
pub use permkit_access as access;
pub use permkit_audit as audit;
pub use permkit_core as core;
pub use permkit_store as store;

// Re-export main types for convenience
pub use engine::{Engine, EngineChannels, EngineConfig, MutationReceipt};
pub use error::{EngineError, MutationError, Result};

// Re-export commonly used component types
pub use permkit_access::{Action, Actor, Denial, GateConfig, PermissionSet};
pub use permkit_audit::{AuditConfig, AuditEntry};
pub use permkit_core::{ContextSet, EqualityMode, HolderId, Node, Specificity, Tristate};
pub use permkit_store::{
    HolderSnapshot, MapType, OverflowPolicy, PersistenceConfig, SaveStatus, StorageFailure,
};
