//! # permkit Store
//!
//! Ownership of holder state and the bridge to durable storage.
//!
//! ## Overview
//!
//! The [`HolderStore`] owns every holder's enduring and transient node
//! collections. Readers take immutable [`HolderSnapshot`]s; writers first
//! acquire the holder's [`WriterGuard`], build the next collection on a
//! private copy and publish it with a single pointer swap.
//!
//! Durable storage sits behind the [`Storage`] trait. Saves are handed to a
//! bounded [`PersistenceQueue`] so mutations never wait on I/O, and failures
//! are reported on a separate channel as [`StorageFailure`]s.
//!
//! ## Key Types
//!
//! - [`HolderStore`] - Per-holder copy-on-write node collections
//! - [`WriterGuard`] - Exclusive writer access to one holder
//! - [`Storage`] - The async persistence trait
//! - [`MemoryStorage`] - In-memory storage for tests
//! - [`PersistenceQueue`] - Bounded save queue with an overflow policy
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use permkit_core::{HolderId, Node};
//! use permkit_store::{HolderStore, MapType, MemoryStorage, PersistenceConfig, PersistenceQueue};
//!
//! async fn example() {
//!     let store = HolderStore::new();
//!     let holder = HolderId::group("mods");
//!     store.ensure_holder(&holder);
//!
//!     let writer = store.lock_writer(&holder).await.unwrap();
//!     writer.insert(MapType::Enduring, Node::grant("kick").build().unwrap());
//!
//!     let (queue, _failures) =
//!         PersistenceQueue::spawn(Arc::new(MemoryStorage::new()), PersistenceConfig::default());
//!     queue.submit(holder.clone(), writer.nodes(MapType::Enduring)).await;
//! }
//! ```

pub mod error;
pub mod holder;
pub mod memory;
pub mod queue;
pub mod traits;

pub use error::{Result, StoreError};
pub use holder::{HolderSnapshot, HolderStore, MapType, WriterGuard};
pub use memory::MemoryStorage;
pub use queue::{
    FailureReceiver, OverflowPolicy, PersistenceConfig, PersistenceQueue, SaveSlot, SaveStatus,
    StorageFailure,
};
pub use traits::{SaveOutcome, Storage};
