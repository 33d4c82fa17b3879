//! # permkit Core
//!
//! Pure primitives for permkit: nodes, context sets, equality modes and
//! single-holder resolution.
//!
//! This crate contains no I/O, no storage, no locking. It is pure computation
//! over immutable value types.
//!
//! ## Key Types
//!
//! - [`Node`] - A single grant or meta assignment with its context and expiry
//! - [`ContextSet`] - Key/value constraints scoping when a node applies
//! - [`Specificity`] - Outcome of comparing two context sets
//! - [`EqualityMode`] - Which node fields take part in an equality test
//! - [`HolderId`] - A user or group owning nodes
//!
//! ## Encoding
//!
//! Node collections are encoded as CBOR and fingerprinted with Blake3. See
//! the [`canonical`] module.

pub mod canonical;
pub mod context;
pub mod error;
pub mod node;
pub mod resolve;
pub mod types;

pub use canonical::{decode_nodes, encode_nodes, Fingerprint};
pub use context::{ContextSet, Specificity, RESERVED_CONTEXT_NAMESPACE};
pub use error::{CoreError, Result};
pub use node::{EqualityMode, Node, NodeBuilder, NodeKind, META_PREFIX, WEIGHT_PREFIX};
pub use resolve::{resolve_grant, resolve_meta};
pub use types::{now_millis, ActorId, HolderId, HolderKind, Tristate};
