//! # permkit Testkit
//!
//! Testing utilities for permkit.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: an engine wired to in-memory storage and audit sinks
//! - **Generators**: Proptest strategies for context sets and nodes
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use permkit_core::{EqualityMode, Specificity};
//! use permkit_testkit::generators::{context_set, node_from_params, NodeParams};
//!
//! proptest! {
//!     #[test]
//!     fn exact_refines_loose(p: NodeParams) {
//!         let node = node_from_params(&p);
//!         prop_assert!(node.equals(&node, EqualityMode::IgnoreExpiryAndValue));
//!     }
//!
//!     #[test]
//!     fn specificity_reflexive(c in context_set()) {
//!         prop_assert_eq!(c.compare(&c), Specificity::Equal);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use permkit_testkit::fixtures::EngineFixture;
//!
//! # async fn example() {
//! let fixture = EngineFixture::new();
//! let mods = fixture.group("mods");
//! let actor = EngineFixture::operator("alice", &["permkit.group.meta.set"]);
//! # }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{lobby, EngineFixture};
pub use generators::{node_from_params, NodeParams};
