//! # permkit Audit
//!
//! The audit trail of successful mutations.
//!
//! ## Overview
//!
//! Every successful mutation is described by an [`ActionRecord`] and handed
//! to [`AuditLog::record`], which assigns a global sequence number and a
//! per-holder monotonic timestamp and returns the immutable [`AuditEntry`].
//! Delivery to the [`AuditSink`] happens on a background task; recording
//! never waits for it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use permkit_audit::{ActionRecord, AuditConfig, AuditLog, MemoryAuditSink};
//! use permkit_core::{ActorId, HolderId};
//!
//! async fn example() {
//!     let sink = Arc::new(MemoryAuditSink::new());
//!     let (log, _failures) = AuditLog::spawn(sink.clone(), AuditConfig::default());
//!
//!     let record = ActionRecord::new(ActorId::Console, HolderId::group("mods"), "meta set")
//!         .params(["prefix", "[Mod]"]);
//!     log.record(record).unwrap();
//!     log.flush().await.unwrap();
//!     assert_eq!(sink.len(), 1);
//! }
//! ```

pub mod entry;
pub mod error;
pub mod log;
pub mod sink;

pub use entry::{ActionRecord, AuditEntry};
pub use error::{AuditError, Result};
pub use log::{AuditConfig, AuditFailure, AuditFailureReceiver, AuditLog, Clock};
pub use sink::{AuditSink, MemoryAuditSink, TracingAuditSink};
