//! # permkit Access
//!
//! Who may change what.
//!
//! ## Overview
//!
//! Every mutation passes through the [`AuthorizationGate`] before anything is
//! touched. The gate runs three checks in a fixed order and stops at the
//! first failure:
//!
//! 1. **Modify**: may the actor edit this holder at all?
//! 2. **Context**: may the actor scope a change to this context?
//! 3. **Arguments**: may the actor use this particular key?
//!
//! Each failure is a distinct [`Denial`]. The checks themselves live behind
//! the [`AccessPolicy`] trait; [`StandardPolicy`] implements them against the
//! actor's own tristate permissions.
//!
//! ## Permission Names
//!
//! | Check | Permission |
//! |-------|------------|
//! | Modify | `permkit.<user\|group>.<action>` must be TRUE |
//! | Modify | `permkit.modify.user.self`, `permkit.modify.user.others`, `permkit.modify.group.<name>` must not be FALSE |
//! | Context | `<action permission>.usecontext.<key>.<value>` (or `.global`) must not be FALSE |
//! | Arguments | `<action permission>.arguments.<key>` must not be FALSE (must be TRUE for privileged keys) |

pub mod action;
pub mod actor;
pub mod error;
pub mod gate;

pub use action::Action;
pub use actor::{Actor, PermissionSet};
pub use error::Denial;
pub use gate::{AccessPolicy, AuthorizationGate, GateConfig, GateRequest, StandardPolicy};
