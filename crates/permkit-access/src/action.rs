//! Mutating actions and the permissions that guard them.

use serde::{Deserialize, Serialize};

use permkit_core::HolderKind;

/// A mutating action an actor can request against a holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MetaSet,
    MetaSetTemp,
    MetaUnset,
    PermissionSet,
    PermissionSetTemp,
    PermissionUnset,
}

impl Action {
    /// The dotted action name (`meta.set`).
    pub fn node(self) -> &'static str {
        match self {
            Action::MetaSet => "meta.set",
            Action::MetaSetTemp => "meta.settemp",
            Action::MetaUnset => "meta.unset",
            Action::PermissionSet => "permission.set",
            Action::PermissionSetTemp => "permission.settemp",
            Action::PermissionUnset => "permission.unset",
        }
    }

    /// The permission an actor needs for this action on a holder kind.
    pub fn permission(self, target: HolderKind) -> String {
        format!("permkit.{}.{}", target.as_str(), self.node())
    }

    /// Audit verb (`meta set`).
    pub fn verb(self) -> &'static str {
        match self {
            Action::MetaSet => "meta set",
            Action::MetaSetTemp => "meta settemp",
            Action::MetaUnset => "meta unset",
            Action::PermissionSet => "permission set",
            Action::PermissionSetTemp => "permission settemp",
            Action::PermissionUnset => "permission unset",
        }
    }
}
