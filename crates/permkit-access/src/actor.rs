//! Actors: whoever requests a mutation, with their own effective permissions.
//!
//! The engine does not compute an actor's permissions; the caller resolves
//! them (through inheritance, caches, whatever the platform does) and hands
//! the result over as a [`PermissionSet`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use permkit_core::{ActorId, ContextSet, HolderId, Tristate};

/// Tristate permission values with wildcard lookup.
///
/// `a.b.c` is looked up as `a.b.c`, then `a.b.*`, `a.*` and finally `*`.
/// The first defined entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeMap<String, bool>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a permission value. Names are lower-cased.
    pub fn set(&mut self, permission: &str, value: bool) {
        self.0.insert(permission.trim().to_lowercase(), value);
    }

    /// Look up a permission, falling back through wildcards.
    pub fn value(&self, permission: &str) -> Tristate {
        let permission = permission.trim().to_lowercase();
        if let Some(&v) = self.0.get(&permission) {
            return v.into();
        }

        let mut prefix = permission.as_str();
        while let Some(idx) = prefix.rfind('.') {
            prefix = &prefix[..idx];
            if let Some(&v) = self.0.get(&format!("{}.*", prefix)) {
                return v.into();
            }
        }

        self.0.get("*").copied().into()
    }
}

/// The requester of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: ActorId,
    permissions: PermissionSet,
    weight: Option<i32>,
    context_bound: Option<ContextSet>,
}

impl Actor {
    /// The server console.
    pub fn console() -> Self {
        Self {
            id: ActorId::Console,
            permissions: PermissionSet::new(),
            weight: None,
            context_bound: None,
        }
    }

    /// A user acting as `holder`, with no permissions yet.
    pub fn holder(holder: HolderId) -> Self {
        Self {
            id: ActorId::Holder(holder),
            permissions: PermissionSet::new(),
            weight: None,
            context_bound: None,
        }
    }

    pub fn with_permission(mut self, permission: &str, value: bool) -> Self {
        self.permissions.set(permission, value);
        self
    }

    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// The actor's rank, compared against target weights.
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Restrict the actor to contexts at least as specific as `bound`.
    pub fn with_context_bound(mut self, bound: ContextSet) -> Self {
        self.context_bound = Some(bound);
        self
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn is_console(&self) -> bool {
        matches!(self.id, ActorId::Console)
    }

    /// Whether the actor acts as `holder`.
    pub fn is(&self, holder: &HolderId) -> bool {
        self.id.holder() == Some(holder)
    }

    pub fn permission(&self, permission: &str) -> Tristate {
        self.permissions.value(permission)
    }

    pub fn weight(&self) -> Option<i32> {
        self.weight
    }

    pub fn context_bound(&self) -> Option<&ContextSet> {
        self.context_bound.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_before_wildcard() {
        let mut perms = PermissionSet::new();
        perms.set("permkit.user.*", true);
        perms.set("permkit.user.meta.set", false);

        assert_eq!(perms.value("permkit.user.meta.set"), Tristate::False);
        assert_eq!(perms.value("permkit.user.meta.unset"), Tristate::True);
        assert_eq!(perms.value("permkit.group.meta.set"), Tristate::Undefined);
    }

    #[test]
    fn test_deepest_wildcard_wins() {
        let mut perms = PermissionSet::new();
        perms.set("*", true);
        perms.set("permkit.modify.*", false);

        assert_eq!(perms.value("permkit.modify.group.admin"), Tristate::False);
        assert_eq!(perms.value("essentials.fly"), Tristate::True);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let actor = Actor::holder(HolderId::user("u1")).with_permission("Permkit.User.Meta.Set", true);
        assert_eq!(actor.permission("permkit.user.meta.SET"), Tristate::True);
        assert!(actor.is(&HolderId::user("u1")));
        assert!(!actor.is_console());
    }
}
