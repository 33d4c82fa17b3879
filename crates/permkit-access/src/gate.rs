//! The authorization gate.
//!
//! The gate only reads. It runs before any mutation step, so a denial never
//! needs a rollback.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use permkit_core::{ContextSet, HolderId, Tristate};
use permkit_store::HolderSnapshot;

use crate::action::Action;
use crate::actor::Actor;
use crate::error::Denial;

/// Configuration for [`StandardPolicy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Check the `permkit.modify.*`, `.usecontext.*` and `.arguments.*`
    /// permissions. When off, only the action permission is required.
    pub argument_based_permissions: bool,
    /// Actors may only modify holders with a strictly lower weight.
    pub require_higher_weight: bool,
    /// Keys (and their dotted children) whose `.arguments.<key>` permission
    /// must be TRUE rather than merely not FALSE.
    pub privileged_keys: BTreeSet<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            argument_based_permissions: true,
            require_higher_weight: false,
            privileged_keys: ["weight".to_string()].into_iter().collect(),
        }
    }
}

/// Everything the gate needs to judge one request.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub actor: &'a Actor,
    pub target: &'a HolderSnapshot,
    pub action: Action,
    pub context: &'a ContextSet,
    pub arguments: &'a [&'a str],
}

impl GateRequest<'_> {
    /// The permission guarding this action on this target.
    pub fn permission(&self) -> String {
        self.action.permission(self.target.holder.kind())
    }
}

/// The three checks, each returning its own denial.
pub trait AccessPolicy: Send + Sync {
    /// May the actor alter this holder at all?
    fn check_modify(&self, request: &GateRequest<'_>) -> Result<(), Denial>;

    /// May the actor scope a change to the requested context?
    fn check_context(&self, request: &GateRequest<'_>) -> Result<(), Denial>;

    /// May the actor use these argument values?
    fn check_arguments(&self, request: &GateRequest<'_>) -> Result<(), Denial>;
}

/// Runs an [`AccessPolicy`]'s checks in order, short-circuiting.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationGate<P = StandardPolicy> {
    policy: P,
}

impl<P: AccessPolicy> AuthorizationGate<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Modify, then context, then arguments.
    pub fn check(&self, request: &GateRequest<'_>) -> Result<(), Denial> {
        self.policy.check_modify(request)?;
        self.policy.check_context(request)?;
        self.policy.check_arguments(request)
    }
}

/// Permission-based policy. The console passes every check.
#[derive(Debug, Clone, Default)]
pub struct StandardPolicy {
    config: GateConfig,
}

impl StandardPolicy {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    fn is_privileged(&self, argument: &str) -> bool {
        let argument = argument.to_lowercase();
        self.config.privileged_keys.iter().any(|key| {
            argument == *key
                || argument
                    .strip_prefix(key.as_str())
                    .map_or(false, |rest| rest.starts_with('.'))
        })
    }
}

fn modify_permission(actor: &Actor, target: &HolderId) -> String {
    match target {
        HolderId::User(_) if actor.is(target) => "permkit.modify.user.self".to_string(),
        HolderId::User(_) => "permkit.modify.user.others".to_string(),
        HolderId::Group(name) => format!("permkit.modify.group.{}", name),
    }
}

impl AccessPolicy for StandardPolicy {
    fn check_modify(&self, request: &GateRequest<'_>) -> Result<(), Denial> {
        let actor = request.actor;
        if actor.is_console() {
            return Ok(());
        }
        let target = &request.target.holder;
        let deny = |reason: String| Denial::Modify {
            target: target.clone(),
            reason,
        };

        let permission = request.permission();
        if actor.permission(&permission) != Tristate::True {
            return Err(deny(format!("missing {}", permission)));
        }

        if self.config.argument_based_permissions {
            let modify = modify_permission(actor, target);
            if actor.permission(&modify) == Tristate::False {
                return Err(deny(format!("{} is denied", modify)));
            }
        }

        if self.config.require_higher_weight {
            let actor_weight = actor.weight().unwrap_or(0);
            let target_weight = request.target.weight().unwrap_or(0);
            if actor_weight <= target_weight {
                return Err(deny(format!(
                    "actor weight {} does not exceed target weight {}",
                    actor_weight, target_weight
                )));
            }
        }

        Ok(())
    }

    fn check_context(&self, request: &GateRequest<'_>) -> Result<(), Denial> {
        let actor = request.actor;
        if actor.is_console() {
            return Ok(());
        }
        let deny = |reason: String| Denial::Context {
            context: request.context.to_string(),
            reason,
        };

        if let Some(bound) = actor.context_bound() {
            if !request.context.compare(bound).is_at_least() {
                return Err(deny(format!("actor is limited to {}", bound)));
            }
        }

        if self.config.argument_based_permissions {
            let base = format!("{}.usecontext", request.permission());
            if request.context.is_empty() {
                let global = format!("{}.global", base);
                if actor.permission(&global) == Tristate::False {
                    return Err(deny(format!("{} is denied", global)));
                }
            }
            for (key, value) in request.context.pairs() {
                let pair = format!("{}.{}.{}", base, key, value);
                if actor.permission(&pair) == Tristate::False {
                    return Err(deny(format!("{} is denied", pair)));
                }
            }
        }

        Ok(())
    }

    fn check_arguments(&self, request: &GateRequest<'_>) -> Result<(), Denial> {
        let actor = request.actor;
        if actor.is_console() {
            return Ok(());
        }

        let base = format!("{}.arguments", request.permission());
        for argument in request.arguments {
            let permission = format!("{}.{}", base, argument);
            let value = actor.permission(&permission);
            let allowed = if self.is_privileged(argument) {
                value == Tristate::True
            } else {
                !self.config.argument_based_permissions || value != Tristate::False
            };
            if !allowed {
                return Err(Denial::Argument {
                    argument: argument.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permkit_core::Node;
    use std::sync::Arc;

    fn target(holder: HolderId, nodes: Vec<Node>) -> HolderSnapshot {
        HolderSnapshot {
            holder,
            enduring: Arc::new(nodes),
            transient: Arc::new(Vec::new()),
        }
    }

    fn moderator() -> Actor {
        Actor::holder(HolderId::user("mod"))
            .with_permission("permkit.group.meta.set", true)
            .with_permission("permkit.user.meta.set", true)
    }

    fn check(
        gate: &AuthorizationGate,
        actor: &Actor,
        target: &HolderSnapshot,
        ctx: &ContextSet,
        args: &[&str],
    ) -> Result<(), Denial> {
        gate.check(&GateRequest {
            actor,
            target,
            action: Action::MetaSet,
            context: ctx,
            arguments: args,
        })
    }

    #[test]
    fn test_console_bypasses_everything() {
        let gate = AuthorizationGate::default();
        let group = target(HolderId::group("admin"), vec![]);
        let result = check(&gate, &Actor::console(), &group, &ContextSet::global(), &["weight"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_action_permission_denied() {
        let gate = AuthorizationGate::default();
        let group = target(HolderId::group("admin"), vec![]);
        let actor = Actor::holder(HolderId::user("nobody"));
        let denial = check(&gate, &actor, &group, &ContextSet::global(), &["prefix"]).unwrap_err();
        assert_eq!(denial.code(), "NoPermission");
    }

    #[test]
    fn test_modify_group_denied() {
        let gate = AuthorizationGate::default();
        let group = target(HolderId::group("admin"), vec![]);
        let actor = moderator().with_permission("permkit.modify.group.admin", false);
        let denial = check(&gate, &actor, &group, &ContextSet::global(), &["prefix"]).unwrap_err();
        assert!(matches!(denial, Denial::Modify { .. }));

        let other = target(HolderId::group("builder"), vec![]);
        assert!(check(&gate, &actor, &other, &ContextSet::global(), &["prefix"]).is_ok());
    }

    #[test]
    fn test_self_modification_denied() {
        let gate = AuthorizationGate::default();
        let me = target(HolderId::user("mod"), vec![]);
        let actor = moderator().with_permission("permkit.modify.user.self", false);
        let denial = check(&gate, &actor, &me, &ContextSet::global(), &["prefix"]).unwrap_err();
        assert!(matches!(denial, Denial::Modify { .. }));

        let someone = target(HolderId::user("someone"), vec![]);
        assert!(check(&gate, &actor, &someone, &ContextSet::global(), &["prefix"]).is_ok());
    }

    #[test]
    fn test_weight_rank() {
        let config = GateConfig {
            require_higher_weight: true,
            ..GateConfig::default()
        };
        let gate = AuthorizationGate::new(StandardPolicy::new(config));
        let admin = target(HolderId::group("admin"), vec![Node::grant("weight.100").build().unwrap()]);
        let member = target(HolderId::group("member"), vec![Node::grant("weight.10").build().unwrap()]);
        let actor = moderator().with_weight(50);

        assert!(matches!(
            check(&gate, &actor, &admin, &ContextSet::global(), &["prefix"]),
            Err(Denial::Modify { .. })
        ));
        assert!(check(&gate, &actor, &member, &ContextSet::global(), &["prefix"]).is_ok());
    }

    #[test]
    fn test_context_bound() {
        let gate = AuthorizationGate::default();
        let group = target(HolderId::group("member"), vec![]);
        let lobby = ContextSet::singleton("server", "lobby").unwrap();
        let actor = moderator().with_context_bound(lobby.clone());

        let denial = check(&gate, &actor, &group, &ContextSet::global(), &["prefix"]).unwrap_err();
        assert_eq!(denial.code(), "NoContextPermission");

        let narrower = lobby.clone().with("world", "nether").unwrap();
        assert!(check(&gate, &actor, &group, &lobby, &["prefix"]).is_ok());
        assert!(check(&gate, &actor, &group, &narrower, &["prefix"]).is_ok());
    }

    #[test]
    fn test_usecontext_permission() {
        let gate = AuthorizationGate::default();
        let group = target(HolderId::group("member"), vec![]);
        let actor = moderator()
            .with_permission("permkit.group.meta.set.usecontext.global", false)
            .with_permission("permkit.group.meta.set.usecontext.world.*", false);

        assert!(matches!(
            check(&gate, &actor, &group, &ContextSet::global(), &["prefix"]),
            Err(Denial::Context { .. })
        ));
        let nether = ContextSet::singleton("world", "nether").unwrap();
        assert!(matches!(
            check(&gate, &actor, &group, &nether, &["prefix"]),
            Err(Denial::Context { .. })
        ));
        let lobby = ContextSet::singleton("server", "lobby").unwrap();
        assert!(check(&gate, &actor, &group, &lobby, &["prefix"]).is_ok());
    }

    #[test]
    fn test_argument_permissions() {
        let gate = AuthorizationGate::default();
        let group = target(HolderId::group("member"), vec![]);
        let global = ContextSet::global();

        let actor = moderator().with_permission("permkit.group.meta.set.arguments.suffix", false);
        assert_eq!(
            check(&gate, &actor, &group, &global, &["suffix"]).unwrap_err(),
            Denial::Argument { argument: "suffix".into() }
        );
        assert!(check(&gate, &actor, &group, &global, &["prefix"]).is_ok());

        // Privileged keys need a TRUE value, undefined is not enough.
        assert!(check(&gate, &actor, &group, &global, &["weight"]).is_err());
        let trusted = actor.with_permission("permkit.group.meta.set.arguments.weight", true);
        assert!(check(&gate, &trusted, &group, &global, &["weight"]).is_ok());
    }

    #[test]
    fn test_checks_run_in_order() {
        let gate = AuthorizationGate::default();
        let group = target(HolderId::group("admin"), vec![]);
        // Fails all three; only the first is reported.
        let actor = moderator()
            .with_permission("permkit.modify.group.admin", false)
            .with_permission("permkit.group.meta.set.usecontext.global", false)
            .with_permission("permkit.group.meta.set.arguments.prefix", false);
        let denial = check(&gate, &actor, &group, &ContextSet::global(), &["prefix"]).unwrap_err();
        assert!(matches!(denial, Denial::Modify { .. }));
    }
}
