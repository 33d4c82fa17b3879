//! Single-holder lookups over one node collection.
//!
//! Among the live nodes whose context is satisfied by the active context, the
//! winners are the maximal ones: nodes not strictly less specific than any
//! other candidate. When several maximal nodes remain (equal or incomparable
//! contexts) the latest-inserted one wins. Collections are kept in insertion
//! order, so "latest" is the highest index.
//!
//! Specificity counts required pairs, so a node scoped to
//! `{server=[lobby, hub]}` dominates one scoped to `{server=lobby}` wherever
//! both apply, even though it applies on more servers.
//!
//! Inheritance is never traversed here.

use crate::context::{ContextSet, Specificity};
use crate::node::Node;
use crate::types::Tristate;

/// The meta node that applies for `key` in the `active` context.
pub fn resolve_meta<'a>(
    nodes: &'a [Node],
    key: &str,
    active: &ContextSet,
    now: i64,
) -> Option<&'a Node> {
    select(nodes, active, now, |n| n.is_meta() && n.key() == key)
}

/// The value of `permission` in the `active` context.
pub fn resolve_grant(nodes: &[Node], permission: &str, active: &ContextSet, now: i64) -> Tristate {
    let permission = permission.trim().to_lowercase();
    select(nodes, active, now, |n| n.is_grant() && n.key() == permission)
        .map(|n| Tristate::from(n.value()))
        .unwrap_or_default()
}

fn select<'a>(
    nodes: &'a [Node],
    active: &ContextSet,
    now: i64,
    matches: impl Fn(&Node) -> bool,
) -> Option<&'a Node> {
    let candidates: Vec<&Node> = nodes
        .iter()
        .filter(|n| matches(n) && !n.has_expired(now) && n.context().is_satisfied_by(active))
        .collect();

    candidates
        .iter()
        .rev()
        .find(|candidate| {
            !candidates.iter().any(|other| {
                other.context().compare(candidate.context()) == Specificity::MoreSpecific
            })
        })
        .copied()
}
