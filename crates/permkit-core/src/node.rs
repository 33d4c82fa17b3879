//! Nodes: the unit of grant and meta assignment.
//!
//! A node is either a grant (`essentials.fly = true`) or a meta assignment
//! (`prefix = "[Mod]"`), scoped by a [`ContextSet`] and optionally expiring.
//! Nodes are immutable once built; an edit replaces the whole node.
//!
//! Meta nodes encode as `meta.<key>.<value>` with `.` and `\` escaped, and
//! grant keys may not use the `meta.` prefix, so the two kinds never collide
//! in their encoded form.

use serde::{Deserialize, Serialize};

use crate::context::ContextSet;
use crate::error::{CoreError, Result};

/// Encoded prefix of meta nodes. Reserved in grant keys.
pub const META_PREFIX: &str = "meta.";

/// Grant prefix carrying a holder's weight (`weight.100`).
pub const WEIGHT_PREFIX: &str = "weight.";

/// What a node assigns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    /// A capability being allowed or denied.
    Grant { permission: String },
    /// A free-form attribute.
    Meta { key: String, value: String },
}

/// Which node fields take part in an equality test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EqualityMode {
    /// Kind, key, value, context and expiry.
    Exact,
    /// Everything except the boolean value.
    IgnoreValue,
    /// Everything except the expiry.
    IgnoreExpiry,
    /// Only kind, key and context.
    IgnoreExpiryAndValue,
}

/// A single grant or meta assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    value: bool,
    context: ContextSet,
    /// Unix milliseconds after which the node no longer applies.
    expiry: Option<i64>,
}

impl Node {
    /// Start building a grant node.
    pub fn grant(permission: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(PendingKind::Grant(permission.into()))
    }

    /// Start building a meta node.
    pub fn meta(key: impl Into<String>, value: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(PendingKind::Meta(key.into(), value.into()))
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn context(&self) -> &ContextSet {
        &self.context
    }

    pub fn expiry(&self) -> Option<i64> {
        self.expiry
    }

    pub fn is_meta(&self) -> bool {
        matches!(self.kind, NodeKind::Meta { .. })
    }

    pub fn is_grant(&self) -> bool {
        matches!(self.kind, NodeKind::Grant { .. })
    }

    /// The grant permission or the meta key.
    pub fn key(&self) -> &str {
        match &self.kind {
            NodeKind::Grant { permission } => permission,
            NodeKind::Meta { key, .. } => key,
        }
    }

    /// The meta value, for meta nodes.
    pub fn meta_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Meta { value, .. } => Some(value),
            NodeKind::Grant { .. } => None,
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.expiry.is_some()
    }

    /// Whether the node has expired at `now` (Unix milliseconds).
    pub fn has_expired(&self, now: i64) -> bool {
        self.expiry.map_or(false, |expiry| now > expiry)
    }

    /// The holder weight carried by a `weight.<n>` grant.
    pub fn weight(&self) -> Option<i32> {
        match &self.kind {
            NodeKind::Grant { permission } if self.value => {
                permission.strip_prefix(WEIGHT_PREFIX)?.parse().ok()
            }
            _ => None,
        }
    }

    /// Canonical string form of the node key.
    pub fn encoded_key(&self) -> String {
        match &self.kind {
            NodeKind::Grant { permission } => permission.clone(),
            NodeKind::Meta { key, value } => {
                format!("{}{}.{}", META_PREFIX, escape(key), escape(value))
            }
        }
    }

    /// Compare two nodes under an equality mode.
    ///
    /// For meta nodes the meta value is part of the key, so `prefix=A` and
    /// `prefix=B` differ under every mode. Use [`Node::shares_slot`] to find
    /// nodes competing for the same key and context.
    pub fn equals(&self, other: &Node, mode: EqualityMode) -> bool {
        if self.kind != other.kind || self.context != other.context {
            return false;
        }
        match mode {
            EqualityMode::Exact => self.value == other.value && self.expiry == other.expiry,
            EqualityMode::IgnoreValue => self.expiry == other.expiry,
            EqualityMode::IgnoreExpiry => self.value == other.value,
            EqualityMode::IgnoreExpiryAndValue => true,
        }
    }

    /// Same kind, same key (ignoring any meta value) and same context.
    pub fn shares_slot(&self, other: &Node) -> bool {
        self.is_meta() == other.is_meta()
            && self.key() == other.key()
            && self.context == other.context
    }

    /// Re-check a node that arrived through deserialization.
    pub fn validate(&self) -> Result<()> {
        let rebuilt = match &self.kind {
            NodeKind::Grant { permission } => Node::grant(permission.as_str()),
            NodeKind::Meta { key, value } => Node::meta(key.as_str(), value.as_str()),
        }
        .value(self.value)
        .context(self.context.clone())
        .expiry_opt(self.expiry)
        .build()?;

        self.context.validate()?;
        if rebuilt.kind != self.kind {
            return Err(CoreError::InvalidKey(format!("'{}' is not normalized", self.key())));
        }
        Ok(())
    }
}

enum PendingKind {
    Grant(String),
    Meta(String, String),
}

/// Builder for [`Node`]. Validation happens in [`NodeBuilder::build`].
pub struct NodeBuilder {
    kind: PendingKind,
    value: bool,
    context: ContextSet,
    expiry: Option<i64>,
}

impl NodeBuilder {
    fn new(kind: PendingKind) -> Self {
        Self {
            kind,
            value: true,
            context: ContextSet::global(),
            expiry: None,
        }
    }

    /// Set the boolean value (defaults to `true`).
    pub fn value(mut self, value: bool) -> Self {
        self.value = value;
        self
    }

    /// Set the context scope (defaults to global).
    pub fn context(mut self, context: ContextSet) -> Self {
        self.context = context;
        self
    }

    /// Set an expiry in Unix milliseconds.
    pub fn expiry(mut self, expiry: i64) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn expiry_opt(mut self, expiry: Option<i64>) -> Self {
        self.expiry = expiry;
        self
    }

    /// Validate and build the node.
    pub fn build(self) -> Result<Node> {
        let kind = match self.kind {
            PendingKind::Grant(permission) => {
                let permission = permission.trim().to_lowercase();
                if permission.is_empty() {
                    return Err(CoreError::InvalidKey("permission is empty".into()));
                }
                if permission.starts_with(META_PREFIX) {
                    return Err(CoreError::InvalidKey(format!(
                        "permission '{}' uses the reserved '{}' prefix",
                        permission, META_PREFIX
                    )));
                }
                NodeKind::Grant { permission }
            }
            PendingKind::Meta(key, value) => {
                let key = key.trim().to_string();
                if key.is_empty() {
                    return Err(CoreError::InvalidKey("meta key is empty".into()));
                }
                if key.chars().any(char::is_control) {
                    return Err(CoreError::InvalidKey(format!(
                        "meta key '{}' contains control characters",
                        key.escape_debug()
                    )));
                }
                if value.chars().any(char::is_control) {
                    return Err(CoreError::InvalidValue(format!(
                        "meta value '{}' contains control characters",
                        value.escape_debug()
                    )));
                }
                NodeKind::Meta { key, value }
            }
        };

        Ok(Node {
            kind,
            value: self.value,
            context: self.context,
            expiry: self.expiry,
        })
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '.' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
