//! Audit entries.
//!
//! A mutation describes itself as an [`ActionRecord`]; the [`AuditLog`]
//! stamps it with a sequence number and timestamp, producing an
//! [`AuditEntry`]. Entries are never modified after they are stamped.
//!
//! [`AuditLog`]: crate::AuditLog

use serde::{Deserialize, Serialize};

use permkit_core::{ActorId, ContextSet, HolderId};

use crate::error::Result;

/// An unstamped description of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub(crate) actor_id: ActorId,
    pub(crate) holder_id: HolderId,
    pub(crate) verb: String,
    pub(crate) params: Vec<String>,
    pub(crate) context: ContextSet,
}

impl ActionRecord {
    /// Start a record of `actor` performing `verb` on `holder`.
    pub fn new(actor_id: ActorId, holder_id: HolderId, verb: impl Into<String>) -> Self {
        Self {
            actor_id,
            holder_id,
            verb: verb.into(),
            params: Vec::new(),
            context: ContextSet::global(),
        }
    }

    /// Append one parameter.
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Append several parameters, in order.
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    pub fn context(mut self, context: ContextSet) -> Self {
        self.context = context;
        self
    }

    pub fn holder_id(&self) -> &HolderId {
        &self.holder_id
    }

    pub(crate) fn stamp(self, seq: u64, timestamp: i64) -> AuditEntry {
        AuditEntry {
            seq,
            actor_id: self.actor_id,
            holder_id: self.holder_id,
            verb: self.verb,
            params: self.params,
            context: self.context,
            timestamp,
        }
    }
}

/// An immutable audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    seq: u64,
    actor_id: ActorId,
    holder_id: HolderId,
    verb: String,
    params: Vec<String>,
    context: ContextSet,
    timestamp: i64,
}

impl AuditEntry {
    /// Position in the global audit stream, starting at 1.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    pub fn holder_id(&self) -> &HolderId {
        &self.holder_id
    }

    /// Action verb, such as `meta set`.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn context(&self) -> &ContextSet {
        &self.context
    }

    /// Unix milliseconds. Never decreases for one holder.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Human-readable one-line description.
    pub fn describe(&self) -> String {
        let mut out = format!("{} -> {}: {}", self.actor_id, self.holder_id, self.verb);
        for param in &self.params {
            out.push(' ');
            out.push_str(param);
        }
        if !self.context.is_empty() {
            out.push_str(&format!(" [{}]", self.context));
        }
        out
    }

    /// JSON form for broadcast collaborators.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
