//! Strong type definitions for holders, actors and tristate lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Whether a holder is an individual user or a group of users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HolderKind {
    User,
    Group,
}

impl HolderKind {
    /// Lower-case label used in permission names and display.
    pub fn as_str(self) -> &'static str {
        match self {
            HolderKind::User => "user",
            HolderKind::Group => "group",
        }
    }
}

/// Identity of a permission holder.
///
/// Users are keyed by an opaque platform identifier (kept verbatim). Groups
/// are keyed by name, normalized to lower case so `Admin` and `admin` are the
/// same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HolderId {
    User(String),
    Group(String),
}

impl HolderId {
    /// Create a user holder id.
    pub fn user(id: impl Into<String>) -> Self {
        HolderId::User(id.into().trim().to_string())
    }

    /// Create a group holder id. The name is lower-cased.
    pub fn group(name: impl AsRef<str>) -> Self {
        HolderId::Group(name.as_ref().trim().to_lowercase())
    }

    /// The kind of holder.
    pub fn kind(&self) -> HolderKind {
        match self {
            HolderId::User(_) => HolderKind::User,
            HolderId::Group(_) => HolderKind::Group,
        }
    }

    /// The user id or group name.
    pub fn name(&self) -> &str {
        match self {
            HolderId::User(id) | HolderId::Group(id) => id,
        }
    }

    /// A holder id is valid if its name is non-empty.
    pub fn is_valid(&self) -> bool {
        !self.name().is_empty()
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.name())
    }
}

/// Identity of whoever requested a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorId {
    /// The server console. Bypasses all authorization checks.
    Console,
    /// A user acting through the command layer.
    Holder(HolderId),
}

impl ActorId {
    /// The holder this actor acts as, if any.
    pub fn holder(&self) -> Option<&HolderId> {
        match self {
            ActorId::Console => None,
            ActorId::Holder(id) => Some(id),
        }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Console => write!(f, "console"),
            ActorId::Holder(id) => write!(f, "{}", id),
        }
    }
}

/// Three-valued permission lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tristate {
    True,
    False,
    #[default]
    Undefined,
}

impl Tristate {
    /// `true` only for [`Tristate::True`].
    pub fn as_bool(self) -> bool {
        matches!(self, Tristate::True)
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Tristate::True,
            Some(false) => Tristate::False,
            None => Tristate::Undefined,
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

/// Current wall-clock time in Unix milliseconds.
///
/// A clock set before the epoch reads as 0; one past `i64::MAX` saturates.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
