//! Context sets and the specificity ordering between them.
//!
//! A context set scopes a node: `{world=nether}` means the node only applies
//! while the principal is in the nether. A key may accept several values
//! (`{server=[lobby, hub]}`). The empty set is the global context.
//!
//! Specificity is a partial order by constraint containment: a set that
//! requires every pair another set requires (and possibly more) is more
//! specific. Sets with no containment relation are incomparable, and the
//! ordering says nothing about which of them should win.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Context keys starting with this prefix are reserved for the engine and
/// may not be supplied by callers.
pub const RESERVED_CONTEXT_NAMESPACE: &str = "permkit:";

/// Outcome of comparing context set `A` against `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specificity {
    /// `A` requires strictly more than `B`.
    MoreSpecific,
    /// `B` requires strictly more than `A`.
    LessSpecific,
    /// Both require exactly the same pairs.
    Equal,
    /// Neither contains the other.
    Incomparable,
}

impl Specificity {
    /// The same comparison seen from the other side.
    pub fn reverse(self) -> Self {
        match self {
            Specificity::MoreSpecific => Specificity::LessSpecific,
            Specificity::LessSpecific => Specificity::MoreSpecific,
            other => other,
        }
    }

    /// `A` is at least as specific as `B`.
    pub fn is_at_least(self) -> bool {
        matches!(self, Specificity::MoreSpecific | Specificity::Equal)
    }
}

/// An unordered set of context constraints, keyed by context key.
///
/// Keys are trimmed and lower-cased. Values are trimmed. Keys with no values
/// are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextSet(BTreeMap<String, BTreeSet<String>>);

impl ContextSet {
    /// The empty (global) context.
    pub fn global() -> Self {
        Self::default()
    }

    /// A set holding a single pair.
    pub fn singleton(key: &str, value: &str) -> Result<Self> {
        let mut set = Self::default();
        set.insert(key, value)?;
        Ok(set)
    }

    /// Build a set from key/value pairs. Repeated keys accumulate values.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut set = Self::default();
        for (key, value) in pairs {
            set.insert(key.as_ref(), value.as_ref())?;
        }
        Ok(set)
    }

    /// Add a pair, consuming and returning the set.
    pub fn with(mut self, key: &str, value: &str) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Add a pair.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        let (key, value) = normalize_pair(key, value)?;
        self.0.entry(key).or_default().insert(value);
        Ok(())
    }

    /// Re-check every pair. Used on sets that arrive through deserialization.
    pub fn validate(&self) -> Result<()> {
        for (key, values) in &self.0 {
            if values.is_empty() {
                return Err(CoreError::InvalidContext(format!("key '{}' has no values", key)));
            }
            for value in values {
                let (k, v) = normalize_pair(key, value)?;
                if &k != key || &v != value {
                    return Err(CoreError::InvalidContext(format!(
                        "pair '{}={}' is not normalized",
                        key, value
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether this is the global context.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Whether the given pair is required.
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.0.get(key).map_or(false, |values| values.contains(value))
    }

    /// Values accepted for a key.
    pub fn values(&self, key: &str) -> impl Iterator<Item = &str> {
        self.0.get(key).into_iter().flatten().map(String::as_str)
    }

    /// All pairs, ordered by key then value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Every pair of `other` is also a pair of `self`.
    pub fn is_superset_of(&self, other: &ContextSet) -> bool {
        other.pairs().all(|(k, v)| self.contains(k, v))
    }

    /// Compare `self` (A) against `other` (B).
    pub fn compare(&self, other: &ContextSet) -> Specificity {
        match (self.is_superset_of(other), other.is_superset_of(self)) {
            (true, true) => Specificity::Equal,
            (true, false) => Specificity::MoreSpecific,
            (false, true) => Specificity::LessSpecific,
            (false, false) => Specificity::Incomparable,
        }
    }

    /// Whether a node scoped by `self` applies in the `active` context.
    ///
    /// Every key constrained here must be present in `active` with at least
    /// one of the accepted values.
    pub fn is_satisfied_by(&self, active: &ContextSet) -> bool {
        self.0
            .iter()
            .all(|(key, values)| values.iter().any(|v| active.contains(key, v)))
    }
}

impl fmt::Display for ContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "global");
        }
        let mut first = true;
        for (key, value) in self.pairs() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

fn normalize_pair(key: &str, value: &str) -> Result<(String, String)> {
    let key = key.trim().to_lowercase();
    let value = value.trim().to_string();

    if key.is_empty() {
        return Err(CoreError::InvalidContext("context key is empty".into()));
    }
    if value.is_empty() {
        return Err(CoreError::InvalidContext(format!("context '{}' has an empty value", key)));
    }
    if key.starts_with(RESERVED_CONTEXT_NAMESPACE) {
        return Err(CoreError::InvalidContext(format!("context key '{}' is reserved", key)));
    }
    Ok((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> ContextSet {
        ContextSet::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_compare_equal() {
        let a = ctx(&[("world", "nether"), ("server", "lobby")]);
        let b = ctx(&[("server", "lobby"), ("world", "nether")]);
        assert_eq!(a.compare(&b), Specificity::Equal);
        assert_eq!(ContextSet::global().compare(&ContextSet::global()), Specificity::Equal);
    }

    #[test]
    fn test_compare_more_specific() {
        let a = ctx(&[("world", "nether"), ("server", "lobby")]);
        let b = ctx(&[("world", "nether")]);
        assert_eq!(a.compare(&b), Specificity::MoreSpecific);
        assert_eq!(b.compare(&a), Specificity::LessSpecific);
        assert_eq!(b.compare(&ContextSet::global()), Specificity::MoreSpecific);
    }

    #[test]
    fn test_compare_incomparable() {
        let a = ctx(&[("world", "nether")]);
        let b = ctx(&[("server", "lobby")]);
        assert_eq!(a.compare(&b), Specificity::Incomparable);

        let c = ctx(&[("world", "end")]);
        assert_eq!(a.compare(&c), Specificity::Incomparable);
    }

    #[test]
    fn test_multi_value_containment() {
        let both = ctx(&[("server", "lobby"), ("server", "hub")]);
        let one = ctx(&[("server", "lobby")]);
        assert_eq!(both.len(), 2);
        assert_eq!(both.compare(&one), Specificity::MoreSpecific);
    }

    #[test]
    fn test_normalization() {
        let set = ctx(&[(" World ", " nether ")]);
        assert!(set.contains("world", "nether"));
        assert_eq!(set.to_string(), "world=nether");
        assert_eq!(ContextSet::global().to_string(), "global");
    }

    #[test]
    fn test_reserved_and_empty_rejected() {
        assert!(matches!(
            ContextSet::singleton("permkit:internal", "x"),
            Err(CoreError::InvalidContext(_))
        ));
        assert!(matches!(ContextSet::singleton("", "x"), Err(CoreError::InvalidContext(_))));
        assert!(matches!(ContextSet::singleton("world", "  "), Err(CoreError::InvalidContext(_))));
    }

    #[test]
    fn test_satisfied_by() {
        let required = ctx(&[("server", "lobby"), ("server", "hub")]);
        let active = ctx(&[("server", "hub"), ("world", "overworld")]);
        assert!(required.is_satisfied_by(&active));
        assert!(ContextSet::global().is_satisfied_by(&active));

        let nether = ctx(&[("world", "nether")]);
        assert!(!nether.is_satisfied_by(&active));
    }

    #[test]
    fn test_validate_rejects_denormalized() {
        let json = r#"{"World":["nether"]}"#;
        let set: ContextSet = serde_json::from_str(json).unwrap();
        assert!(set.validate().is_err());

        let ok: ContextSet = serde_json::from_str(r#"{"world":["nether"]}"#).unwrap();
        assert!(ok.validate().is_ok());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn context_set() -> impl Strategy<Value = ContextSet> {
            prop::collection::vec(("[a-c]", "[x-z]"), 0..4)
                .prop_map(|pairs| ContextSet::from_pairs(pairs).unwrap())
        }

        proptest! {
            #[test]
            fn test_compare_reverses(a in context_set(), b in context_set()) {
                prop_assert_eq!(b.compare(&a), a.compare(&b).reverse());
            }

            #[test]
            fn test_compare_transitive(
                a in context_set(),
                b in context_set(),
                c in context_set(),
            ) {
                if a.compare(&b).is_at_least() && b.compare(&c).is_at_least() {
                    prop_assert!(a.compare(&c).is_at_least());
                }
            }

            #[test]
            fn test_superset_satisfied_wherever_subset_is_required(
                a in context_set(),
                b in context_set(),
            ) {
                // A required set is always satisfied by itself, and so by
                // any active context containing it.
                let union = ContextSet::from_pairs(a.pairs().chain(b.pairs())).unwrap();
                prop_assert!(a.is_satisfied_by(&union));
                prop_assert!(b.is_satisfied_by(&union));
                prop_assert!(union.compare(&a).is_at_least());
            }
        }
    }
}
