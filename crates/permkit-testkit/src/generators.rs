//! Proptest generators for property-based testing.

use proptest::prelude::*;

use permkit_core::{ContextSet, EqualityMode, Node};

/// Generate a context key.
pub fn context_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("server".to_string()),
        Just("world".to_string()),
        "[a-z]{1,6}".prop_map(String::from),
    ]
}

/// Generate a context value.
pub fn context_value() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,6}".prop_map(String::from)
}

/// Generate a context set with up to `max_pairs` pairs.
pub fn context_set_with(max_pairs: usize) -> impl Strategy<Value = ContextSet> {
    prop::collection::vec((context_key(), context_value()), 0..=max_pairs).prop_map(|pairs| {
        ContextSet::from_pairs(pairs).expect("generated pairs are valid")
    })
}

/// Generate a context set with up to four pairs.
pub fn context_set() -> impl Strategy<Value = ContextSet> {
    context_set_with(4)
}

/// Generate a grant permission such as `essentials.fly`.
pub fn permission() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}"
        .prop_filter("reserved meta prefix", |p| !p.starts_with("meta."))
        .prop_map(String::from)
}

/// Generate a meta key.
pub fn meta_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("prefix".to_string()),
        Just("suffix".to_string()),
        "[a-z][a-z0-9_]{0,11}".prop_map(String::from),
    ]
}

/// Generate a meta value. May be empty.
pub fn meta_value() -> impl Strategy<Value = String> {
    "[ -~]{0,16}".prop_map(String::from)
}

/// Generate an optional expiry.
pub fn expiry() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(1_600_000_000_000i64..=1_900_000_000_000i64)
}

/// Generate an EqualityMode.
pub fn equality_mode() -> impl Strategy<Value = EqualityMode> {
    prop_oneof![
        Just(EqualityMode::Exact),
        Just(EqualityMode::IgnoreValue),
        Just(EqualityMode::IgnoreExpiry),
        Just(EqualityMode::IgnoreExpiryAndValue),
    ]
}

/// Parameters for generating a node.
#[derive(Debug, Clone)]
pub struct NodeParams {
    /// `Some(value)` for a meta node, `None` for a grant.
    pub meta_value: Option<String>,
    pub key: String,
    pub value: bool,
    pub context: ContextSet,
    pub expiry: Option<i64>,
}

impl Arbitrary for NodeParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let grant = (permission(), Just(None::<String>));
        let meta = (meta_key(), meta_value().prop_map(Some));
        (
            prop_oneof![grant, meta],
            any::<bool>(),
            context_set_with(2),
            expiry(),
        )
            .prop_map(|((key, meta_value), value, context, expiry)| NodeParams {
                meta_value,
                key,
                value,
                context,
                expiry,
            })
            .boxed()
    }
}

/// Build a node from parameters.
pub fn node_from_params(params: &NodeParams) -> Node {
    let builder = match &params.meta_value {
        Some(value) => Node::meta(params.key.as_str(), value.as_str()),
        None => Node::grant(params.key.as_str()),
    };
    builder
        .value(params.value)
        .context(params.context.clone())
        .expiry_opt(params.expiry)
        .build()
        .expect("generated node params are valid")
}

/// Generate a node.
pub fn node() -> impl Strategy<Value = Node> {
    any::<NodeParams>().prop_map(|params| node_from_params(&params))
}
