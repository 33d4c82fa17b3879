//! CBOR encoding and fingerprinting of node collections.
//!
//! Encoding is deterministic: struct fields serialize in declaration order
//! and context sets are ordered maps, so the same collection always produces
//! the same bytes and the same [`Fingerprint`]. Storage backends use the
//! fingerprint to recognise repeated saves of an unchanged snapshot.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::node::Node;

/// Encode a node collection to CBOR bytes.
pub fn encode_nodes(nodes: &[Node]) -> Result<Bytes> {
    let mut buf = Vec::new();
    ciborium::into_writer(nodes, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Decode a node collection, validating every node.
pub fn decode_nodes(bytes: &[u8]) -> Result<Vec<Node>> {
    let nodes: Vec<Node> =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    for node in &nodes {
        node.validate()?;
    }
    Ok(nodes)
}

/// Blake3 digest of an encoded collection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Fingerprint raw encoded bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Encode then fingerprint a collection.
    pub fn of_nodes(nodes: &[Node]) -> Result<Self> {
        Ok(Self::of_bytes(&encode_nodes(nodes)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextSet;

    fn sample() -> Vec<Node> {
        let ctx = ContextSet::from_pairs([("world", "nether"), ("server", "lobby")]).unwrap();
        vec![
            Node::grant("fly").context(ctx.clone()).build().unwrap(),
            Node::meta("prefix", "[Mod]").context(ctx).expiry(5000).build().unwrap(),
        ]
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = encode_nodes(&sample()).unwrap();
        let b = encode_nodes(&sample()).unwrap();
        assert_eq!(a, b);
        assert_eq!(Fingerprint::of_nodes(&sample()).unwrap(), Fingerprint::of_bytes(&a));
    }

    #[test]
    fn test_decode_restores_collection() {
        let bytes = encode_nodes(&sample()).unwrap();
        assert_eq!(decode_nodes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_nodes(&[0xff, 0x00]), Err(CoreError::DecodingError(_))));
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let mut nodes = sample();
        let before = Fingerprint::of_nodes(&nodes).unwrap();
        nodes.pop();
        assert_ne!(before, Fingerprint::of_nodes(&nodes).unwrap());
    }
}
