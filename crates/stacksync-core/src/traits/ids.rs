//! Identity and digest collaborators.

use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::OWNER;
use crate::types::NodeId;

/// Deterministic node id generator.
///
/// Any `Fn(&str) -> NodeId` is an id factory, which lets hosts plug in their
/// own scheme.
pub trait IdFactory {
    fn create_node_id(&self, key: &str) -> NodeId;
}

impl<F> IdFactory for F
where
    F: Fn(&str) -> NodeId,
{
    fn create_node_id(&self, key: &str) -> NodeId {
        self(key)
    }
}

/// UUIDv5 ids in a namespace derived from a fixed name.
#[derive(Debug, Clone, Copy)]
pub struct Uuid5Ids {
    namespace: Uuid,
}

impl Uuid5Ids {
    /// Ids in the namespace derived from `name`.
    pub fn new(name: &str) -> Self {
        Self {
            namespace: Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()),
        }
    }
}

impl Default for Uuid5Ids {
    fn default() -> Self {
        Self::new(OWNER)
    }
}

impl IdFactory for Uuid5Ids {
    fn create_node_id(&self, key: &str) -> NodeId {
        NodeId::new(Uuid::new_v5(&self.namespace, key.as_bytes()).to_string())
    }
}

/// Content hash used as a node's `contentDigest`.
pub trait ContentDigester {
    fn digest(&self, payload: &Value) -> String;
}

/// Lowercase hex SHA-256 of the payload's JSON encoding.
///
/// Object keys serialize in sorted order, so equal payloads hash equally
/// regardless of how they were built.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl ContentDigester for Sha256Digest {
    fn digest(&self, payload: &Value) -> String {
        let bytes = serde_json::to_vec(payload).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}
