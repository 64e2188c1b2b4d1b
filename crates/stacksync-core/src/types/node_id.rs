//! Node identity type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A graph node identity.
///
/// Produced by an [`IdFactory`](crate::traits::IdFactory) from an identity-key
/// string. The same key always yields the same id, which is what makes
/// re-creating a node an update rather than a duplicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an already-computed id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NodeId> for serde_json::Value {
    fn from(id: NodeId) -> Self {
        serde_json::Value::String(id.0)
    }
}
