//! Materialized graph nodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::NodeId;

/// A node as handed to the host store.
///
/// The normalized payload is flattened next to `id` and `internal`, matching
/// the shape downstream resolvers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    pub internal: NodeInternal,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Bookkeeping the host store uses to type, diff and attribute a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInternal {
    #[serde(rename = "type")]
    pub type_name: String,

    pub content_digest: String,

    pub owner: String,
}

impl Node {
    /// Build a node, dropping payload keys that would shadow `id` or `internal`.
    pub fn new(id: NodeId, internal: NodeInternal, mut fields: Map<String, Value>) -> Self {
        strip_reserved(&mut fields);
        Self {
            id,
            internal,
            fields,
        }
    }

    /// The node's type name.
    pub fn type_name(&self) -> &str {
        &self.internal.type_name
    }

    /// A payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Remove the payload keys a node reserves for itself.
pub(crate) fn strip_reserved(fields: &mut Map<String, Value>) {
    fields.remove("id");
    fields.remove("internal");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn internal() -> NodeInternal {
        NodeInternal {
            type_name: "Contentstack_post".to_string(),
            content_digest: "abc".to_string(),
            owner: "stacksync".to_string(),
        }
    }

    #[test]
    fn serializes_flat() {
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("Hi"));
        let node = Node::new(NodeId::new("n1"), internal(), fields);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "n1",
                "internal": { "type": "Contentstack_post", "contentDigest": "abc", "owner": "stacksync" },
                "title": "Hi"
            })
        );

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn payload_cannot_shadow_identity() {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!("spoofed"));
        fields.insert("internal".to_string(), json!({}));
        let node = Node::new(NodeId::new("n1"), internal(), fields);

        assert!(node.fields.is_empty());
        assert_eq!(node.id.as_str(), "n1");
    }
}
