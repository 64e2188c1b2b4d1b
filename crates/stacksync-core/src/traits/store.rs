//! Host store traits.

use serde_json::{Map, Value};

use crate::Result;
use crate::node::Node;
use crate::schema::TypeDecl;
use crate::types::NodeId;

/// The host graph-node store.
///
/// All operations are keyed by [`NodeId`]. Creating a node whose id already
/// exists replaces it; deleting an absent node succeeds.
pub trait NodeStore {
    /// Create or replace a node.
    fn create_node(&mut self, node: Node) -> Result<()>;

    /// Delete a node. A missing node is not an error.
    fn delete_node(&mut self, id: &NodeId) -> Result<()>;

    /// Mark a node as still alive for this cycle.
    fn touch_node(&mut self, id: &NodeId) -> Result<()>;

    /// Look up one node.
    fn get_node(&self, id: &NodeId) -> Result<Option<Node>>;

    /// Every node in the store, whoever owns it.
    fn get_nodes(&self) -> Result<Vec<Node>>;

    /// Nodes whose `internal.owner` is `owner`.
    fn owned_nodes(&self, owner: &str) -> Result<Vec<Node>> {
        Ok(self
            .get_nodes()?
            .into_iter()
            .filter(|n| n.internal.owner == owner)
            .collect())
    }
}

/// Plugin-status storage, used to persist the sync cursor between cycles.
pub trait StatusStore {
    /// The current status document.
    fn status(&self) -> Result<Map<String, Value>>;

    /// Merge `state` into the status document.
    fn set_status(&mut self, state: Map<String, Value>) -> Result<()>;
}

/// Receives generated schema declarations.
pub trait SchemaSink {
    fn create_types(&mut self, types: Vec<TypeDecl>) -> Result<()>;
}
