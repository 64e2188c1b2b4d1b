//! In-memory host store.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::Result;
use crate::node::Node;
use crate::schema::TypeDecl;
use crate::traits::{NodeStore, SchemaSink, StatusStore};
use crate::types::NodeId;

/// A host store that keeps everything in memory.
///
/// Nodes are kept in id order, so listings are deterministic. Tracks which
/// nodes were created or touched since the last [`reset_touched`](Self::reset_touched),
/// which lets an embedding host sweep stale nodes after a cycle.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: BTreeMap<NodeId, Node>,
    touched: HashSet<NodeId>,
    status: Map<String, Value>,
    types: Vec<TypeDecl>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of one type, in id order.
    pub fn nodes_of_type(&self, type_name: &str) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| n.type_name() == type_name)
            .collect()
    }

    /// Forget which nodes were touched. Call before a cycle.
    pub fn reset_touched(&mut self) {
        self.touched.clear();
    }

    /// Whether a node was created or touched since the last reset.
    pub fn was_touched(&self, id: &NodeId) -> bool {
        self.touched.contains(id)
    }

    /// Owned nodes neither created nor touched since the last reset.
    pub fn stale_nodes(&self, owner: &str) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| n.internal.owner == owner && !self.touched.contains(&n.id))
            .collect()
    }

    /// Schema declarations received through [`SchemaSink`].
    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }
}

impl NodeStore for MemoryStore {
    fn create_node(&mut self, node: Node) -> Result<()> {
        self.touched.insert(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn delete_node(&mut self, id: &NodeId) -> Result<()> {
        self.nodes.remove(id);
        self.touched.remove(id);
        Ok(())
    }

    fn touch_node(&mut self, id: &NodeId) -> Result<()> {
        if self.nodes.contains_key(id) {
            self.touched.insert(id.clone());
        }
        Ok(())
    }

    fn get_node(&self, id: &NodeId) -> Result<Option<Node>> {
        Ok(self.nodes.get(id).cloned())
    }

    fn get_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.nodes.values().cloned().collect())
    }
}

impl StatusStore for MemoryStore {
    fn status(&self) -> Result<Map<String, Value>> {
        Ok(self.status.clone())
    }

    fn set_status(&mut self, state: Map<String, Value>) -> Result<()> {
        self.status.extend(state);
        Ok(())
    }
}

impl SchemaSink for MemoryStore {
    fn create_types(&mut self, types: Vec<TypeDecl>) -> Result<()> {
        self.types.extend(types);
        Ok(())
    }
}
