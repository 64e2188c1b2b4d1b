//! Cycle-scoped index of known node identities.

use std::collections::HashSet;

use tracing::debug;

use crate::OWNER;
use crate::Result;
use crate::content::Changelog;
use crate::materialize::{asset_node_id, entry_node_id};
use crate::traits::{IdFactory, NodeStore};
use crate::types::{NodeId, TypePrefix};

/// The entry and asset identities that exist for this cycle.
///
/// Built once, before any entry is normalized, from the store's owned nodes
/// plus every identity the changelog is about to publish. Entries may
/// reference entries that appear later in the same changelog, so nothing may
/// be normalized until the index is complete. Nothing is ever removed: a
/// same-cycle unpublish is applied to the store afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    entries: HashSet<NodeId>,
    assets: HashSet<NodeId>,
}

impl ReferenceIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index for one cycle.
    ///
    /// Every pre-existing owned node is touched so the host keeps nodes this
    /// cycle does not rewrite.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a published item has no identity.
    pub fn build<S>(
        store: &mut S,
        changelog: &Changelog,
        ids: &dyn IdFactory,
        prefix: &TypePrefix,
    ) -> Result<Self>
    where
        S: NodeStore + ?Sized,
    {
        let asset_type = prefix.asset_type();
        let content_types_type = prefix.content_types_type();
        let mut index = Self::new();

        for node in store.owned_nodes(OWNER)? {
            let type_name = node.type_name();
            if type_name == asset_type {
                index.assets.insert(node.id.clone());
            } else if type_name != content_types_type {
                index.entries.insert(node.id.clone());
            }
            store.touch_node(&node.id)?;
        }

        let existing_entries = index.entries.len();
        let existing_assets = index.assets.len();

        for item in &changelog.entry_published {
            index.entries.insert(entry_node_id(&item.data, ids, prefix)?);
        }
        for item in &changelog.asset_published {
            index.assets.insert(asset_node_id(&item.data, ids, prefix)?);
        }

        debug!(
            existing_entries,
            existing_assets,
            entries = index.entries.len(),
            assets = index.assets.len(),
            "Built reference index"
        );

        Ok(index)
    }

    #[cfg(test)]
    pub(crate) fn insert_entry(&mut self, id: NodeId) {
        self.entries.insert(id);
    }

    #[cfg(test)]
    pub(crate) fn insert_asset(&mut self, id: NodeId) {
        self.assets.insert(id);
    }

    pub fn has_entry(&self, id: &NodeId) -> bool {
        self.entries.contains(id)
    }

    pub fn has_asset(&self, id: &NodeId) -> bool {
        self.assets.contains(id)
    }

    #[cfg(test)]
    pub(crate) fn entry_count(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn asset_count(&self) -> usize {
        self.assets.len()
    }
}
