//! Filesystem storage for synced nodes.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use stacksync_core::Result;
use stacksync_core::error::{Error, StoreError};
use stacksync_core::node::Node;
use stacksync_core::schema::TypeDecl;
use stacksync_core::traits::{NodeStore, SchemaSink, StatusStore};
use stacksync_core::types::NodeId;

fn map_io(err: std::io::Error) -> Error {
    Error::Store(StoreError::Io {
        message: format!("IO error: {}", err),
    })
}

fn corrupt(path: &Path, reason: impl ToString) -> Error {
    Error::Store(StoreError::Corrupt {
        path: path.display().to_string(),
        reason: reason.to_string(),
    })
}

/// One line of the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// RFC 3339 timestamp.
    pub time: String,
    pub op: JournalOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalOp {
    Create,
    Delete,
}

/// A node store rooted at a directory.
///
/// ## Directory Structure
///
/// ```text
/// $ROOT/
/// ├── nodes/
/// │   └── <node id>.json
/// ├── status.json
/// ├── schema.graphql
/// ├── journal.jsonl
/// └── journal.lock
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn nodes_dir(&self) -> PathBuf {
        self.root.join("nodes")
    }

    /// Convert a node id into a filesystem-safe file name.
    ///
    /// Path separators, `:` and `%` are percent-escaped, so distinct ids
    /// never share a file.
    fn node_file_name(id: &NodeId) -> String {
        let mut safe = String::with_capacity(id.as_str().len() + 5);
        for c in id.as_str().chars() {
            match c {
                '/' | '\\' | ':' | '%' => safe.push_str(&format!("%{:02X}", u32::from(c))),
                c => safe.push(c),
            }
        }
        safe.push_str(".json");
        safe
    }

    fn node_path(&self, id: &NodeId) -> PathBuf {
        self.nodes_dir().join(Self::node_file_name(id))
    }

    fn status_path(&self) -> PathBuf {
        self.root.join("status.json")
    }

    /// Path of the rendered schema document.
    pub fn schema_path(&self) -> PathBuf {
        self.root.join("schema.graphql")
    }

    /// Path of the append-only journal.
    pub fn journal_path(&self) -> PathBuf {
        self.root.join("journal.jsonl")
    }

    fn journal_lock_path(&self) -> PathBuf {
        self.root.join("journal.lock")
    }

    /// Write `content` to `path` via a temporary sibling, then rename.
    fn write_atomic(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content).map_err(map_io)?;
        fs::rename(&tmp, path).map_err(map_io)?;
        Ok(())
    }

    fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(map_io)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| corrupt(path, e))
    }

    /// Append an operation to the journal under an exclusive lock.
    fn append_journal(&self, node: &Node, op: JournalOp) -> Result<()> {
        let journal_path = self.journal_path();
        let lock_path = self.journal_lock_path();

        fs::create_dir_all(&self.root).map_err(map_io)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(map_io)?;

        lock_file.lock_exclusive().map_err(map_io)?;

        let entry = JournalEntry {
            id: node.id.to_string(),
            type_name: node.type_name().to_string(),
            time: Utc::now().to_rfc3339(),
            op,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&journal_path)
            .map_err(map_io)?;

        let line = serde_json::to_string(&entry).map_err(|e| corrupt(&journal_path, e))?;

        writeln!(file, "{}", line).map_err(map_io)?;
        file.sync_data().map_err(map_io)?;

        lock_file.unlock().map_err(map_io)?;

        Ok(())
    }

    /// Read the journal in append order. Unparseable lines are skipped.
    pub fn journal(&self) -> Result<Vec<JournalEntry>> {
        let path = self.journal_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&path).map_err(map_io)?;
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(map_io)?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => debug!(error = %e, line = %line, "Failed to parse journal line"),
            }
        }
        Ok(entries)
    }

    /// The rendered schema document, if one was written.
    pub fn read_schema(&self) -> Result<Option<String>> {
        let path = self.schema_path();
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path).map(Some).map_err(map_io)
    }
}

impl NodeStore for FileStore {
    #[instrument(skip(self, node), fields(id = %node.id))]
    fn create_node(&mut self, node: Node) -> Result<()> {
        let path = self.node_path(&node.id);
        let content = serde_json::to_string_pretty(&node).map_err(|e| corrupt(&path, e))?;
        Self::write_atomic(&path, &content)?;
        self.append_journal(&node, JournalOp::Create)?;
        debug!(node_type = node.type_name(), "Stored node");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete_node(&mut self, id: &NodeId) -> Result<()> {
        let path = self.node_path(id);
        let Some(node) = Self::read_json::<Node>(&path)? else {
            return Ok(());
        };
        fs::remove_file(&path).map_err(map_io)?;
        self.append_journal(&node, JournalOp::Delete)?;
        debug!("Removed node");
        Ok(())
    }

    /// Nodes on disk persist until deleted, so touching only checks presence.
    fn touch_node(&mut self, id: &NodeId) -> Result<()> {
        if !self.node_path(id).exists() {
            debug!(id = %id, "Touched missing node");
        }
        Ok(())
    }

    fn get_node(&self, id: &NodeId) -> Result<Option<Node>> {
        Self::read_json(&self.node_path(id))
    }

    fn get_nodes(&self) -> Result<Vec<Node>> {
        let dir = self.nodes_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(map_io)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut nodes = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(node) = Self::read_json(&path)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }
}

impl StatusStore for FileStore {
    fn status(&self) -> Result<Map<String, Value>> {
        Ok(Self::read_json(&self.status_path())?.unwrap_or_default())
    }

    #[instrument(skip(self, state))]
    fn set_status(&mut self, state: Map<String, Value>) -> Result<()> {
        let mut status = self.status()?;
        status.extend(state);
        let path = self.status_path();
        let content = serde_json::to_string_pretty(&status).map_err(|e| corrupt(&path, e))?;
        Self::write_atomic(&path, &content)
    }
}

impl SchemaSink for FileStore {
    /// Writes the declarations as one SDL document, replacing any previous one.
    #[instrument(skip(self, types), fields(count = types.len()))]
    fn create_types(&mut self, types: Vec<TypeDecl>) -> Result<()> {
        if types.is_empty() {
            warn!("No schema types to write");
        }
        let sdl = types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n");
        Self::write_atomic(&self.schema_path(), &format!("{}\n", sdl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_file_names_are_safe() {
        assert_eq!(
            FileStore::node_file_name(&NodeId::new("a/b:c")),
            "a%2Fb%3Ac.json"
        );
        assert_eq!(FileStore::node_file_name(&NodeId::new("a\\b")), "a%5Cb.json");
        assert_eq!(
            FileStore::node_file_name(&NodeId::new("uuid-1234")),
            "uuid-1234.json"
        );
    }

    #[test]
    fn distinct_ids_get_distinct_files() {
        let names: Vec<String> = ["a/b", "a_b", "a%2Fb", "a:b"]
            .into_iter()
            .map(|id| FileStore::node_file_name(&NodeId::new(id)))
            .collect();
        let unique: std::collections::HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}
