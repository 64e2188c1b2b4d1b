//! stacksync-core - Contentstack content normalization and incremental sync.
//!
//! Turns content types and sync changelogs from the Contentstack delivery API
//! into typed graph nodes, keeping a host store in step across cycles.

pub mod config;
pub mod content;
pub mod error;
pub mod index;
pub mod materialize;
pub mod memory;
pub mod node;
pub mod normalize;
pub mod schema;
pub mod sync;
pub mod traits;
pub mod types;

pub use config::SyncConfig;
pub use content::{Changelog, ChangelogItem, ContentType, FieldDef, FieldKind, SyncData, SyncEvent};
pub use error::Error;
pub use index::ReferenceIndex;
pub use memory::MemoryStore;
pub use node::{Node, NodeInternal};
pub use schema::TypeDecl;
pub use sync::{SyncContext, SyncReport, Syncer};
pub use traits::{ContentDigester, Fetcher, IdFactory, NodeStore, SchemaSink, StatusStore};
pub use types::{CdnUrl, NodeId, SyncCursor, TypePrefix};

/// Owner recorded on every node this crate creates.
pub const OWNER: &str = "stacksync";

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
