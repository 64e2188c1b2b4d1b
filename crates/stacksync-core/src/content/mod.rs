//! Upstream content model.
//!
//! Content types describe the shape of entries; changelog items are the raw
//! events returned by the sync API. Entries and assets themselves stay raw
//! JSON: interpretation is driven by the content type's schema.

mod changelog;
mod content_type;
mod record;

pub use changelog::{Changelog, ChangelogItem, SyncData, SyncEvent};
pub use content_type::{BlockDef, ContentType, FieldDef, FieldKind, FieldMetadata};
pub use record::{record_locale, record_uid};
