//! Sync changelog events.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::types::SyncCursor;

/// The kind of a changelog event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncEvent {
    EntryPublished,
    EntryUnpublished,
    EntryDeleted,
    AssetPublished,
    AssetUnpublished,
    AssetDeleted,
    ContentTypeDeleted,
    /// An event type outside the known vocabulary. Ignored by the sync cycle.
    Other(String),
}

impl SyncEvent {
    pub fn as_str(&self) -> &str {
        match self {
            SyncEvent::EntryPublished => "entry_published",
            SyncEvent::EntryUnpublished => "entry_unpublished",
            SyncEvent::EntryDeleted => "entry_deleted",
            SyncEvent::AssetPublished => "asset_published",
            SyncEvent::AssetUnpublished => "asset_unpublished",
            SyncEvent::AssetDeleted => "asset_deleted",
            SyncEvent::ContentTypeDeleted => "content_type_deleted",
            SyncEvent::Other(other) => other,
        }
    }
}

impl From<&str> for SyncEvent {
    fn from(s: &str) -> Self {
        match s {
            "entry_published" => SyncEvent::EntryPublished,
            "entry_unpublished" => SyncEvent::EntryUnpublished,
            "entry_deleted" => SyncEvent::EntryDeleted,
            "asset_published" => SyncEvent::AssetPublished,
            "asset_unpublished" => SyncEvent::AssetUnpublished,
            "asset_deleted" => SyncEvent::AssetDeleted,
            "content_type_deleted" => SyncEvent::ContentTypeDeleted,
            other => SyncEvent::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SyncEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SyncEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SyncEvent::from(s.as_str()))
    }
}

/// One item of the sync changelog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangelogItem {
    #[serde(rename = "type")]
    pub event: SyncEvent,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_at: Option<String>,

    /// The raw entry, asset or content-type payload.
    #[serde(default)]
    pub data: Value,
}

impl ChangelogItem {
    pub fn new(event: SyncEvent, content_type_uid: Option<&str>, data: Value) -> Self {
        Self {
            event,
            content_type_uid: content_type_uid.map(str::to_string),
            event_at: None,
            data,
        }
    }
}

/// What one changelog fetch returns: the events plus the cursor to resume from.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncData {
    pub sync_data: Vec<ChangelogItem>,
    pub sync_token: SyncCursor,
}

/// A changelog partitioned by event type, each bucket in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Changelog {
    pub entry_published: Vec<ChangelogItem>,
    pub entry_unpublished: Vec<ChangelogItem>,
    pub entry_deleted: Vec<ChangelogItem>,
    pub asset_published: Vec<ChangelogItem>,
    pub asset_unpublished: Vec<ChangelogItem>,
    pub asset_deleted: Vec<ChangelogItem>,
    pub content_type_deleted: Vec<ChangelogItem>,
    /// Unknown events, and published entries that name no content type.
    pub ignored: Vec<ChangelogItem>,
}

impl Changelog {
    /// Partition raw items into per-event buckets.
    ///
    /// Every item in `entry_published` carries a `content_type_uid`.
    pub fn from_items(items: impl IntoIterator<Item = ChangelogItem>) -> Self {
        let mut log = Self::default();
        for item in items {
            let bucket = match item.event {
                SyncEvent::EntryPublished if item.content_type_uid.is_none() => &mut log.ignored,
                SyncEvent::EntryPublished => &mut log.entry_published,
                SyncEvent::EntryUnpublished => &mut log.entry_unpublished,
                SyncEvent::EntryDeleted => &mut log.entry_deleted,
                SyncEvent::AssetPublished => &mut log.asset_published,
                SyncEvent::AssetUnpublished => &mut log.asset_unpublished,
                SyncEvent::AssetDeleted => &mut log.asset_deleted,
                SyncEvent::ContentTypeDeleted => &mut log.content_type_deleted,
                SyncEvent::Other(_) => &mut log.ignored,
            };
            bucket.push(item);
        }
        log
    }

    /// Total number of items, ignored ones included.
    pub fn len(&self) -> usize {
        self.entry_published.len()
            + self.entry_unpublished.len()
            + self.entry_deleted.len()
            + self.asset_published.len()
            + self.asset_unpublished.len()
            + self.asset_deleted.len()
            + self.content_type_deleted.len()
            + self.ignored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unpublish and delete events for entries, in that order.
    pub fn entry_removals(&self) -> impl Iterator<Item = &ChangelogItem> {
        self.entry_unpublished.iter().chain(&self.entry_deleted)
    }

    /// Unpublish and delete events for assets, in that order.
    pub fn asset_removals(&self) -> impl Iterator<Item = &ChangelogItem> {
        self.asset_unpublished.iter().chain(&self.asset_deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_api_item() {
        let item: ChangelogItem = serde_json::from_value(json!({
            "type": "entry_published",
            "event_at": "2024-01-01T00:00:00.000Z",
            "content_type_uid": "blog_post",
            "data": { "uid": "e1", "title": "Hello" }
        }))
        .unwrap();

        assert_eq!(item.event, SyncEvent::EntryPublished);
        assert_eq!(item.content_type_uid.as_deref(), Some("blog_post"));
        assert_eq!(item.data["title"], "Hello");
    }

    #[test]
    fn partitions_by_event_type() {
        let items = vec![
            ChangelogItem::new(SyncEvent::EntryPublished, Some("post"), json!({"uid": "a"})),
            ChangelogItem::new(SyncEvent::AssetDeleted, None, json!({"uid": "b"})),
            ChangelogItem::new(SyncEvent::from("entry_archived"), None, json!({})),
            ChangelogItem::new(SyncEvent::EntryPublished, Some("post"), json!({"uid": "c"})),
        ];

        let log = Changelog::from_items(items);
        assert_eq!(log.entry_published.len(), 2);
        assert_eq!(log.entry_published[1].data["uid"], "c");
        assert_eq!(log.asset_deleted.len(), 1);
        assert_eq!(log.ignored.len(), 1);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn published_entry_without_content_type_is_ignored() {
        let items = vec![
            ChangelogItem::new(SyncEvent::EntryPublished, None, json!({"uid": "a", "locale": "en-us"})),
            ChangelogItem::new(SyncEvent::EntryPublished, Some("post"), json!({"uid": "b"})),
        ];

        let log = Changelog::from_items(items);
        assert_eq!(log.entry_published.len(), 1);
        assert_eq!(log.entry_published[0].data["uid"], "b");
        assert_eq!(log.ignored.len(), 1);
    }

    #[test]
    fn unknown_event_keeps_name() {
        let event = SyncEvent::from("entry_archived");
        assert_eq!(event.to_string(), "entry_archived");
    }
}
