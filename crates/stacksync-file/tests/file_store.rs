//! File store tests against a temporary directory.

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use stacksync_core::content::{ContentType, FieldDef, FieldKind};
use stacksync_core::node::{Node, NodeInternal};
use stacksync_core::schema::customize_schema;
use stacksync_core::traits::{NodeStore, SchemaSink, StatusStore};
use stacksync_core::types::{NodeId, TypePrefix};
use stacksync_file::{FileStore, JournalOp};

fn node(id: &str, type_name: &str, fields: Value) -> Node {
    Node::new(
        NodeId::new(id),
        NodeInternal {
            type_name: type_name.to_string(),
            content_digest: "digest".to_string(),
            owner: "stacksync".to_string(),
        },
        fields.as_object().cloned().unwrap_or_default(),
    )
}

#[test]
fn test_node_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = FileStore::new(temp_dir.path());

    let original = node("n1", "Contentstack_post", json!({"title": "Hi", "tags": ["a"]}));
    store.create_node(original.clone()).unwrap();

    let loaded = store.get_node(&NodeId::new("n1")).unwrap().unwrap();
    assert_eq!(loaded, original);
    assert!(temp_dir.path().join("nodes").join("n1.json").exists());
}

#[test]
fn test_create_replaces_and_lists_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = FileStore::new(temp_dir.path());

    store.create_node(node("b", "Contentstack_post", json!({"v": 1}))).unwrap();
    store.create_node(node("a", "Contentstack_post", json!({"v": 1}))).unwrap();
    store.create_node(node("b", "Contentstack_post", json!({"v": 2}))).unwrap();

    let nodes = store.get_nodes().unwrap();
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(nodes[1].get("v"), Some(&json!(2)));
}

#[test]
fn test_ids_with_separators_do_not_collide() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = FileStore::new(temp_dir.path());

    store.create_node(node("a/b", "Contentstack_post", json!({"v": "slash"}))).unwrap();
    store.create_node(node("a_b", "Contentstack_post", json!({"v": "underscore"}))).unwrap();

    assert_eq!(store.get_nodes().unwrap().len(), 2);
    let slash = store.get_node(&NodeId::new("a/b")).unwrap().unwrap();
    assert_eq!(slash.get("v"), Some(&json!("slash")));
    let underscore = store.get_node(&NodeId::new("a_b")).unwrap().unwrap();
    assert_eq!(underscore.get("v"), Some(&json!("underscore")));
}

#[test]
fn test_delete_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = FileStore::new(temp_dir.path());

    store.create_node(node("n1", "Contentstack_post", json!({}))).unwrap();
    store.delete_node(&NodeId::new("n1")).unwrap();
    store.delete_node(&NodeId::new("n1")).unwrap();
    store.delete_node(&NodeId::new("never")).unwrap();

    assert!(store.get_node(&NodeId::new("n1")).unwrap().is_none());
    assert!(store.get_nodes().unwrap().is_empty());
}

#[test]
fn test_journal_records_operations() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = FileStore::new(temp_dir.path());

    store.create_node(node("n1", "Contentstack_post", json!({}))).unwrap();
    store.create_node(node("n2", "Contentstack_assets", json!({}))).unwrap();
    store.delete_node(&NodeId::new("n1")).unwrap();
    store.delete_node(&NodeId::new("n1")).unwrap();

    let journal = store.journal().unwrap();
    let ops: Vec<(&str, JournalOp)> = journal.iter().map(|e| (e.id.as_str(), e.op)).collect();
    assert_eq!(
        ops,
        vec![
            ("n1", JournalOp::Create),
            ("n2", JournalOp::Create),
            ("n1", JournalOp::Delete),
        ]
    );
    assert_eq!(journal[1].type_name, "Contentstack_assets");
    assert!(chrono::DateTime::parse_from_rfc3339(&journal[0].time).is_ok());
}

#[test]
fn test_status_merges_and_persists() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = FileStore::new(temp_dir.path());
    assert!(store.status().unwrap().is_empty());

    let mut first = Map::new();
    first.insert("contentstack-sync-token-k1".to_string(), json!("t1"));
    store.set_status(first).unwrap();

    let mut second = Map::new();
    second.insert("contentstack-sync-token-k2".to_string(), json!("t2"));
    store.set_status(second).unwrap();

    let reopened = FileStore::new(temp_dir.path());
    let status = reopened.status().unwrap();
    assert_eq!(status.get("contentstack-sync-token-k1"), Some(&json!("t1")));
    assert_eq!(status.get("contentstack-sync-token-k2"), Some(&json!("t2")));
}

#[test]
fn test_schema_written_as_sdl() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = FileStore::new(temp_dir.path());
    assert!(store.read_schema().unwrap().is_none());

    let ct = ContentType::new("post", vec![FieldDef::new("title", FieldKind::Text)]);
    store
        .create_types(customize_schema(&ct, &TypePrefix::default()))
        .unwrap();

    let sdl = store.read_schema().unwrap().unwrap();
    assert!(sdl.contains("type Contentstack_post implements Node {"));
    assert!(sdl.contains("title: String"));
    assert!(sdl.contains("type linktype"));
}

#[test]
fn test_corrupt_node_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path());
    std::fs::create_dir_all(temp_dir.path().join("nodes")).unwrap();
    std::fs::write(temp_dir.path().join("nodes").join("bad.json"), "{not json").unwrap();

    let err = store.get_node(&NodeId::new("bad")).unwrap_err();
    assert!(matches!(
        err,
        stacksync_core::Error::Store(stacksync_core::error::StoreError::Corrupt { .. })
    ));
}
