//! Mock CDN tests for the HTTP fetcher.
//!
//! These tests use wiremock to simulate the Content Delivery API.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stacksync_core::content::SyncEvent;
use stacksync_core::error::Error;
use stacksync_core::traits::Fetcher;
use stacksync_core::types::SyncCursor;
use stacksync_core::{FieldKind, SyncConfig};
use stacksync_http::HttpFetcher;

fn config(server: &MockServer) -> SyncConfig {
    SyncConfig::new("blt123")
        .with_option("delivery_token", "cs-token")
        .with_option("environment", "production")
        .with_option("cdn", server.uri())
}

fn content_type(uid: &str) -> serde_json::Value {
    json!({
        "uid": uid,
        "title": uid,
        "schema": [
            { "uid": "title", "data_type": "text", "mandatory": true },
            { "uid": "author", "data_type": "reference", "reference_to": ["author"] }
        ]
    })
}

// ============================================================================
// Content Types
// ============================================================================

#[tokio::test]
async fn test_content_types_are_paged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/content_types"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "100"))
        .and(query_param("include_count", "true"))
        .and(query_param("include_global_field_schema", "true"))
        .and(header("api_key", "blt123"))
        .and(header("access_token", "cs-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content_types": [content_type("post"), content_type("page")],
            "count": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/content_types"))
        .and(query_param("skip", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content_types": [content_type("author")],
            "count": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let content_types = fetcher.fetch_content_types(&config(&server)).await.unwrap();

    let uids: Vec<&str> = content_types.iter().map(|ct| ct.uid.as_str()).collect();
    assert_eq!(uids, vec!["post", "page", "author"]);
    assert_eq!(content_types[0].schema[1].data_type, FieldKind::Reference);
    assert_eq!(content_types[0].schema[1].reference_to, vec!["author".to_string()]);
}

#[tokio::test]
async fn test_content_types_error_carries_api_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/content_types"))
        .respond_with(ResponseTemplate::new(412).set_body_json(json!({
            "error_message": "Access token is invalid",
            "error_code": 105,
            "errors": { "access_token": ["is not valid."] }
        })))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let err = fetcher.fetch_content_types(&config(&server)).await.unwrap_err();

    match err {
        Error::Protocol(p) => {
            assert_eq!(p.status, 412);
            assert_eq!(p.error_code, Some(105));
            assert_eq!(p.message.as_deref(), Some("Access token is invalid"));
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

// ============================================================================
// Sync
// ============================================================================

#[tokio::test]
async fn test_initial_sync_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/stacks/sync"))
        .and(query_param("init", "true"))
        .and(query_param("environment", "production"))
        .and(query_param("locale", "en-us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "type": "entry_published",
                "event_at": "2024-01-01T00:00:00.000Z",
                "content_type_uid": "post",
                "data": { "uid": "p1", "locale": "en-us", "title": "Hi" }
            }],
            "skip": 0,
            "limit": 100,
            "total_count": 2,
            "pagination_token": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/stacks/sync"))
        .and(query_param("pagination_token", "page-2"))
        .and(query_param_is_missing("init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "type": "asset_published",
                "data": { "uid": "img", "publish_details": { "locale": "en-us" } }
            }],
            "total_count": 2,
            "sync_token": "sync-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let data = fetcher
        .fetch_data(&config(&server).with_option("locale", "en-us"), None)
        .await
        .unwrap();

    assert_eq!(data.sync_token, SyncCursor::new("sync-1"));
    assert_eq!(data.sync_data.len(), 2);
    assert_eq!(data.sync_data[0].event, SyncEvent::EntryPublished);
    assert_eq!(data.sync_data[0].content_type_uid.as_deref(), Some("post"));
    assert_eq!(data.sync_data[1].event, SyncEvent::AssetPublished);
}

#[tokio::test]
async fn test_incremental_sync_uses_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/stacks/sync"))
        .and(query_param("sync_token", "sync-1"))
        .and(query_param_is_missing("init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "type": "entry_deleted",
                "content_type_uid": "post",
                "data": { "uid": "p1", "locale": "en-us" }
            }],
            "sync_token": "sync-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let cursor = SyncCursor::new("sync-1");
    let data = fetcher
        .fetch_data(&config(&server), Some(&cursor))
        .await
        .unwrap();

    assert_eq!(data.sync_token.as_str(), "sync-2");
    assert_eq!(data.sync_data[0].event, SyncEvent::EntryDeleted);
}

#[tokio::test]
async fn test_sync_without_token_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/stacks/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let err = fetcher.fetch_data(&config(&server), None).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_sync_error_without_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/stacks/sync"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let err = fetcher.fetch_data(&config(&server), None).await.unwrap_err();

    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_missing_delivery_token() {
    let server = MockServer::start().await;
    let fetcher = HttpFetcher::new().unwrap();
    let config = SyncConfig::new("blt123")
        .with_option("environment", "production")
        .with_option("cdn", server.uri());

    let err = fetcher.fetch_data(&config, None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
