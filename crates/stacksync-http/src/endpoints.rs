//! Delivery API endpoint definitions and response types.

use serde::Deserialize;

use stacksync_core::content::{ChangelogItem, ContentType};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// GET /v3/content_types
pub const CONTENT_TYPES: &str = "content_types";

/// GET /v3/stacks/sync
pub const SYNC: &str = "stacks/sync";

/// Page size for content type listing. The API caps it at 100.
pub const CONTENT_TYPES_PAGE_SIZE: usize = 100;

// ============================================================================
// Response Types
// ============================================================================

/// Response from content_types.
#[derive(Debug, Deserialize)]
pub struct ContentTypesResponse {
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    /// Total across all pages, present when `include_count=true`.
    #[serde(default)]
    pub count: Option<usize>,
}

/// One page of stacks/sync.
///
/// Intermediate pages carry `pagination_token`; the last carries `sync_token`.
#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub items: Vec<ChangelogItem>,
    #[serde(default)]
    pub pagination_token: Option<String>,
    #[serde(default)]
    pub sync_token: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}
