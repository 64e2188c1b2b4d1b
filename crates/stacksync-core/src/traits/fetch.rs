//! Remote fetch trait.

use async_trait::async_trait;

use crate::Result;
use crate::config::SyncConfig;
use crate::content::{ContentType, SyncData};
use crate::types::SyncCursor;

/// Fetches content types and changelogs from the delivery API.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch every content type of the configured stack.
    async fn fetch_content_types(&self, config: &SyncConfig) -> Result<Vec<ContentType>>;

    /// Fetch the changelog since `cursor`, or a full export when it is `None`.
    ///
    /// Implementations follow pagination internally and return the cursor the
    /// next cycle should resume from.
    async fn fetch_data(
        &self,
        config: &SyncConfig,
        cursor: Option<&SyncCursor>,
    ) -> Result<SyncData>;
}
