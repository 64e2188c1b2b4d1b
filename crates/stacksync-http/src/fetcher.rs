//! [`Fetcher`] over the Content Delivery API.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use stacksync_core::Result;
use stacksync_core::config::SyncConfig;
use stacksync_core::content::{ContentType, SyncData};
use stacksync_core::error::TransportError;
use stacksync_core::traits::Fetcher;
use stacksync_core::types::SyncCursor;

use crate::client::{CdnClient, build_http_client};
use crate::endpoints::{
    CONTENT_TYPES, CONTENT_TYPES_PAGE_SIZE, ContentTypesResponse, SYNC, SyncResponse,
};
use crate::options::HttpOptions;

/// Fetches content types and sync changelogs over HTTP.
///
/// Transport options are read from the configuration on every call, so one
/// fetcher serves any number of stacks over a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
        })
    }

    /// Use an existing reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn cdn_client(&self, config: &SyncConfig) -> Result<(CdnClient, HttpOptions)> {
        let options = HttpOptions::from_config(config)?;
        let client = CdnClient::new(self.client.clone(), &config.api_key, &options)?;
        Ok((client, options))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self, config), fields(api_key = %config.api_key))]
    async fn fetch_content_types(&self, config: &SyncConfig) -> Result<Vec<ContentType>> {
        let (client, _) = self.cdn_client(config)?;
        let mut content_types = Vec::new();

        loop {
            let params = [
                ("include_count", "true".to_string()),
                ("include_global_field_schema", "true".to_string()),
                ("skip", content_types.len().to_string()),
                ("limit", CONTENT_TYPES_PAGE_SIZE.to_string()),
            ];
            let page: ContentTypesResponse = client.get(CONTENT_TYPES, &params).await?;
            let received = page.content_types.len();
            content_types.extend(page.content_types);

            debug!(received, total = ?page.count, "Fetched content type page");

            let done = match page.count {
                Some(count) => content_types.len() >= count,
                None => received < CONTENT_TYPES_PAGE_SIZE,
            };
            if done || received == 0 {
                break;
            }
        }

        Ok(content_types)
    }

    #[instrument(skip(self, config, cursor), fields(api_key = %config.api_key, initial = cursor.is_none()))]
    async fn fetch_data(
        &self,
        config: &SyncConfig,
        cursor: Option<&SyncCursor>,
    ) -> Result<SyncData> {
        let (client, options) = self.cdn_client(config)?;

        let mut params: Vec<(&str, String)> = match cursor {
            Some(cursor) => vec![("sync_token", cursor.as_str().to_string())],
            None => {
                let mut params = vec![
                    ("init", "true".to_string()),
                    ("environment", options.environment.clone()),
                ];
                if let Some(locale) = &options.locale {
                    params.push(("locale", locale.clone()));
                }
                params
            }
        };

        let mut items = Vec::new();
        let mut pages = 0usize;
        loop {
            let page: SyncResponse = client.get(SYNC, &params).await?;
            pages += 1;
            items.extend(page.items);

            if let Some(sync_token) = page.sync_token {
                info!(pages, items = items.len(), "Fetched sync changelog");
                return Ok(SyncData {
                    sync_data: items,
                    sync_token: SyncCursor::new(sync_token),
                });
            }

            match page.pagination_token {
                Some(token) => {
                    debug!(pages, "Following pagination token");
                    params = vec![("pagination_token", token)];
                }
                None => {
                    return Err(TransportError::Decode {
                        message: "sync response has neither sync_token nor pagination_token"
                            .to_string(),
                    }
                    .into());
                }
            }
        }
    }
}
