//! stacksync-http - Content Delivery API fetcher.

mod client;
mod endpoints;
mod fetcher;
mod options;

pub use client::{CdnClient, build_http_client};
pub use fetcher::HttpFetcher;
pub use options::HttpOptions;
