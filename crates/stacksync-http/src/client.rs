//! Content Delivery API HTTP client.

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use stacksync_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use stacksync_core::types::CdnUrl;

use crate::endpoints::ErrorResponse;
use crate::options::HttpOptions;

const API_KEY: HeaderName = HeaderName::from_static("api_key");
const ACCESS_TOKEN: HeaderName = HeaderName::from_static("access_token");

/// Map a reqwest failure onto the transport error it represents.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// Build the shared HTTP client.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client() -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .user_agent(concat!("stacksync/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(transport_error)
}

/// HTTP client for one stack's delivery API.
#[derive(Debug, Clone)]
pub struct CdnClient {
    client: reqwest::Client,
    cdn: CdnUrl,
    headers: HeaderMap,
    timeout: Option<std::time::Duration>,
}

impl CdnClient {
    /// Create a client for `api_key` using an existing connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the api key or delivery token cannot be sent as a header.
    pub fn new(client: reqwest::Client, api_key: &str, options: &HttpOptions) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY, header_value("api_key", api_key)?);
        headers.insert(ACCESS_TOKEN, header_value("delivery_token", &options.delivery_token)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            client,
            cdn: options.cdn.clone(),
            headers,
            timeout: options.timeout,
        })
    }

    /// Returns the CDN URL this client is configured for.
    pub fn cdn(&self) -> &CdnUrl {
        &self.cdn
    }

    /// GET a versioned API path and decode the JSON body.
    #[instrument(skip(self, params), fields(cdn = %self.cdn))]
    pub async fn get<R>(&self, path: &str, params: &[(&str, String)]) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let url = self.cdn.api_url(path);
        debug!(path, "CDN query");
        trace!(?params, "query parameters");

        let mut request = self
            .client
            .get(&url)
            .query(params)
            .headers(self.headers.clone());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(transport_error)?;
        self.handle_response(response).await
    }

    /// Handle a delivery API response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "CDN response");

        if status.is_success() {
            response.json::<R>().await.map_err(transport_error)
        } else {
            Err(Error::Protocol(self.parse_error_response(response).await))
        }
    }

    /// Parse a delivery API error body.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.error_code, body.error_message),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|_| {
        InvalidInputError::Config {
            reason: format!("{} contains characters not allowed in a header", name),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> HttpOptions {
        HttpOptions {
            cdn: CdnUrl::new("https://eu-cdn.contentstack.com").unwrap(),
            delivery_token: "cs-token".to_string(),
            environment: "production".to_string(),
            locale: None,
            timeout: None,
        }
    }

    #[test]
    fn client_creation() {
        let client = CdnClient::new(build_http_client().unwrap(), "blt123", &options()).unwrap();
        assert_eq!(client.cdn().host(), Some("eu-cdn.contentstack.com"));
        assert_eq!(client.headers.get("api_key").unwrap(), "blt123");
        assert_eq!(client.headers.get("access_token").unwrap(), "cs-token");
    }

    #[test]
    fn rejects_unsendable_token() {
        let mut options = options();
        options.delivery_token = "bad\ntoken".to_string();
        assert!(CdnClient::new(build_http_client().unwrap(), "blt123", &options).is_err());
    }
}
