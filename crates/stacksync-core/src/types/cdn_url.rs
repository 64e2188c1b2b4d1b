//! Delivery API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated Content Delivery API base URL.
///
/// Must use HTTPS, except for localhost where plain HTTP is allowed so tests
/// and local mirrors can be used.
///
/// # Example
///
/// ```
/// use stacksync_core::CdnUrl;
///
/// let cdn = CdnUrl::new("https://eu-cdn.contentstack.com").unwrap();
/// assert_eq!(cdn.api_url("stacks/sync"), "https://eu-cdn.contentstack.com/v3/stacks/sync");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CdnUrl(Url);

impl CdnUrl {
    /// The public North America delivery endpoint.
    pub const DEFAULT: &'static str = "https://cdn.contentstack.io";

    /// Create a new CDN URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::CdnUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the versioned API URL for a path such as `content_types`.
    pub fn api_url(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/v3/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::CdnUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::CdnUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::CdnUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for CdnUrl {
    fn default() -> Self {
        Self(Url::parse(Self::DEFAULT).expect("default CDN URL is valid"))
    }
}

impl fmt::Display for CdnUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CdnUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for CdnUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for CdnUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CdnUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let cdn = CdnUrl::new("https://cdn.contentstack.io").unwrap();
        assert_eq!(cdn.host(), Some("cdn.contentstack.io"));
    }

    #[test]
    fn valid_localhost_http() {
        let cdn = CdnUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(
            cdn.api_url("content_types"),
            "http://127.0.0.1:8080/v3/content_types"
        );
    }

    #[test]
    fn trailing_slash_in_api_url() {
        let cdn = CdnUrl::new("https://cdn.contentstack.io/").unwrap();
        assert_eq!(
            cdn.api_url("/stacks/sync"),
            "https://cdn.contentstack.io/v3/stacks/sync"
        );
    }

    #[test]
    fn default_is_public_cdn() {
        assert_eq!(CdnUrl::default().host(), Some("cdn.contentstack.io"));
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(CdnUrl::new("http://cdn.contentstack.io").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(CdnUrl::new("/v3/content_types").is_err());
    }
}
