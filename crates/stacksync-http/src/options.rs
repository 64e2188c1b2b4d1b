//! Transport options read from the configuration's pass-through keys.

use std::time::Duration;

use serde_json::Value;

use stacksync_core::Result;
use stacksync_core::config::SyncConfig;
use stacksync_core::error::InvalidInputError;
use stacksync_core::types::CdnUrl;

/// Options the HTTP fetcher needs beyond the api key.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpOptions {
    pub cdn: CdnUrl,
    pub delivery_token: String,
    pub environment: String,
    /// Restricts the initial sync to one locale.
    pub locale: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpOptions {
    /// Read options from `config.transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if `delivery_token` or `environment` is missing, or
    /// `cdn` is not a valid delivery URL.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let cdn = match config.option("cdn") {
            Some(cdn) => CdnUrl::new(cdn)?,
            None => CdnUrl::default(),
        };

        let timeout = match config.transport.get("timeout_secs") {
            None | Some(Value::Null) => None,
            Some(value) => Some(Duration::from_secs(value.as_u64().ok_or_else(|| {
                InvalidInputError::Config {
                    reason: "timeout_secs must be a non-negative integer".to_string(),
                }
            })?)),
        };

        Ok(Self {
            cdn,
            delivery_token: required(config, "delivery_token")?,
            environment: required(config, "environment")?,
            locale: config.option("locale").map(str::to_string),
            timeout,
        })
    }
}

fn required(config: &SyncConfig, key: &str) -> Result<String> {
    match config.option(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(InvalidInputError::Config {
            reason: format!("missing required option '{}'", key),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SyncConfig {
        SyncConfig::new("blt123")
            .with_option("delivery_token", "cs-token")
            .with_option("environment", "production")
    }

    #[test]
    fn defaults_to_public_cdn() {
        let options = HttpOptions::from_config(&config()).unwrap();
        assert_eq!(options.cdn, CdnUrl::default());
        assert_eq!(options.delivery_token, "cs-token");
        assert_eq!(options.locale, None);
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn reads_optional_keys() {
        let options = HttpOptions::from_config(
            &config()
                .with_option("cdn", "https://eu-cdn.contentstack.com")
                .with_option("locale", "fr-fr")
                .with_option("timeout_secs", 30),
        )
        .unwrap();

        assert_eq!(options.cdn.host(), Some("eu-cdn.contentstack.com"));
        assert_eq!(options.locale.as_deref(), Some("fr-fr"));
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_missing_or_invalid() {
        assert!(HttpOptions::from_config(&SyncConfig::new("k")).is_err());
        assert!(
            HttpOptions::from_config(&config().with_option("cdn", "http://cdn.example.com"))
                .is_err()
        );
        assert!(HttpOptions::from_config(&config().with_option("timeout_secs", "soon")).is_err());
    }
}
