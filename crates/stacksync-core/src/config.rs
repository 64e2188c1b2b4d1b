//! Sync configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;
use crate::error::InvalidInputError;
use crate::types::{TypePrefix, cursor_key};

/// Configuration for one stack.
///
/// Keys other than the ones named here are collected into
/// [`transport`](Self::transport) and passed through to the fetcher untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub api_key: String,

    #[serde(default)]
    pub type_prefix: TypePrefix,

    #[serde(default, alias = "enableSchemaGeneration")]
    pub enable_schema_generation: bool,

    /// Fetcher options such as `delivery_token`, `environment` or `cdn`.
    #[serde(flatten)]
    pub transport: Map<String, Value>,
}

impl SyncConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            type_prefix: TypePrefix::default(),
            enable_schema_generation: false,
            transport: Map::new(),
        }
    }

    pub fn with_type_prefix(mut self, prefix: TypePrefix) -> Self {
        self.type_prefix = prefix;
        self
    }

    pub fn with_schema_generation(mut self, enabled: bool) -> Self {
        self.enable_schema_generation = enabled;
        self
    }

    /// Set one transport option.
    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.transport.insert(key.to_string(), value.into());
        self
    }

    /// A string transport option, if present.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.transport.get(key).and_then(Value::as_str)
    }

    /// Parse configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`validate`](Self::validate).
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| InvalidInputError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields every fetcher relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_key` is blank.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(InvalidInputError::Config {
                reason: "api_key must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Status key the sync cursor is stored under.
    pub fn cursor_key(&self) -> String {
        cursor_key(&self.type_prefix, &self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_and_passthrough() {
        let config = SyncConfig::from_json(
            r#"{
                "api_key": "blt123",
                "delivery_token": "cs-token",
                "environment": "production"
            }"#,
        )
        .unwrap();

        assert_eq!(config.type_prefix.as_str(), "Contentstack");
        assert!(!config.enable_schema_generation);
        assert_eq!(config.option("delivery_token"), Some("cs-token"));
        assert_eq!(config.option("environment"), Some("production"));
        assert!(!config.transport.contains_key("api_key"));
    }

    #[test]
    fn accepts_camel_case_schema_flag() {
        let config = SyncConfig::from_json(
            r#"{"api_key": "k", "type_prefix": "Blog", "enableSchemaGeneration": true}"#,
        )
        .unwrap();
        assert!(config.enable_schema_generation);
        assert_eq!(config.type_prefix.as_str(), "Blog");
    }

    #[test]
    fn rejects_bad_config() {
        assert!(SyncConfig::from_json(r#"{"type_prefix": "Blog"}"#).is_err());
        assert!(SyncConfig::from_json(r#"{"api_key": "  "}"#).is_err());
        assert!(SyncConfig::from_json(r#"{"api_key": "k", "type_prefix": "9bad"}"#).is_err());
    }

    #[test]
    fn cursor_key_combines_prefix_and_api_key() {
        let config = SyncConfig::new("blt123").with_option("environment", json!("dev"));
        assert_eq!(config.cursor_key(), "contentstack-sync-token-blt123");
    }
}
