//! Type prefix for generated node and schema type names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Asset node type suffix.
const ASSETS_SUFFIX: &str = "assets";

/// Content-type descriptor node type suffix.
const CONTENT_TYPES_SUFFIX: &str = "ContentTypes";

/// A validated type prefix.
///
/// Every generated type name starts with this prefix, so it must be a legal
/// GraphQL name: `[A-Za-z_][A-Za-z0-9_]*`.
///
/// # Example
///
/// ```
/// use stacksync_core::TypePrefix;
///
/// let prefix = TypePrefix::default();
/// assert_eq!(prefix.entry_type("blog_post"), "Contentstack_blog_post");
/// assert_eq!(prefix.asset_type(), "Contentstack_assets");
/// assert_eq!(prefix.content_types_type(), "ContentstackContentTypes");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypePrefix(String);

impl TypePrefix {
    /// The prefix used when none is configured.
    pub const DEFAULT: &'static str = "Contentstack";

    /// Create a new type prefix, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is empty or not a legal GraphQL name.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Returns the prefix as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased prefix, used inside identity keys and status keys.
    pub fn lowercase(&self) -> String {
        self.0.to_lowercase()
    }

    /// Node type for entries of a content type.
    pub fn entry_type(&self, content_type_uid: &str) -> String {
        format!("{}_{}", self.0, content_type_uid)
    }

    /// Node type for assets.
    pub fn asset_type(&self) -> String {
        format!("{}_{}", self.0, ASSETS_SUFFIX)
    }

    /// Node type for content-type descriptors.
    pub fn content_types_type(&self) -> String {
        format!("{}{}", self.0, CONTENT_TYPES_SUFFIX)
    }

    fn validate(s: &str) -> Result<(), Error> {
        let mut chars = s.chars();
        let first = chars.next().ok_or_else(|| InvalidInputError::TypePrefix {
            value: s.to_string(),
            reason: "cannot be empty".to_string(),
        })?;

        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(InvalidInputError::TypePrefix {
                value: s.to_string(),
                reason: "must start with a letter or underscore".to_string(),
            }
            .into());
        }

        if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(InvalidInputError::TypePrefix {
                value: s.to_string(),
                reason: format!("invalid character '{}'", bad),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for TypePrefix {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for TypePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TypePrefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for TypePrefix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TypePrefix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TypePrefix::new(&s).map_err(serde::de::Error::custom)
    }
}
