//! Sync cursor type.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TypePrefix;

/// Opaque sync token returned by the delivery API.
///
/// Absent on the first run, which makes that cycle a full sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncCursor(String);

impl SyncCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plugin-status key under which the cursor for one configured stack lives.
///
/// Keyed by prefix and api key so several configured stacks never share a cursor.
pub fn cursor_key(prefix: &TypePrefix, api_key: &str) -> String {
    format!("{}-sync-token-{}", prefix.lowercase(), api_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_includes_prefix_and_api_key() {
        let prefix = TypePrefix::new("Contentstack").unwrap();
        assert_eq!(
            cursor_key(&prefix, "blt123"),
            "contentstack-sync-token-blt123"
        );
    }

    #[test]
    fn distinct_instances_do_not_collide() {
        let a = TypePrefix::new("Blog").unwrap();
        let b = TypePrefix::new("Docs").unwrap();
        assert_ne!(cursor_key(&a, "k"), cursor_key(&b, "k"));
        assert_ne!(cursor_key(&a, "k1"), cursor_key(&a, "k2"));
    }
}
