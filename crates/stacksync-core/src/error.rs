//! Error types for stacksync.
//!
//! This module provides a unified error type with explicit variants for
//! transport, protocol, store and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for stacksync operations.
///
/// Callers can match on the variant to tell a failed fetch apart from a
/// broken store or a malformed record.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, TLS, timeout, decoding).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success responses from the delivery API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Host store failures (I/O, corrupt node files).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors (missing uid, bad type prefix, bad URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Protocol-level errors from delivery API responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// API error code (if present).
    pub error_code: Option<i64>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(code) = self.error_code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error_code: Option<i64>, message: Option<String>) -> Self {
        Self {
            status,
            error_code,
            message,
        }
    }

    /// Check if the API rejected our credentials.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Host store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem I/O failed.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// A stored document could not be parsed or written.
    #[error("corrupt document '{path}': {reason}")]
    Corrupt { path: String, reason: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// A published record carried no usable `uid`.
    #[error("record is missing a uid: {context}")]
    MissingUid { context: String },

    /// Invalid type prefix.
    #[error("invalid type prefix '{value}': {reason}")]
    TypePrefix { value: String, reason: String },

    /// Invalid delivery API base URL.
    #[error("invalid CDN URL '{value}': {reason}")]
    CdnUrl { value: String, reason: String },

    /// Invalid configuration.
    #[error("invalid config: {reason}")]
    Config { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Store(StoreError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::new(422, Some(141), Some("sync token is invalid".to_string()));
        assert_eq!(err.to_string(), "HTTP 422 [141]: sync token is invalid");

        let bare = ProtocolError::new(500, None, None);
        assert_eq!(bare.to_string(), "HTTP 500");
    }

    #[test]
    fn auth_errors() {
        assert!(ProtocolError::new(401, None, None).is_auth_error());
        assert!(!ProtocolError::new(404, None, None).is_auth_error());
    }

    #[test]
    fn io_error_maps_to_store() {
        let err: Error = std::io::Error::other("disk full").into();
        assert!(matches!(err, Error::Store(StoreError::Io { .. })));
    }
}
