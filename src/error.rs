//! Error types for the remote-control client.
//!
//! This module defines all error types used throughout the crate.
//!
//! Note that [`ConnectionManager::send`](crate::transport::ConnectionManager::send)
//! never returns an error: an unusable channel is absorbed into the
//! reconnect loop. Errors surface only from configuration, command parsing
//! and the transport internals.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Parsing | [`Error::UnknownCommand`], [`Error::InvalidArgument`] |
//! | Connection | [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | External | [`Error::Url`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;
use url::ParseError as UrlError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Parsing Errors
    // ========================================================================
    /// Unknown command keyword.
    #[error("Unknown command: {command}")]
    UnknownCommand {
        /// The unrecognized keyword.
        command: String,
    },

    /// Invalid command argument.
    ///
    /// Returned when an enumerated argument is out of its domain or a
    /// volume magnitude is malformed.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Timed out waiting for the channel.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Channel closed.
    ///
    /// Returned when a handle's I/O task is gone.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// Endpoint URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] UrlError),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an unknown command error.
    #[inline]
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error came from parsing a command.
    #[inline]
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand { .. } | Self::InvalidArgument { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_error_display() {
        let err = Error::connection_timeout(30000);
        assert_eq!(err.to_string(), "Connection timeout after 30000ms");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("endpoint is required");
        assert_eq!(err.to_string(), "Configuration error: endpoint is required");
    }

    #[test]
    fn test_is_timeout() {
        assert!(Error::connection_timeout(5000).is_timeout());
        assert!(!Error::ConnectionClosed.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection_timeout(1000).is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_is_parse_error() {
        assert!(Error::unknown_command("JUMP").is_parse_error());
        assert!(Error::invalid_argument("sideways").is_parse_error());
        assert!(!Error::ConnectionClosed.is_parse_error());
    }

    #[test]
    fn test_from_websocket_error() {
        let io_err = IoError::new(ErrorKind::ConnectionRefused, "refused");
        let err: Error = WsError::Io(io_err).into();
        assert!(matches!(err, Error::WebSocket(_)));
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err, Error::Url(_)));
    }
}
