//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and starting [`Client`] sessions.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use remote_control::Client;
//!
//! # async fn example() -> remote_control::Result<()> {
//! let client = Client::builder()
//!     .host("192.168.1.20:8000")
//!     .retry_delay(Duration::from_secs(5))
//!     .heartbeat(Duration::from_secs(30))
//!     .spawn()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use url::Url;

use crate::error::{Error, Result};
use crate::transport::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_RETRY_DELAY, WsTransport};

use super::core::Client;

// ============================================================================
// Constants
// ============================================================================

/// Path the remote host serves its command socket on.
pub const COMMAND_PATH: &str = "/cmds";

// ============================================================================
// ClientBuilder
// ============================================================================

/// Where the client connects.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EndpointSource {
    /// `host[:port]`, expanded to `ws://host[:port]/cmds`.
    Host(String),
    /// Full WebSocket URL.
    Url(String),
}

/// Builder for configuring a [`Client`].
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    /// Endpoint source.
    endpoint: Option<EndpointSource>,
    /// Fixed interval between failed attempts.
    retry_delay: Duration,
    /// Dial plus handshake limit.
    connect_timeout: Duration,
    /// Optional `PING` period while usable.
    heartbeat: Option<Duration>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            retry_delay: DEFAULT_RETRY_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            heartbeat: None,
        }
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default timings and no endpoint.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects to `ws://<host>/cmds`.
    ///
    /// # Arguments
    ///
    /// * `host` - Host with optional port, e.g. "192.168.1.20:8000"
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.endpoint = Some(EndpointSource::Host(host.into()));
        self
    }

    /// Connects to an explicit `ws://` or `wss://` URL.
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(EndpointSource::Url(url.into()));
        self
    }

    /// Sets the fixed delay between a failed attempt and the next one.
    #[inline]
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the limit on dialing plus the WebSocket handshake.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, limit: Duration) -> Self {
        self.connect_timeout = limit;
        self
    }

    /// Sends `PING` every `period` while the channel is usable.
    #[inline]
    #[must_use]
    pub fn heartbeat(mut self, period: Duration) -> Self {
        self.heartbeat = Some(period);
        self
    }

    /// Resolves and validates the endpoint URL.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no endpoint is set, the host is malformed, or
    ///   the scheme is not `ws`/`wss`
    /// - [`Error::Url`] if the URL cannot be parsed
    pub fn endpoint(&self) -> Result<Url> {
        let url = match &self.endpoint {
            None => {
                return Err(Error::config(
                    "Endpoint is required. Use .host() or .url() to set it.\n\
                     Example: Client::builder().host(\"192.168.1.20:8000\")",
                ));
            }
            Some(EndpointSource::Host(host)) => {
                let host = host.trim();
                if host.is_empty() || host.contains(['/', '?', '#']) || host.contains("://") {
                    return Err(Error::config(format!(
                        "Invalid host '{host}'. Expected host[:port] without scheme or path."
                    )));
                }
                Url::parse(&format!("ws://{host}{COMMAND_PATH}"))?
            }
            Some(EndpointSource::Url(raw)) => Url::parse(raw.trim())?,
        };

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::config(format!(
                "Unsupported scheme '{}'. Use ws:// or wss://.",
                url.scheme()
            )));
        }

        Ok(url)
    }

    /// Validates the configuration and starts the session.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the configuration is invalid or no tokio
    ///   runtime is available
    /// - [`Error::Url`] if the endpoint URL cannot be parsed
    pub fn spawn(self) -> Result<Client> {
        let endpoint = self.endpoint()?;
        self.validate_timings()?;

        Handle::try_current()
            .map_err(|_| Error::config("Client::spawn must be called within a tokio runtime"))?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let transport =
            WsTransport::new(endpoint.clone(), events_tx).with_connect_timeout(self.connect_timeout);

        Ok(Client::spawn_with(
            transport,
            events_rx,
            endpoint,
            self.retry_delay,
            self.heartbeat,
        ))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    fn validate_timings(&self) -> Result<()> {
        if self.retry_delay.is_zero() {
            return Err(Error::config("Retry delay must be greater than zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::config("Connect timeout must be greater than zero"));
        }
        if self.heartbeat.is_some_and(|period| period.is_zero()) {
            return Err(Error::config("Heartbeat period must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let builder = ClientBuilder::new();
        assert!(builder.endpoint.is_none());
        assert_eq!(builder.retry_delay, Duration::from_millis(5000));
        assert_eq!(builder.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert!(builder.heartbeat.is_none());
    }

    #[test]
    fn test_host_expands_to_command_socket() {
        let url = ClientBuilder::new()
            .host("192.168.1.20:8000")
            .endpoint()
            .expect("valid host");
        assert_eq!(url.as_str(), "ws://192.168.1.20:8000/cmds");
    }

    #[test]
    fn test_url_is_used_verbatim() {
        let url = ClientBuilder::new()
            .url("wss://tv.local/remote")
            .endpoint()
            .expect("valid url");
        assert_eq!(url.as_str(), "wss://tv.local/remote");
    }

    #[test]
    fn test_missing_endpoint_fails() {
        let err = ClientBuilder::new().endpoint().unwrap_err();
        assert!(err.to_string().contains("Endpoint is required"));
    }

    #[test]
    fn test_host_with_scheme_or_path_fails() {
        assert!(ClientBuilder::new().host("ws://tv.local").endpoint().is_err());
        assert!(ClientBuilder::new().host("tv.local/cmds").endpoint().is_err());
        assert!(ClientBuilder::new().host("  ").endpoint().is_err());
    }

    #[test]
    fn test_non_websocket_scheme_fails() {
        let err = ClientBuilder::new()
            .url("http://tv.local/cmds")
            .endpoint()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_unparseable_url_fails() {
        let err = ClientBuilder::new().url("not a url").endpoint().unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_zero_timings_fail() {
        let base = ClientBuilder::new().host("tv.local");
        assert!(base.clone().retry_delay(Duration::ZERO).validate_timings().is_err());
        assert!(base.clone().connect_timeout(Duration::ZERO).validate_timings().is_err());
        assert!(base.clone().heartbeat(Duration::ZERO).validate_timings().is_err());
        assert!(base.validate_timings().is_ok());
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let err = ClientBuilder::new().host("tv.local").spawn().unwrap_err();
        assert!(err.to_string().contains("tokio runtime"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_inside_runtime() {
        let client = ClientBuilder::new()
            .host("127.0.0.1:9")
            .spawn()
            .expect("spawn should succeed");

        assert_eq!(client.endpoint().as_str(), "ws://127.0.0.1:9/cmds");
        assert!(!client.is_usable());

        client.shutdown();
    }
}
