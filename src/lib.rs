//! Remote Control - Self-healing command channel for a remote host.
//!
//! This library keeps a WebSocket control channel to a remote host (a media
//! center, a set-top box, a TV) alive across network interruptions and
//! translates user intents into the host's line-based command protocol.
//!
//! # Architecture
//!
//! ```text
//! Client ──► session task ──► ConnectionManager ──► WsTransport ──► ws://host/cmds
//!   ▲                                │
//!   └──── usability / messages ◄─────┘
//! ```
//!
//! Key design principles:
//!
//! - One session task owns the connection state machine; no locks around it
//! - Commands are fire-and-forget and dropped while the channel is unusable
//! - A failed attempt waits a fixed delay; losing an open channel reconnects at once
//! - Notifications from superseded connections are ignored
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use remote_control::{Client, CommandEncoder, MediaAction, NavDirection, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = Client::builder().host("192.168.1.20:8000").spawn()?;
//!
//!     client.wait_usable(Duration::from_secs(10)).await?;
//!
//!     client.nav(NavDirection::Down);
//!     client.media(MediaAction::Play);
//!     client.volume(-3);
//!
//!     client.shutdown();
//!     client.closed().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`] handle and [`ClientBuilder`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Intents and their wire encoding |
//! | [`transport`] | Connection state machine and WebSocket transport |

// ============================================================================
// Modules
// ============================================================================

/// Client runtime: handle, builder and session task.
///
/// Use [`Client::builder()`] to configure and start a session.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for connection handles and retry timers.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Remote-control protocol.
///
/// Typed intents and the line encoding the remote host understands.
pub mod protocol;

/// Connection lifecycle and transport.
///
/// The reconnect state machine and its WebSocket implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ClientBuilder};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{HandleId, RetryToken};

// Protocol types
pub use protocol::{Command, CommandEncoder, ExtraAction, MediaAction, NavDirection};

// Transport types
pub use transport::{
    ChannelObserver, ChannelState, ConnectionManager, EventKind, PendingRetry, Transport,
    TransportEvent, TransportHandle, WsHandle, WsTransport,
};
