//! Client runtime.
//!
//! This module provides the main entry point: a [`Client`] handle backed by
//! one session task that owns the connection state machine.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Cloneable handle: send, status, shutdown |
//! | [`ClientBuilder`] | Fluent configuration builder |
//!
//! # Example
//!
//! ```no_run
//! use remote_control::{Client, CommandEncoder, MediaAction, Result};
//!
//! # async fn example() -> Result<()> {
//! let mut client = Client::builder().host("192.168.1.20:8000").spawn()?;
//! client.media(MediaAction::Play);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for client configuration.
pub mod builder;

/// Client handle.
pub mod core;

/// Session event loop.
mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{COMMAND_PATH, ClientBuilder};
pub use core::Client;
