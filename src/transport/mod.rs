//! Connection lifecycle and WebSocket transport.
//!
//! This module keeps the control channel to the remote host alive across
//! network interruptions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   open / send / close   ┌──────────────────┐
//! │  ConnectionManager   │────────────────────────►│  WsHandle        │
//! │  (state machine,     │                         │  (one task per   │
//! │   retry timer)       │◄────────────────────────│   attempt)       │
//! └──────────────────────┘   TransportEvent        └────────┬─────────┘
//!                                                           │ ws://host/cmds
//!                                                           ▼
//!                                                    Remote host
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | `ChannelState`, notifications, transport traits |
//! | `manager` | Reconnect state machine and send gating |
//! | `websocket` | tokio-tungstenite transport |

// ============================================================================
// Submodules
// ============================================================================

/// Channel state, notifications and transport traits.
pub mod channel;

/// Connection lifecycle state machine.
pub mod manager;

/// WebSocket transport.
pub mod websocket;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{ChannelState, EventKind, Transport, TransportEvent, TransportHandle};
pub use manager::{ChannelObserver, ConnectionManager, DEFAULT_RETRY_DELAY, PendingRetry};
pub use websocket::{DEFAULT_CONNECT_TIMEOUT, WsHandle, WsTransport};
