//! Remote-control wire protocol.
//!
//! The remote host accepts newline-free ASCII command lines, one per
//! WebSocket text frame. Messages flowing back from the host are opaque
//! strings and are only logged and forwarded to observers.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | [`Command`] | Local → Remote | User intent, e.g. `NAV left` |
//! | text frame | Remote → Local | Informational, unparsed |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Intents, enumerated arguments, wire encoding |
//! | `encoder` | Intent helpers routed through a send primitive |

// ============================================================================
// Submodules
// ============================================================================

/// Intents and their wire encoding.
pub mod command;

/// Intent helpers layered over a send primitive.
pub mod encoder;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, ExtraAction, MediaAction, NavDirection};
pub use encoder::CommandEncoder;
