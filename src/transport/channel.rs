//! Transport boundary: channel state, notifications and handle traits.
//!
//! The core never drives the socket itself. It opens handles through a
//! [`Transport`], reads readiness from each [`TransportHandle`], and is told
//! about lifecycle transitions through [`TransportEvent`]s delivered on the
//! session's event loop.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::error::Result;
use crate::identifiers::HandleId;

// ============================================================================
// ChannelState
// ============================================================================

/// Readiness of a transport handle.
///
/// The transport is the source of truth; the core only reads this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelState {
    /// Connection attempt in flight.
    Connecting,
    /// Channel usable for sending.
    Open,
    /// Teardown in progress.
    Closing,
    /// Closed, or never connected.
    #[default]
    Closed,
}

impl ChannelState {
    /// Returns `true` if commands may be transmitted.
    #[inline]
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        })
    }
}

// ============================================================================
// TransportEvent
// ============================================================================

/// Kind of lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Handle reached [`ChannelState::Open`].
    Opened,
    /// Text frame received from the remote host.
    Message(String),
    /// Handle reached [`ChannelState::Closed`]. Emitted exactly once per handle.
    Closed,
}

/// A notification from one transport handle.
///
/// For a given handle, `Closed` always follows `Opened` (if any) and is the
/// last notification it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// Handle that produced the notification.
    pub handle: HandleId,
    /// What happened.
    pub kind: EventKind,
}

impl TransportEvent {
    /// Creates an `Opened` notification.
    #[inline]
    #[must_use]
    pub const fn opened(handle: HandleId) -> Self {
        Self {
            handle,
            kind: EventKind::Opened,
        }
    }

    /// Creates a `Message` notification.
    #[inline]
    #[must_use]
    pub fn message(handle: HandleId, text: impl Into<String>) -> Self {
        Self {
            handle,
            kind: EventKind::Message(text.into()),
        }
    }

    /// Creates a `Closed` notification.
    #[inline]
    #[must_use]
    pub const fn closed(handle: HandleId) -> Self {
        Self {
            handle,
            kind: EventKind::Closed,
        }
    }

    /// Returns `true` for `Closed` notifications.
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.kind, EventKind::Closed)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Opens channels to a fixed endpoint.
///
/// Implementations deliver the notifications of every handle they open to
/// the session's event loop, tagged with the handle's ID.
pub trait Transport {
    /// Handle type produced by [`Transport::open`].
    type Handle: TransportHandle;

    /// Starts a connection attempt. The returned handle begins in
    /// [`ChannelState::Connecting`].
    fn open(&mut self, id: HandleId) -> Self::Handle;
}

/// One duplex channel (one connection attempt).
pub trait TransportHandle {
    /// Returns the handle's ID.
    fn id(&self) -> HandleId;

    /// Returns the current readiness.
    fn state(&self) -> ChannelState;

    /// Transmits one text payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if
    /// the handle can no longer carry traffic.
    fn send(&mut self, payload: &str) -> Result<()>;

    /// Requests closure.
    ///
    /// Idempotent: on a handle already closing or closed this does nothing
    /// and produces no further notifications.
    fn close(&mut self);
}

// ============================================================================
// Tests
// ============================================================================
