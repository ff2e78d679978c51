//! Connection lifecycle state machine.
//!
//! [`ConnectionManager`] keeps at most one usable channel to a fixed endpoint
//! and exposes only "can I send now" plus a fire-and-forget
//! [`send`](ConnectionManager::send). It performs no I/O and never sleeps:
//! the session event loop feeds it transport notifications and retry-timer
//! fires one at a time, and arms a timer for whatever
//! [`pending_retry`](ConnectionManager::pending_retry) reports.
//!
//! # Lifecycle
//!
//! ```text
//!             connect()                 Opened
//!   Closed ─────────────► Connecting ───────────► Open
//!     ▲                        │                    │
//!     │ Closed (never opened)  │                    │ Closed (lost)
//!     │ → schedule retry       ▼                    ▼
//!     └──────────────────── Closed ◄──────────── reconnect policy
//! ```
//!
//! # Reconnect Policy
//!
//! | Current state | Action |
//! |---------------|--------|
//! | `Connecting` | close the handle; its `Closed` notification re-enters |
//! | `Closed` | connect immediately |
//! | `Closing` | nothing; the teardown's `Closed` notification re-enters |
//! | `Open` | nothing |
//!
//! An attempt that fails on its own (closed without ever opening) schedules a
//! single retry after the retry delay instead of reconnecting immediately, so
//! an unreachable host is polled at a fixed interval. An attempt the policy
//! abandoned reconnects as soon as its `Closed` arrives.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::identifiers::{HandleId, RetryToken};

use super::channel::{ChannelState, EventKind, Transport, TransportEvent, TransportHandle};

// ============================================================================
// Constants
// ============================================================================

/// Delay between a failed attempt and the next one.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);

// ============================================================================
// ChannelObserver
// ============================================================================

/// Receives channel usability signals.
///
/// Presentation layers implement this to block input and show a waiting
/// indicator while the channel is unavailable.
pub trait ChannelObserver: Send {
    /// The channel reached `Open`.
    fn on_available(&self);

    /// The channel was lost or an attempt failed.
    fn on_unavailable(&self);

    /// The remote host sent a text frame.
    fn on_message(&self, _text: &str) {}
}

// ============================================================================
// PendingRetry
// ============================================================================

/// A scheduled one-shot retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRetry {
    token: RetryToken,
    scheduled_at: Instant,
    deadline: Instant,
}

impl PendingRetry {
    /// Token to pass back to [`ConnectionManager::fire_retry`].
    #[inline]
    #[must_use]
    pub const fn token(&self) -> RetryToken {
        self.token
    }

    /// When the retry should fire.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns the transport handle and drives the reconnect loop.
///
/// Exactly one task owns it and serializes every notification, timer fire
/// and send, so no locking is involved.
pub struct ConnectionManager<T: Transport> {
    /// Opens new handles.
    transport: T,
    /// Current handle, if any. At most one is ever held.
    handle: Option<T::Handle>,
    /// Current handle has signalled `Opened`.
    handle_opened: bool,
    /// Current handle's `Closed` notification was handled.
    handle_closed: bool,
    /// Current handle was closed by the reconnect policy while connecting.
    abandoned: bool,
    /// Last allocated handle ID.
    last_handle: HandleId,
    /// Last allocated retry token.
    last_token: RetryToken,
    /// At most one outstanding retry.
    pending_retry: Option<PendingRetry>,
    /// Fixed retry interval.
    retry_delay: Duration,
    /// Usability subscribers.
    observers: Vec<Box<dyn ChannelObserver>>,
    /// Retries that fired and ran the policy.
    retries_fired: u64,
    /// Set by [`ConnectionManager::shutdown`].
    stopped: bool,
}

// ============================================================================
// ConnectionManager - Constructor
// ============================================================================

impl<T: Transport> ConnectionManager<T> {
    /// Creates a manager with the default retry delay. No connection is
    /// attempted until [`start`](Self::start), [`connect`](Self::connect) or
    /// a [`send`](Self::send).
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_retry_delay(transport, DEFAULT_RETRY_DELAY)
    }

    /// Creates a manager with a custom retry delay.
    #[must_use]
    pub fn with_retry_delay(transport: T, retry_delay: Duration) -> Self {
        Self {
            transport,
            handle: None,
            handle_opened: false,
            handle_closed: false,
            abandoned: false,
            last_handle: HandleId::new(0),
            last_token: RetryToken::new(0),
            pending_retry: None,
            retry_delay,
            observers: Vec::new(),
            retries_fired: 0,
            stopped: false,
        }
    }

    /// Registers a usability observer.
    pub fn subscribe(&mut self, observer: Box<dyn ChannelObserver>) {
        self.observers.push(observer);
    }
}

// ============================================================================
// ConnectionManager - Queries
// ============================================================================

impl<T: Transport> ConnectionManager<T> {
    /// Current channel state, read from the handle. `Closed` with no handle.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.handle
            .as_ref()
            .map_or(ChannelState::Closed, TransportHandle::state)
    }

    /// Returns `true` if [`send`](Self::send) would transmit.
    #[inline]
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.state().is_open()
    }

    /// ID of the current handle.
    #[must_use]
    pub fn handle_id(&self) -> Option<HandleId> {
        self.handle.as_ref().map(TransportHandle::id)
    }

    /// The outstanding retry, if one is scheduled.
    #[inline]
    #[must_use]
    pub const fn pending_retry(&self) -> Option<PendingRetry> {
        self.pending_retry
    }

    /// Configured retry interval.
    #[inline]
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Number of scheduled retries that have fired.
    #[inline]
    #[must_use]
    pub const fn retries_fired(&self) -> u64 {
        self.retries_fired
    }
}

// ============================================================================
// ConnectionManager - Lifecycle
// ============================================================================

impl<T: Transport> ConnectionManager<T> {
    /// Signals "unavailable" and makes the first connection attempt.
    pub fn start(&mut self) {
        self.notify_unavailable();
        self.connect();
    }

    /// Discards the current handle and opens a new one.
    ///
    /// Cancels any pending retry. The previous handle is closed and dropped
    /// before the new one is created, so its late notifications are stale.
    pub fn connect(&mut self) {
        if self.stopped {
            return;
        }

        self.cancel_retry();

        if let Some(mut previous) = self.handle.take() {
            previous.close();
            if self.handle_opened && !self.handle_closed {
                self.notify_unavailable();
            }
        }

        self.last_handle = self.last_handle.next();
        let id = self.last_handle;

        debug!(handle = %id, "Connecting");

        self.handle = Some(self.transport.open(id));
        self.handle_opened = false;
        self.handle_closed = false;
        self.abandoned = false;
    }

    /// Runs the reconnect policy against the current state.
    pub fn reconnect(&mut self) {
        if self.stopped {
            return;
        }

        match self.state() {
            ChannelState::Connecting => {
                if let Some(handle) = self.handle.as_mut() {
                    debug!(handle = %handle.id(), "Abandoning connection attempt");
                    handle.close();
                    self.abandoned = true;
                }
            }
            ChannelState::Closed => self.connect(),
            ChannelState::Closing => trace!("Teardown in progress, waiting for close"),
            ChannelState::Open => trace!("Channel open, nothing to recover"),
        }
    }

    /// Applies one transport notification.
    ///
    /// Notifications from any handle other than the current one are ignored.
    pub fn handle_event(&mut self, event: TransportEvent) {
        if self.stopped {
            return;
        }

        let current = self.handle_id();
        if current != Some(event.handle) {
            trace!(handle = %event.handle, ?current, "Ignoring stale notification");
            return;
        }

        match event.kind {
            EventKind::Opened => self.on_opened(event.handle),
            EventKind::Message(text) => self.on_message(event.handle, &text),
            EventKind::Closed => self.on_closed(event.handle),
        }
    }

    /// Fires the retry identified by `token`.
    ///
    /// Ignored unless `token` is the pending retry's token.
    pub fn fire_retry(&mut self, token: RetryToken) {
        let pending = match self.pending_retry {
            Some(pending) if pending.token == token => pending,
            _ => {
                trace!("Ignoring stale retry timer");
                return;
            }
        };
        self.pending_retry = None;

        self.retries_fired += 1;
        debug!(
            retry = self.retries_fired,
            waited_ms = pending.scheduled_at.elapsed().as_millis() as u64,
            "Retry timer fired"
        );

        self.reconnect();
    }

    /// Transmits `payload` if the channel is open.
    ///
    /// Otherwise the payload is dropped and the reconnect policy runs. Never
    /// fails from the caller's point of view.
    pub fn send(&mut self, payload: &str) {
        if self.stopped {
            return;
        }

        if !self.is_usable() {
            debug!(command = %payload, state = %self.state(), "Channel unavailable, dropping command");
            self.reconnect();
            return;
        }

        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        match handle.send(payload) {
            Ok(()) => debug!(handle = %handle.id(), command = %payload, "Sent"),
            Err(e) => {
                warn!(handle = %handle.id(), error = %e, "Send failed");
                self.reconnect();
            }
        }
    }

    /// Cancels retries and closes the current handle for good.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }

        self.cancel_retry();
        if let Some(handle) = self.handle.as_mut() {
            debug!(handle = %handle.id(), "Shutting down channel");
            handle.close();
        }
        if self.handle_opened && !self.handle_closed {
            self.notify_unavailable();
        }
        self.stopped = true;
    }
}

// ============================================================================
// ConnectionManager - Internals
// ============================================================================

impl<T: Transport> ConnectionManager<T> {
    fn on_opened(&mut self, id: HandleId) {
        if self.handle_opened {
            return;
        }
        self.handle_opened = true;
        self.cancel_retry();

        info!(handle = %id, "Connected");
        for observer in &self.observers {
            observer.on_available();
        }
    }

    fn on_message(&self, id: HandleId, text: &str) {
        debug!(handle = %id, message = %text, "Received");
        for observer in &self.observers {
            observer.on_message(text);
        }
    }

    fn on_closed(&mut self, id: HandleId) {
        if self.handle_closed {
            return;
        }
        self.handle_closed = true;

        info!(handle = %id, "Disconnected, trying to reconnect");
        self.notify_unavailable();

        // Lost or deliberately abandoned: the policy reconnects at once.
        // Only an attempt that failed on its own waits for the retry delay.
        if self.handle_opened || self.abandoned {
            self.reconnect();
        } else {
            self.schedule_retry();
        }
    }

    fn schedule_retry(&mut self) {
        if self.pending_retry.is_some() {
            trace!("Retry already pending");
            return;
        }

        self.last_token = self.last_token.next();
        let scheduled_at = Instant::now();
        self.pending_retry = Some(PendingRetry {
            token: self.last_token,
            scheduled_at,
            deadline: scheduled_at + self.retry_delay,
        });

        debug!(delay_ms = self.retry_delay.as_millis() as u64, "Retry scheduled");
    }

    fn cancel_retry(&mut self) {
        if self.pending_retry.take().is_some() {
            trace!("Pending retry cancelled");
        }
    }

    fn notify_unavailable(&self) {
        for observer in &self.observers {
            observer.on_unavailable();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
