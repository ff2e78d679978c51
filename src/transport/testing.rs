//! Deterministic in-memory transport for lifecycle tests.
//!
//! Two modes:
//!
//! - **manual**: handles stay where the test puts them; the test builds
//!   notifications with [`StubTransport::open_event`] and friends and feeds
//!   them to the manager itself.
//! - **auto**: notifications are pushed onto an event channel as soon as a
//!   handle is opened or closed, failing the first `failures` attempts.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::identifiers::HandleId;

use super::channel::{ChannelState, Transport, TransportEvent, TransportHandle};

// ============================================================================
// StubRecord
// ============================================================================

/// Everything the stub observed about one handle.
#[derive(Debug, Clone)]
pub(crate) struct StubRecord {
    pub id: HandleId,
    pub state: ChannelState,
    pub sent: Vec<String>,
    /// Close requests that actually started a teardown.
    pub effective_closes: usize,
    pub dropped: bool,
}

#[derive(Default)]
struct StubInner {
    records: Vec<StubRecord>,
    events: Option<mpsc::UnboundedSender<TransportEvent>>,
    failures: usize,
}

impl StubInner {
    fn record_mut(&mut self, id: HandleId) -> &mut StubRecord {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .expect("unknown stub handle")
    }

    fn emit(&self, event: TransportEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

// ============================================================================
// StubTransport
// ============================================================================

#[derive(Clone, Default)]
pub(crate) struct StubTransport {
    inner: Arc<Mutex<StubInner>>,
}

impl StubTransport {
    /// Manual mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Auto mode: the first `failures` attempts close without opening.
    pub fn auto(events: mpsc::UnboundedSender<TransportEvent>, failures: usize) -> Self {
        let inner = StubInner {
            events: Some(events),
            failures,
            ..StubInner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn set_state(&self, id: HandleId, state: ChannelState) {
        self.inner.lock().record_mut(id).state = state;
    }

    /// Moves the handle to `Open` and returns the matching notification.
    pub fn open_event(&self, id: HandleId) -> TransportEvent {
        self.set_state(id, ChannelState::Open);
        TransportEvent::opened(id)
    }

    /// Moves the handle to `Closed` and returns the matching notification.
    pub fn close_event(&self, id: HandleId) -> TransportEvent {
        self.set_state(id, ChannelState::Closed);
        TransportEvent::closed(id)
    }

    pub fn record(&self, id: HandleId) -> StubRecord {
        self.inner.lock().record_mut(id).clone()
    }

    /// Number of handles ever opened.
    pub fn opened(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Handles not yet dropped by their owner.
    pub fn live(&self) -> usize {
        self.inner.lock().records.iter().filter(|r| !r.dropped).count()
    }

    /// Every payload transmitted, across all handles.
    pub fn all_sent(&self) -> Vec<String> {
        self.inner
            .lock()
            .records
            .iter()
            .flat_map(|r| r.sent.iter().cloned())
            .collect()
    }
}

impl Transport for StubTransport {
    type Handle = StubHandle;

    fn open(&mut self, id: HandleId) -> StubHandle {
        let mut inner = self.inner.lock();
        inner.records.push(StubRecord {
            id,
            state: ChannelState::Connecting,
            sent: Vec::new(),
            effective_closes: 0,
            dropped: false,
        });

        if inner.events.is_some() {
            let attempt = inner.records.len();
            if attempt <= inner.failures {
                inner.record_mut(id).state = ChannelState::Closed;
                inner.emit(TransportEvent::closed(id));
            } else {
                inner.record_mut(id).state = ChannelState::Open;
                inner.emit(TransportEvent::opened(id));
            }
        }

        StubHandle {
            id,
            inner: Arc::clone(&self.inner),
        }
    }
}

// ============================================================================
// StubHandle
// ============================================================================

pub(crate) struct StubHandle {
    id: HandleId,
    inner: Arc<Mutex<StubInner>>,
}

impl TransportHandle for StubHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn state(&self) -> ChannelState {
        self.inner.lock().record_mut(self.id).state
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let record = inner.record_mut(self.id);
        if !record.state.is_open() {
            return Err(Error::ConnectionClosed);
        }
        record.sent.push(payload.to_string());
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.inner.lock();
        let auto = inner.events.is_some();
        let record = inner.record_mut(self.id);

        if !matches!(record.state, ChannelState::Connecting | ChannelState::Open) {
            return;
        }

        record.effective_closes += 1;
        if auto {
            record.state = ChannelState::Closed;
            inner.emit(TransportEvent::closed(self.id));
        } else {
            record.state = ChannelState::Closing;
        }
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        self.inner.lock().record_mut(self.id).dropped = true;
    }
}
