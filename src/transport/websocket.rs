//! WebSocket transport.
//!
//! Each [`WsHandle`] is backed by one tokio task that owns the socket for its
//! whole life: it dials the endpoint, pumps frames in both directions while
//! open, and reports lifecycle transitions on the shared event channel.
//!
//! # Handle Task
//!
//! ```text
//! Connecting ──dial ok──► Open ──remote close / error / Close cmd──► Closed
//!     │                                                                ▲
//!     └──── dial error / timeout / Close cmd ──────────────────────────┘
//! ```
//!
//! The task always finishes by setting the state to `Closed` and emitting
//! exactly one `Closed` notification, after `Opened` if the dial succeeded.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::HandleId;

use super::channel::{ChannelState, Transport, TransportEvent, TransportHandle};

// ============================================================================
// Constants
// ============================================================================

/// Default limit on dialing plus the WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Shared readiness cell, written by the handle task and by [`WsHandle::close`].
type SharedState = Arc<Mutex<ChannelState>>;

/// Requests from the handle to its task.
enum ChannelCommand {
    /// Write one text frame.
    Send(String),
    /// Close the socket.
    Close,
}

// ============================================================================
// WsTransport
// ============================================================================

/// Opens WebSocket channels to a fixed endpoint.
///
/// Must be used from within a tokio runtime: every [`Transport::open`] spawns
/// a task.
pub struct WsTransport {
    /// Endpoint every handle dials.
    endpoint: Url,
    /// Limit on dial plus handshake.
    connect_timeout: Duration,
    /// Notifications for the session event loop.
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl WsTransport {
    /// Creates a transport that reports notifications on `events`.
    #[must_use]
    pub fn new(endpoint: Url, events: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            endpoint,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            events,
        }
    }

    /// Sets the dial plus handshake timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Returns the endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Transport for WsTransport {
    type Handle = WsHandle;

    fn open(&mut self, id: HandleId) -> WsHandle {
        let state: SharedState = Arc::new(Mutex::new(ChannelState::Connecting));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_channel(
            ChannelTask {
                id,
                endpoint: self.endpoint.clone(),
                connect_timeout: self.connect_timeout,
                state: Arc::clone(&state),
                events: self.events.clone(),
            },
            command_rx,
        ));

        WsHandle {
            id,
            state,
            command_tx,
        }
    }
}

// ============================================================================
// WsHandle
// ============================================================================

/// Handle to one WebSocket channel.
///
/// Dropping the handle closes the channel.
pub struct WsHandle {
    /// Handle ID.
    id: HandleId,
    /// Readiness, shared with the handle task.
    state: SharedState,
    /// Requests for the handle task.
    command_tx: mpsc::UnboundedSender<ChannelCommand>,
}

impl TransportHandle for WsHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn state(&self) -> ChannelState {
        *self.state.lock()
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        self.command_tx
            .send(ChannelCommand::Send(payload.to_string()))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&mut self) {
        {
            let mut state = self.state.lock();
            if !matches!(*state, ChannelState::Connecting | ChannelState::Open) {
                return;
            }
            *state = ChannelState::Closing;
        }

        let _ = self.command_tx.send(ChannelCommand::Close);
    }
}

// ============================================================================
// Handle Task
// ============================================================================

struct ChannelTask {
    id: HandleId,
    endpoint: Url,
    connect_timeout: Duration,
    state: SharedState,
    events: mpsc::UnboundedSender<TransportEvent>,
}

async fn run_channel(task: ChannelTask, mut command_rx: mpsc::UnboundedReceiver<ChannelCommand>) {
    let ChannelTask {
        id,
        endpoint,
        connect_timeout,
        state,
        events,
    } = task;

    let stream = tokio::select! {
        result = timeout(connect_timeout, connect_async(endpoint.as_str())) => match result {
            Ok(Ok((stream, _response))) => Some(stream),
            Ok(Err(e)) => {
                report_connect_failure(id, &endpoint, &Error::from(e));
                None
            }
            Err(_) => {
                let error = Error::connection_timeout(connect_timeout.as_millis() as u64);
                report_connect_failure(id, &endpoint, &error);
                None
            }
        },

        () = wait_for_close(&mut command_rx) => {
            debug!(handle = %id, "Connection attempt abandoned");
            None
        }
    };

    if let Some(mut stream) = stream {
        if mark_open(&state) {
            let _ = events.send(TransportEvent::opened(id));
            pump(id, stream, &mut command_rx, &events).await;
        } else {
            let _ = stream.close(None).await;
        }
    }

    *state.lock() = ChannelState::Closed;
    let _ = events.send(TransportEvent::closed(id));

    debug!(handle = %id, "Channel task terminated");
}

fn report_connect_failure(id: HandleId, endpoint: &Url, error: &Error) {
    warn!(handle = %id, endpoint = %endpoint, error = %error, "Connection failed");
}

/// Moves `Connecting` to `Open`; fails if a close was requested meanwhile.
fn mark_open(state: &SharedState) -> bool {
    let mut state = state.lock();
    if *state == ChannelState::Connecting {
        *state = ChannelState::Open;
        true
    } else {
        false
    }
}

/// Resolves on a close request or when the handle is dropped.
async fn wait_for_close(command_rx: &mut mpsc::UnboundedReceiver<ChannelCommand>) {
    while let Some(command) = command_rx.recv().await {
        match command {
            ChannelCommand::Close => return,
            ChannelCommand::Send(_) => trace!("Dropping payload queued before open"),
        }
    }
}

/// Moves frames until either side closes.
async fn pump(
    id: HandleId,
    stream: WsStream,
    command_rx: &mut mpsc::UnboundedReceiver<ChannelCommand>,
    events: &mpsc::UnboundedSender<TransportEvent>,
) {
    let (mut ws_write, mut ws_read) = stream.split();

    loop {
        tokio::select! {
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        let _ = events.send(TransportEvent::message(id, text.as_str()));
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!(handle = %id, "WebSocket closed by remote");
                        break;
                    }

                    Some(Err(e)) => {
                        warn!(handle = %id, error = %Error::from(e), "Read failed");
                        break;
                    }

                    None => {
                        debug!(handle = %id, "WebSocket stream ended");
                        break;
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(ChannelCommand::Send(payload)) => {
                        if let Err(e) = ws_write.send(Message::Text(payload.into())).await {
                            warn!(handle = %id, error = %Error::from(e), "Failed to write frame");
                            break;
                        }
                        trace!(handle = %id, "Frame written");
                    }

                    Some(ChannelCommand::Close) | None => {
                        debug!(handle = %id, "Closing WebSocket");
                        let _ = ws_write.close().await;
                        break;
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
