//! Session event loop.
//!
//! One task owns the [`ConnectionManager`] and serializes everything that
//! touches it: transport notifications, caller commands, the retry timer and
//! the optional heartbeat. Retries re-arm a single `sleep_until` on each loop
//! turn, so the stack stays flat no matter how long an outage lasts.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until, timeout};
use tracing::{debug, warn};

use crate::identifiers::HandleId;
use crate::protocol::Command;
use crate::transport::{
    ChannelObserver, ChannelState, ConnectionManager, Transport, TransportEvent,
};

// ============================================================================
// Constants
// ============================================================================

/// How long shutdown waits for the channel to finish closing.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// ============================================================================
// SessionCommand
// ============================================================================

/// Requests from [`Client`](super::Client) handles to the session task.
pub(crate) enum SessionCommand {
    /// Send one command line.
    Send(String),
    /// Run the reconnect policy.
    Reconnect,
    /// Close the channel and stop.
    Shutdown,
}

// ============================================================================
// SessionObserver
// ============================================================================

/// Bridges manager signals onto tokio channels for [`Client`](super::Client).
pub(crate) struct SessionObserver {
    pub usable: watch::Sender<bool>,
    pub messages: broadcast::Sender<String>,
}

impl ChannelObserver for SessionObserver {
    fn on_available(&self) {
        self.usable.send_replace(true);
    }

    fn on_unavailable(&self) {
        self.usable.send_replace(false);
    }

    fn on_message(&self, text: &str) {
        // No subscribers is fine.
        let _ = self.messages.send(text.to_string());
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Runs the session until shutdown or until every client handle is dropped.
pub(crate) async fn run_session<T: Transport>(
    mut manager: ConnectionManager<T>,
    mut events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    heartbeat: Option<Duration>,
) {
    let mut heartbeat = heartbeat.map(|period| {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    manager.start();

    loop {
        let retry = manager.pending_retry();
        let retry_at = retry.map_or_else(Instant::now, |r| r.deadline());

        tokio::select! {
            event = events_rx.recv() => {
                match event {
                    Some(event) => manager.handle_event(event),
                    None => {
                        debug!("Transport event channel closed");
                        break;
                    }
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(SessionCommand::Send(payload)) => manager.send(&payload),
                    Some(SessionCommand::Reconnect) => manager.reconnect(),
                    Some(SessionCommand::Shutdown) | None => {
                        debug!("Session shutdown requested");
                        break;
                    }
                }
            }

            () = sleep_until(retry_at), if retry.is_some() => {
                if let Some(retry) = retry {
                    manager.fire_retry(retry.token());
                }
            }

            () = next_tick(&mut heartbeat) => {
                if manager.is_usable() {
                    manager.send(&Command::Ping.encode());
                }
            }
        }
    }

    manager.shutdown();
    let closing = manager
        .handle_id()
        .filter(|_| manager.state() != ChannelState::Closed);
    if let Some(id) = closing {
        drain_close(id, &mut events_rx).await;
    }

    debug!("Session terminated");
}

/// Pending forever when no heartbeat is configured.
async fn next_tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Waits for the closing handle's `Closed` so queued frames get flushed.
async fn drain_close(id: HandleId, events_rx: &mut mpsc::UnboundedReceiver<TransportEvent>) {
    let drained = timeout(SHUTDOWN_GRACE, async {
        while let Some(event) = events_rx.recv().await {
            if event.handle == id && event.is_closed() {
                break;
            }
        }
    })
    .await;

    if drained.is_err() {
        warn!(handle = %id, "Channel did not close within grace period");
    }
}
