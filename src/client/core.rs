//! Remote-control client handle.
//!
//! A [`Client`] is a cheap, cloneable handle to one session task. All clones
//! share the same channel; the session ends when [`Client::shutdown`] is
//! called or the last clone is dropped.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{Command, CommandEncoder};
use crate::transport::{ConnectionManager, Transport, TransportEvent};

use super::builder::ClientBuilder;
use super::session::{SessionCommand, SessionObserver, run_session};

// ============================================================================
// Constants
// ============================================================================

/// Buffered incoming messages per subscriber.
const MESSAGE_BUFFER: usize = 64;

// ============================================================================
// Client
// ============================================================================

/// Handle to a self-healing remote-control channel.
///
/// Sending is fire-and-forget: while the channel is unusable commands are
/// dropped and each attempt nudges the session to reconnect.
///
/// # Example
///
/// ```no_run
/// use remote_control::{Client, CommandEncoder, NavDirection, Result};
///
/// # async fn example() -> Result<()> {
/// let mut client = Client::builder().host("192.168.1.20:8000").spawn()?;
///
/// client.wait_usable(std::time::Duration::from_secs(10)).await?;
/// client.nav(NavDirection::Down);
/// client.volume(5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    /// Requests for the session task.
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    /// Channel usability, published by the session.
    usable: watch::Receiver<bool>,
    /// Incoming text frames.
    messages: broadcast::Sender<String>,
    /// Endpoint the session dials.
    endpoint: Arc<Url>,
}

// ============================================================================
// Client - Constructors
// ============================================================================

impl Client {
    /// Creates a new client builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Starts a session over `transport`.
    ///
    /// `events_rx` must receive the notifications of every handle the
    /// transport opens.
    pub(crate) fn spawn_with<T>(
        transport: T,
        events_rx: mpsc::UnboundedReceiver<TransportEvent>,
        endpoint: Url,
        retry_delay: Duration,
        heartbeat: Option<Duration>,
    ) -> Self
    where
        T: Transport + Send + 'static,
        T::Handle: Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (usable_tx, usable) = watch::channel(false);
        let (messages, _) = broadcast::channel(MESSAGE_BUFFER);

        let mut manager = ConnectionManager::with_retry_delay(transport, retry_delay);
        manager.subscribe(Box::new(SessionObserver {
            usable: usable_tx,
            messages: messages.clone(),
        }));

        tokio::spawn(run_session(manager, events_rx, command_rx, heartbeat));

        Self {
            command_tx,
            usable,
            messages,
            endpoint: Arc::new(endpoint),
        }
    }
}

// ============================================================================
// Client - Sending
// ============================================================================

impl Client {
    /// Sends one raw command line. Dropped silently if the channel is unusable.
    pub fn send(&self, line: impl Into<String>) {
        let _ = self.command_tx.send(SessionCommand::Send(line.into()));
    }

    /// Encodes and sends a [`Command`].
    pub fn send_command(&self, command: &Command) {
        self.send(command.encode());
    }

    /// Runs the reconnect policy now instead of waiting for the retry timer.
    pub fn reconnect(&self) {
        let _ = self.command_tx.send(SessionCommand::Reconnect);
    }
}

impl CommandEncoder for Client {
    fn send_line(&mut self, line: &str) {
        self.send(line);
    }
}

// ============================================================================
// Client - Status
// ============================================================================

impl Client {
    /// Returns the endpoint the session dials.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns `true` while the channel is open.
    #[inline]
    #[must_use]
    pub fn is_usable(&self) -> bool {
        *self.usable.borrow()
    }

    /// Subscribes to usability changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.usable.clone()
    }

    /// Subscribes to text frames sent by the remote host.
    #[must_use]
    pub fn messages(&self) -> broadcast::Receiver<String> {
        self.messages.subscribe()
    }

    /// Waits until the channel is usable.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the channel is not usable within `limit`
    /// - [`Error::ConnectionClosed`] if the session has ended
    pub async fn wait_usable(&self, limit: Duration) -> Result<()> {
        let mut usable = self.usable.clone();

        match timeout(limit, usable.wait_for(|usable| *usable)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => Err(Error::connection_timeout(limit.as_millis() as u64)),
        }
    }
}

// ============================================================================
// Client - Shutdown
// ============================================================================

impl Client {
    /// Closes the channel and stops reconnecting.
    ///
    /// Commands sent before this call are flushed first.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(SessionCommand::Shutdown);
    }

    /// Resolves once the session task has exited.
    pub async fn closed(&self) {
        let mut usable = self.usable.clone();
        while usable.changed().await.is_ok() {}
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::time::Instant;

    use crate::protocol::NavDirection;
    use crate::transport::DEFAULT_RETRY_DELAY;
    use crate::transport::testing::StubTransport;

    fn stub_client(failures: usize, heartbeat: Option<Duration>) -> (Client, StubTransport) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let stub = StubTransport::auto(events_tx, failures);
        let endpoint = Url::parse("ws://remote.test/cmds").expect("valid url");
        let client = Client::spawn_with(
            stub.clone(),
            events_rx,
            endpoint,
            DEFAULT_RETRY_DELAY,
            heartbeat,
        );
        (client, stub)
    }

    async fn finish(client: &Client) {
        client.shutdown();
        client.closed().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_after_n_retries_at_fixed_interval() {
        let started = Instant::now();
        let (client, stub) = stub_client(3, None);

        client
            .wait_usable(Duration::from_secs(60))
            .await
            .expect("channel should open");

        let elapsed = started.elapsed();
        assert!(elapsed >= DEFAULT_RETRY_DELAY * 3, "elapsed {elapsed:?}");
        assert!(elapsed < DEFAULT_RETRY_DELAY * 4, "elapsed {elapsed:?}");
        assert_eq!(stub.opened(), 4);

        finish(&client).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_during_outage_hastens_recovery() {
        let (mut client, stub) = stub_client(1, None);

        client.ping();
        client
            .wait_usable(DEFAULT_RETRY_DELAY / 2)
            .await
            .expect("send should trigger an immediate attempt");

        client.ping();
        finish(&client).await;

        assert_eq!(stub.all_sent(), ["PING"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_transmit_in_order() {
        let (mut client, stub) = stub_client(0, None);
        client
            .wait_usable(Duration::from_secs(1))
            .await
            .expect("channel should open");

        client.nav(NavDirection::Left);
        client.volume(-7);
        client.send_command(&Command::Volume(0));
        client.send("PRESS a");
        finish(&client).await;

        assert_eq!(stub.all_sent(), ["NAV left", "VOL down 7", "VOL mute", "PRESS a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_pings_while_usable() {
        let (client, stub) = stub_client(0, Some(Duration::from_secs(30)));
        client
            .wait_usable(Duration::from_secs(1))
            .await
            .expect("channel should open");

        tokio::time::sleep(Duration::from_secs(95)).await;
        finish(&client).await;

        assert_eq!(stub.all_sent(), ["PING", "PING", "PING"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_usable_times_out_during_outage() {
        let (client, stub) = stub_client(usize::MAX, None);

        let err = client
            .wait_usable(Duration::from_secs(12))
            .await
            .expect_err("channel never opens");
        assert!(err.is_timeout());
        assert!(!client.is_usable());
        // Initial attempt plus the retries at 5s and 10s.
        assert_eq!(stub.opened(), 3);

        finish(&client).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_tracks_usability() {
        let (client, _stub) = stub_client(0, None);
        let mut usable = client.subscribe();

        usable
            .wait_for(|usable| *usable)
            .await
            .expect("session alive");
        assert!(client.is_usable());

        finish(&client).await;
        assert!(!*usable.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_ends_session() {
        let (client, stub) = stub_client(0, None);
        client
            .wait_usable(Duration::from_secs(1))
            .await
            .expect("channel should open");

        finish(&client).await;

        let err = client
            .wait_usable(Duration::from_secs(1))
            .await
            .expect_err("session is gone");
        assert!(matches!(err, Error::ConnectionClosed));
        assert_eq!(stub.live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debug_shows_endpoint() {
        let (client, _stub) = stub_client(0, None);
        let rendered = format!("{client:?}");
        assert!(rendered.contains("remote.test"), "{rendered}");

        finish(&client).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_all_clients_ends_session() {
        let (client, stub) = stub_client(0, None);
        let mut observer = client.subscribe();
        drop(client);

        while observer.changed().await.is_ok() {}
        assert_eq!(stub.live(), 0);
    }
}
