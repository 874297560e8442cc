//! Notification delivery client.
//!
//! Maintains a live channel to the notification backend, preferring a
//! WebSocket and degrading to periodic polling when the socket cannot be
//! established or keeps failing.
//!
//! The whole lifecycle runs on one spawned management task, so the client is
//! structurally in exactly one mode at a time: connected, sleeping a
//! reconnect backoff, or polling. [`NotificationClient::disconnect`] cancels
//! the task and joins it, which guarantees no handler fires afterwards.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::api::NotificationApi;
use crate::config::ClientConfig;
use crate::error::{NotifyError, Result};
use crate::message::{ClientMessage, NotificationEvent, ServerMessage, decode_frame};
use crate::model::{Notification, NotificationFilter, NotificationPage};
use crate::token::AccessTokenStore;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type MessageHandler = Arc<dyn Fn(NotificationEvent) + Send + Sync>;
type ConnectionHandler = Arc<dyn Fn(bool) + Send + Sync>;

const OUTBOUND_QUEUE_SIZE: usize = 32;

/// Connection state of the notification client.
///
/// The caller-facing contract is the binary `on_connection_change(bool)`;
/// polling reports as not connected there. The full state is observable via
/// [`NotificationClient::state`] and [`NotificationClient::watch_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport active
    Idle,
    /// Socket dial or reconnect in progress
    Connecting,
    /// Socket open
    Connected,
    /// Fallback poll loop running
    Polling,
}

/// Dual-mode notification delivery client.
///
/// Construct once per session, call [`connect`](Self::connect) with the
/// message and connectivity handlers, and [`disconnect`](Self::disconnect)
/// on sign-out or teardown.
pub struct NotificationClient {
    config: ClientConfig,
    api: NotificationApi,
    tokens: Arc<dyn AccessTokenStore>,
    state_tx: watch::Sender<ConnectionState>,
    active: Mutex<Option<ActiveLifecycle>>,
}

/// Resources of a running lifecycle task.
struct ActiveLifecycle {
    cancel: CancellationToken,
    outbound_tx: mpsc::Sender<ClientMessage>,
    task: JoinHandle<()>,
}

impl NotificationClient {
    /// Create a client; no connection is attempted until [`connect`](Self::connect).
    pub fn new(config: ClientConfig, tokens: Arc<dyn AccessTokenStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let api = NotificationApi::new(http, &config.api_base_url, tokens.clone())?;
        let (state_tx, _) = watch::channel(ConnectionState::Idle);

        Ok(Self {
            config,
            api,
            tokens,
            state_tx,
            active: Mutex::new(None),
        })
    }

    /// Start the delivery lifecycle.
    ///
    /// `on_message` receives every dispatched notification event;
    /// `on_connection_change` receives `true` when the socket opens and
    /// `false` when it drops. Without an access token no socket is attempted
    /// and the polling fallback starts immediately (reported as not
    /// connected).
    ///
    /// Calling this while already running tears the previous lifecycle down
    /// first.
    pub async fn connect<M, C>(&self, on_message: M, on_connection_change: C)
    where
        M: Fn(NotificationEvent) + Send + Sync + 'static,
        C: Fn(bool) + Send + Sync + 'static,
    {
        self.disconnect().await;

        let cancel = CancellationToken::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);

        let lifecycle = Lifecycle {
            config: self.config.clone(),
            api: self.api.clone(),
            token: self.tokens.access_token(),
            state_tx: self.state_tx.clone(),
            on_message: Arc::new(on_message),
            on_connection_change: Arc::new(on_connection_change),
            outbound_rx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(lifecycle.run());

        *self.active.lock() = Some(ActiveLifecycle {
            cancel,
            outbound_tx,
            task,
        });
    }

    /// Tear down whatever transport is active; idempotent.
    ///
    /// Returns after the lifecycle task has stopped, so no handler or poll
    /// callback fires once this completes.
    pub async fn disconnect(&self) {
        let active = self.active.lock().take();
        if let Some(active) = active {
            active.cancel.cancel();
            let _ = active.task.await;
        }
        self.state_tx.send_replace(ConnectionState::Idle);
    }

    /// Mark one notification read over the socket; no-op unless connected.
    pub fn send_mark_read(&self, id: &str) {
        self.send(ClientMessage::MarkRead {
            notification_id: id.to_string(),
        });
    }

    /// Mark every notification read over the socket; no-op unless connected.
    pub fn send_mark_all_read(&self) {
        self.send(ClientMessage::MarkAllRead);
    }

    /// Liveness probe; no-op unless connected.
    pub fn ping(&self) {
        self.send(ClientMessage::Ping);
    }

    fn send(&self, message: ClientMessage) {
        if *self.state_tx.borrow() != ConnectionState::Connected {
            return;
        }
        if let Some(active) = self.active.lock().as_ref() {
            let _ = active.outbound_tx.try_send(message);
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Whether the socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// The REST companion client.
    pub fn api(&self) -> &NotificationApi {
        &self.api
    }

    /// List notifications with paging and filter parameters.
    pub async fn get_notifications(&self, filter: &NotificationFilter) -> Result<NotificationPage> {
        self.api.list(filter).await
    }

    /// Fetch a single notification.
    pub async fn get_notification(&self, id: &str) -> Result<Notification> {
        self.api.get(id).await
    }

    /// Mark one notification as read via REST.
    pub async fn mark_as_read(&self, id: &str) -> Result<()> {
        self.api.mark_as_read(id).await
    }

    /// Mark every notification as read via REST.
    pub async fn mark_all_as_read(&self) -> Result<()> {
        self.api.mark_all_as_read().await
    }

    /// Number of unread notifications.
    pub async fn get_unread_count(&self) -> Result<u64> {
        self.api.unread_count().await
    }

    /// Delete a notification.
    pub async fn delete_notification(&self, id: &str) -> Result<()> {
        self.api.delete(id).await
    }

    /// Fetch pending notifications directly.
    pub async fn get_pending_notifications(&self) -> Result<Vec<Notification>> {
        self.api.pending().await
    }
}

impl Drop for NotificationClient {
    fn drop(&mut self) {
        if let Some(active) = self.active.lock().take() {
            active.cancel.cancel();
            active.task.abort();
        }
    }
}

/// Why the socket read loop ended.
enum SocketOutcome {
    /// Unexpected close or transport error; drives the reconnect path
    Dropped,
    /// Explicit disconnect; the lifecycle ends with no further callbacks
    Cancelled,
}

/// State owned by the management task.
struct Lifecycle {
    config: ClientConfig,
    api: NotificationApi,
    token: Option<String>,
    state_tx: watch::Sender<ConnectionState>,
    on_message: MessageHandler,
    on_connection_change: ConnectionHandler,
    outbound_rx: mpsc::Receiver<ClientMessage>,
    cancel: CancellationToken,
}

impl Lifecycle {
    async fn run(mut self) {
        let Some(token) = self.token.take() else {
            debug!("No access token available, starting polling fallback");
            self.set_state(ConnectionState::Polling);
            self.poll_loop().await;
            return;
        };

        let url = match socket_url(&self.config.ws_url, &token) {
            Ok(url) => url,
            Err(e) => {
                error!("Invalid WebSocket URL {}: {e}", self.config.ws_url);
                self.set_state(ConnectionState::Polling);
                self.poll_loop().await;
                return;
            }
        };

        let mut attempt: u32 = 0;
        loop {
            self.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                result = connect_async(url.as_str()) => result,
                _ = self.cancel.cancelled() => return,
            };

            match connected {
                Ok((stream, _)) => {
                    info!("Notification WebSocket connected");
                    attempt = 0;
                    self.set_state(ConnectionState::Connected);
                    (self.on_connection_change)(true);

                    match self.drive_socket(stream).await {
                        SocketOutcome::Cancelled => return,
                        SocketOutcome::Dropped => {
                            warn!("Notification WebSocket closed unexpectedly");
                            self.set_state(ConnectionState::Idle);
                            (self.on_connection_change)(false);
                        }
                    }
                }
                Err(e) => {
                    warn!("WebSocket connection failed: {e}");
                }
            }

            if attempt >= self.config.max_reconnect_attempts {
                break;
            }
            attempt += 1;
            let delay = reconnect_delay(self.config.initial_reconnect_delay_ms, attempt);
            info!("Reconnecting in {}ms (attempt {attempt})", delay.as_millis());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.cancel.cancelled() => return,
            }
        }

        error!(
            "Max reconnect attempts ({}) reached, falling back to polling",
            self.config.max_reconnect_attempts
        );
        self.set_state(ConnectionState::Polling);
        self.poll_loop().await;
    }

    /// Read/write loop for one open socket.
    async fn drive_socket(&mut self, mut stream: WsStream) -> SocketOutcome {
        // Discard anything queued while the socket was down.
        while self.outbound_rx.try_recv().is_ok() {}

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = stream.close(None).await;
                    return SocketOutcome::Cancelled;
                }

                Some(message) = self.outbound_rx.recv() => {
                    if let Err(e) = send_message(&mut stream, &message).await {
                        warn!("Failed to send message: {e}");
                        return SocketOutcome::Dropped;
                    }
                }

                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(&text, &mut stream).await;
                        }
                        // Pongs and control frames carry nothing for us.
                        Some(Ok(Message::Close(_))) | None => return SocketOutcome::Dropped,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("WebSocket error: {e}");
                            return SocketOutcome::Dropped;
                        }
                    }
                }
            }
        }
    }

    async fn handle_frame(&self, text: &str, stream: &mut WsStream) {
        match decode_frame(text) {
            Ok(ServerMessage::NewNotification(notification)) => {
                (self.on_message)(NotificationEvent::Notification(notification));
            }
            Ok(ServerMessage::AckRequest { notification_id }) => {
                // Delivery-confirmation handshake; answered without caller
                // involvement.
                debug!("Acknowledging notification {notification_id}");
                let ack = ClientMessage::Ack { notification_id };
                if let Err(e) = send_message(stream, &ack).await {
                    warn!("Failed to send ack: {e}");
                }
            }
            Ok(ServerMessage::Raw(value)) => {
                (self.on_message)(NotificationEvent::Raw(value));
            }
            Err(e) => {
                warn!("Dropping malformed frame: {e}");
            }
        }
    }

    /// Fallback loop: fetch pending notifications immediately, then on a
    /// fixed cadence. Fetches never overlap; a tick that fires while the
    /// previous fetch is still in flight is skipped.
    async fn poll_loop(&mut self) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = self.api.pending() => match result {
                    Ok(notifications) => {
                        for notification in notifications {
                            (self.on_message)(NotificationEvent::Notification(notification));
                        }
                    }
                    Err(e) => warn!("Polling error: {e}"),
                }
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }
}

async fn send_message(stream: &mut WsStream, message: &ClientMessage) -> Result<()> {
    let text = serde_json::to_string(message)?;
    stream
        .send(Message::Text(text))
        .await
        .map_err(|e| NotifyError::connection(e.to_string()))
}

/// Backoff delay for the given attempt (1-based): doubles per attempt
/// starting from the configured initial delay.
fn reconnect_delay(initial_delay_ms: u64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(63);
    Duration::from_millis(initial_delay_ms.saturating_mul(1u64 << exponent))
}

/// Socket URL with the bearer credential as a `token` query parameter.
fn socket_url(ws_url: &str, token: &str) -> Result<Url> {
    let mut url = Url::parse(ws_url)?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;

    #[test]
    fn test_reconnect_delay_schedule() {
        let delays: Vec<u64> = (1..=5)
            .map(|attempt| reconnect_delay(1000, attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[test]
    fn test_reconnect_delay_saturates() {
        // Absurd attempt numbers must not overflow.
        let delay = reconnect_delay(1000, 200);
        assert_eq!(delay, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_socket_url_appends_token() {
        let url = socket_url("ws://host:8000/ws/notifications/", "tok123").unwrap();
        assert_eq!(url.as_str(), "ws://host:8000/ws/notifications/?token=tok123");
    }

    #[test]
    fn test_socket_url_keeps_existing_query() {
        let url = socket_url("ws://host/ws/notifications/?v=2", "t").unwrap();
        assert_eq!(url.as_str(), "ws://host/ws/notifications/?v=2&token=t");
    }

    #[tokio::test]
    async fn test_client_starts_idle() {
        let client = NotificationClient::new(
            ClientConfig::default(),
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();

        assert_eq!(client.state(), ConnectionState::Idle);
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_send_while_disconnected_is_noop() {
        let client = NotificationClient::new(
            ClientConfig::default(),
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();

        client.ping();
        client.send_mark_read("1");
        client.send_mark_all_read();
        assert_eq!(client.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_idempotent() {
        let client = NotificationClient::new(
            ClientConfig::default(),
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();

        client.disconnect().await;
        client.disconnect().await;
        assert_eq!(client.state(), ConnectionState::Idle);
    }
}
