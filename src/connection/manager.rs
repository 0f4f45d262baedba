//! Connection manager for the real-time notification channel.
//!
//! Owns a single WebSocket transport inside a background task and exposes:
//!
//! - Connect/disconnect with a five-state lifecycle
//!   (`Connecting`/`Connected`/`Disconnected`/`Reconnecting`/`Error`)
//! - Exponential-backoff reconnection with a bounded attempt count
//! - A recurring application-level heartbeat `PING` while connected
//! - Three single-consumer event streams: state transitions, parsed message
//!   envelopes, and low-level transport errors
//!
//! The transport handle is exclusively owned by the background task; the
//! public [`ConnectionManager`] talks to it over a command channel, so every
//! operation is non-blocking and transitions are published in the order they
//! are decided.

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant as TokioInstant;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::{frame::coding::CloseCode, CloseFrame, Message},
};
use uuid::Uuid;

use crate::{
    connection::{
        websocket::{build_client_request, resolve_ws_url, with_token, WebSocketStream},
        DEFAULT_ERROR_CHANNEL_CAPACITY, DEFAULT_MESSAGE_CHANNEL_CAPACITY,
        DEFAULT_STATE_CHANNEL_CAPACITY, FAR_FUTURE, MAX_RECONNECT_DELAY_MS, NORMAL_CLOSE_CODE,
    },
    error::{Result, ThesiaLinkError},
    event_handlers::{ConnectionError, DisconnectReason, EventHandlers},
    models::{ConnectOptions, ConnectionState, MessageEnvelope, MessageType},
};

/// Delay before reconnection attempt number `attempt` (1-based):
/// `base * 2^(attempt-1)`, capped at 30s.
pub(crate) fn reconnect_delay_ms(base_delay_ms: u64, attempt: u32) -> u64 {
    base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
        .min(MAX_RECONNECT_DELAY_MS)
}

/// Stamp `timestamp` and a generated `id` when absent. Applied to every
/// outbound envelope before transmission and to every inbound envelope
/// before forwarding.
fn stamp_envelope(envelope: &mut MessageEnvelope) {
    if envelope.timestamp.is_none() {
        envelope.timestamp = Some(Utc::now());
    }
    if envelope.id.is_none() {
        envelope.id = Some(Uuid::new_v4().to_string());
    }
}

// ── Commands ────────────────────────────────────────────────────────────────

/// Commands sent from the public API to the background connection task.
enum ConnCmd {
    /// Open a connection, tearing down any existing one first.
    Connect { options: ConnectOptions },
    /// Deliberate disconnect: cancel timers, close with code 1000.
    Disconnect,
    /// Transmit an envelope; answers `false` when the transport is not open.
    Send {
        envelope: MessageEnvelope,
        result_tx: oneshot::Sender<bool>,
    },
    /// Tear down the task entirely (app teardown).
    Shutdown,
}

// ── Shared snapshot + event sinks ───────────────────────────────────────────

struct SharedState {
    state: RwLock<ConnectionState>,
}

/// Everything the background task publishes through: the state snapshot,
/// the three event channels and the optional callbacks.
struct EventSinks {
    shared: Arc<SharedState>,
    state_tx: mpsc::Sender<ConnectionState>,
    message_tx: mpsc::Sender<MessageEnvelope>,
    error_tx: mpsc::Sender<ConnectionError>,
    handlers: EventHandlers,
}

impl EventSinks {
    fn current_state(&self) -> ConnectionState {
        *self.shared.state.read().unwrap()
    }

    /// Record and publish a state transition, synchronously with the event
    /// that decided it.
    async fn publish_state(&self, next: ConnectionState) {
        {
            *self.shared.state.write().unwrap() = next;
        }
        self.handlers.emit_state_change(next);
        if self.state_tx.send(next).await.is_err() {
            log::debug!("[thesia-link] State receiver dropped");
        }
    }

    async fn publish_error(&self, error: ConnectionError) {
        self.handlers.emit_error(error.clone());
        if self.error_tx.send(error).await.is_err() {
            log::debug!("[thesia-link] Error receiver dropped");
        }
    }

    /// Forward an envelope on the message stream, stamping a receipt
    /// timestamp when the sender did not provide one.
    async fn forward(&self, mut envelope: MessageEnvelope) {
        if envelope.timestamp.is_none() {
            envelope.timestamp = Some(Utc::now());
        }
        if self.message_tx.send(envelope).await.is_err() {
            log::debug!("[thesia-link] Message receiver dropped");
        }
    }

    /// Synthesize and forward a local `SYSTEM_*` envelope.
    async fn publish_system(&self, message_type: MessageType, message: &str) {
        self.forward(MessageEnvelope::system(message_type, message)).await;
    }
}

// ── ConnectionManager (public handle) ───────────────────────────────────────

/// Handle to the background connection task.
///
/// Created via [`ConnectionManager::new`], which also returns the
/// [`ConnectionStreams`] bundle. Dropping the manager shuts the task down.
///
/// # Example
///
/// ```rust,no_run
/// use thesia_link::{ConnectOptions, ConnectionManager, EventHandlers};
///
/// # async fn example() -> thesia_link::Result<()> {
/// let (manager, mut streams) = ConnectionManager::new(EventHandlers::new());
/// manager
///     .connect_with_auth("http://localhost:8080/ws", "jwt-token", None)
///     .await?;
///
/// while let Some(state) = streams.states.recv().await {
///     println!("connection: {}", state);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConnectionManager {
    cmd_tx: mpsc::Sender<ConnCmd>,
    shared: Arc<SharedState>,
    _task: JoinHandle<()>,
}

/// The three single-consumer event streams of a [`ConnectionManager`].
///
/// Each stream has exactly one consumer; transitions and frames arrive in
/// the order they were decided, with no reordering.
pub struct ConnectionStreams {
    /// Strictly ordered connection state history.
    pub states: mpsc::Receiver<ConnectionState>,
    /// Parsed inbound frames plus locally synthesized `SYSTEM_*` and
    /// `PARSE_ERROR` envelopes. `PONG` frames are consumed silently and
    /// never appear here.
    pub messages: mpsc::Receiver<MessageEnvelope>,
    /// Low-level transport errors, for subscribers needing more detail than
    /// the state stream carries.
    pub errors: mpsc::Receiver<ConnectionError>,
}

impl ConnectionManager {
    /// Spawn the background connection task. No connection is opened until
    /// [`connect`](Self::connect) is called.
    pub fn new(handlers: EventHandlers) -> (Self, ConnectionStreams) {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ConnCmd>(64);
        let (state_tx, state_rx) = mpsc::channel(DEFAULT_STATE_CHANNEL_CAPACITY);
        let (message_tx, message_rx) = mpsc::channel(DEFAULT_MESSAGE_CHANNEL_CAPACITY);
        let (error_tx, error_rx) = mpsc::channel(DEFAULT_ERROR_CHANNEL_CAPACITY);

        let shared = Arc::new(SharedState {
            state: RwLock::new(ConnectionState::Disconnected),
        });

        let sinks = EventSinks {
            shared: shared.clone(),
            state_tx,
            message_tx,
            error_tx,
            handlers,
        };

        let task = tokio::spawn(async move {
            connection_task(cmd_rx, sinks).await;
        });

        (
            Self {
                cmd_tx,
                shared,
                _task: task,
            },
            ConnectionStreams {
                states: state_rx,
                messages: message_rx,
                errors: error_rx,
            },
        )
    }

    /// Open a connection with the given options.
    ///
    /// Returns immediately; completion is observed on the state stream. Any
    /// existing connection is torn down first (no dual connections). An
    /// empty `url` transitions straight to [`ConnectionState::Error`]
    /// without attempting any network I/O.
    pub async fn connect(&self, options: ConnectOptions) -> Result<()> {
        self.cmd_tx
            .send(ConnCmd::Connect { options })
            .await
            .map_err(|_| {
                ThesiaLinkError::WebSocketError("Connection task is not running".to_string())
            })
    }

    /// Convenience wrapper: resolve `base_url` to a WebSocket URL and append
    /// the bearer token as a url-encoded `token` query parameter — the only
    /// authentication mechanism for the real-time channel.
    pub async fn connect_with_auth(
        &self,
        base_url: &str,
        token: &str,
        options: Option<ConnectOptions>,
    ) -> Result<()> {
        let mut options = options.unwrap_or_default();
        options.url = with_token(&resolve_ws_url(base_url), token)?;
        self.connect(options).await
    }

    /// Deliberate disconnect: cancels the heartbeat and any pending
    /// reconnect, closes the transport with code 1000, resets the attempt
    /// counter and publishes [`ConnectionState::Disconnected`]. Idempotent.
    pub async fn disconnect(&self) {
        let _ = self.cmd_tx.send(ConnCmd::Disconnect).await;
    }

    /// Transmit an envelope over the transport.
    ///
    /// Returns `false` — without error — when the transport is not open. On
    /// success the envelope is stamped with a `timestamp` and a generated
    /// `id` before transmission.
    pub async fn send(&self, envelope: MessageEnvelope) -> bool {
        let (result_tx, result_rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(ConnCmd::Send {
                envelope,
                result_tx,
            })
            .await
            .is_err()
        {
            return false;
        }
        result_rx.await.unwrap_or(false)
    }

    /// Send a `PING` envelope. Used manually and by the heartbeat timer.
    pub async fn ping(&self) -> bool {
        self.send(MessageEnvelope::ping()).await
    }

    /// Synchronous snapshot of the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.read().unwrap()
    }

    /// Tear down the background task: closes any open transport and drops
    /// all timers. Part of the app-teardown lifecycle; prefer
    /// [`disconnect`](Self::disconnect) for a reconnectable close.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(ConnCmd::Shutdown).await;
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(ConnCmd::Shutdown);
    }
}

// ── Background connection task ──────────────────────────────────────────────

async fn open_transport(opts: &ConnectOptions) -> Result<WebSocketStream> {
    let request = build_client_request(&opts.url, &opts.protocols)?;
    let connect_timeout = Duration::from_millis(opts.connect_timeout_ms);

    let connect_result = if opts.connect_timeout_ms == 0 {
        connect_async(request).await
    } else {
        match tokio::time::timeout(connect_timeout, connect_async(request)).await {
            Ok(result) => result,
            Err(_) => {
                return Err(ThesiaLinkError::TimeoutError(format!(
                    "Connection timeout ({:?})",
                    connect_timeout
                )))
            }
        }
    };

    match connect_result {
        Ok((stream, _response)) => Ok(stream),
        Err(e) => Err(ThesiaLinkError::WebSocketError(format!(
            "Connection failed: {}",
            e
        ))),
    }
}

/// Close the transport with the deliberate-disconnect code.
async fn close_stream(stream: &mut WebSocketStream) {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: "client disconnect".into(),
    };
    if let Err(e) = stream.close(Some(frame)).await {
        log::debug!("[thesia-link] Close handshake failed: {}", e);
    }
}

async fn transmit(stream: &mut WebSocketStream, envelope: &MessageEnvelope) -> Result<()> {
    let payload = serde_json::to_string(envelope)?;
    stream
        .send(Message::Text(payload.into()))
        .await
        .map_err(|e| ThesiaLinkError::WebSocketError(format!("Failed to send frame: {}", e)))
}

/// Parse one inbound frame and route it: `PONG` is consumed silently, an
/// application-level `PING` is answered in place, everything else — the
/// `PARSE_ERROR` conversion of malformed payloads included — is forwarded.
async fn dispatch_frame(raw: &str, stream: &mut WebSocketStream, sinks: &EventSinks) {
    let envelope = MessageEnvelope::parse(raw);

    if envelope.message_type == MessageType::Pong {
        log::debug!("[thesia-link] Heartbeat: received PONG");
        return;
    }
    if envelope.message_type == MessageType::Ping {
        let mut reply = MessageEnvelope::pong();
        stamp_envelope(&mut reply);
        if let Err(e) = transmit(stream, &reply).await {
            log::warn!("[thesia-link] Failed to answer PING: {}", e);
        }
        return;
    }

    sinks.forward(envelope).await;
}

/// Publish state `Connecting` and attempt the handshake. On success the
/// attempt counter resets and the heartbeat is armed; on failure the state
/// goes to `Error` and the reconnection path takes over.
async fn try_open(
    opts: &ConnectOptions,
    ws: &mut Option<WebSocketStream>,
    attempts: &mut u32,
    reconnect_at: &mut Option<TokioInstant>,
    heartbeat_at: &mut TokioInstant,
    sinks: &EventSinks,
) {
    sinks.publish_state(ConnectionState::Connecting).await;
    log::debug!("[thesia-link] Establishing WebSocket connection to {}", opts.url);

    match open_transport(opts).await {
        Ok(stream) => {
            *ws = Some(stream);
            *attempts = 0;
            *reconnect_at = None;
            *heartbeat_at = TokioInstant::now() + Duration::from_millis(opts.heartbeat_interval_ms);
            log::info!("[thesia-link] Connected to {}", opts.url);
            sinks.publish_state(ConnectionState::Connected).await;
            sinks
                .publish_system(MessageType::SystemConnected, "Connection established")
                .await;
            sinks.handlers.emit_connect();
        }
        Err(e) => {
            log::warn!("[thesia-link] Connection attempt failed: {}", e);
            sinks
                .publish_error(ConnectionError::new(format!("Connection failed: {}", e), true))
                .await;
            sinks
                .publish_system(MessageType::SystemError, &format!("Connection failed: {}", e))
                .await;
            sinks.publish_state(ConnectionState::Error).await;
            schedule_reconnect(opts, attempts, reconnect_at, sinks).await;
        }
    }
}

/// Decide the next step after an unexpected close or transport failure:
/// either arm the backoff timer (`Reconnecting`) or give up (`Error`).
async fn schedule_reconnect(
    opts: &ConnectOptions,
    attempts: &mut u32,
    reconnect_at: &mut Option<TokioInstant>,
    sinks: &EventSinks,
) {
    if *attempts < opts.max_reconnect_attempts {
        *attempts += 1;
        let delay = reconnect_delay_ms(opts.reconnect_interval_ms, *attempts);
        log::info!(
            "[thesia-link] Reconnecting in {}ms (attempt {}/{})",
            delay,
            attempts,
            opts.max_reconnect_attempts
        );
        sinks.publish_state(ConnectionState::Reconnecting).await;
        *reconnect_at = Some(TokioInstant::now() + Duration::from_millis(delay));
    } else {
        log::warn!(
            "[thesia-link] Max reconnection attempts ({}) reached",
            opts.max_reconnect_attempts
        );
        sinks
            .publish_error(ConnectionError::new(
                "Max reconnection attempts reached",
                false,
            ))
            .await;
        if sinks.current_state() != ConnectionState::Error {
            sinks.publish_state(ConnectionState::Error).await;
        }
        *reconnect_at = None;
    }
}

/// Validate and apply a `connect()` request: reset the retry budget, fail
/// fast on an empty URL, otherwise attempt to open.
async fn start_connect(
    new_options: ConnectOptions,
    options: &mut Option<ConnectOptions>,
    ws: &mut Option<WebSocketStream>,
    attempts: &mut u32,
    reconnect_at: &mut Option<TokioInstant>,
    heartbeat_at: &mut TokioInstant,
    sinks: &EventSinks,
) {
    *reconnect_at = None;
    *attempts = 0;

    if new_options.url.trim().is_empty() {
        log::warn!("[thesia-link] connect() called with an empty URL");
        sinks
            .publish_error(ConnectionError::new(
                "connect() requires a non-empty URL",
                false,
            ))
            .await;
        sinks.publish_state(ConnectionState::Error).await;
        *options = None;
        return;
    }

    *options = Some(new_options);
    if let Some(opts) = options.as_ref() {
        try_open(opts, ws, attempts, reconnect_at, heartbeat_at, sinks).await;
    }
}

/// Transport failure while connected: error stream + `SYSTEM_ERROR` envelope
/// + `Error` state, then the reconnection path.
async fn fail_transport(
    message: String,
    options: &Option<ConnectOptions>,
    attempts: &mut u32,
    reconnect_at: &mut Option<TokioInstant>,
    sinks: &EventSinks,
) {
    sinks
        .publish_error(ConnectionError::new(message.clone(), true))
        .await;
    sinks
        .publish_system(MessageType::SystemError, &message)
        .await;
    sinks.handlers.emit_disconnect(DisconnectReason::new(message));
    sinks.publish_state(ConnectionState::Error).await;
    if let Some(opts) = options.as_ref() {
        schedule_reconnect(opts, attempts, reconnect_at, sinks).await;
    }
}

async fn connection_task(mut cmd_rx: mpsc::Receiver<ConnCmd>, sinks: EventSinks) {
    let mut options: Option<ConnectOptions> = None;
    let mut ws: Option<WebSocketStream> = None;
    let mut attempts: u32 = 0;
    let mut reconnect_at: Option<TokioInstant> = None;
    let mut heartbeat_at = TokioInstant::now() + FAR_FUTURE;

    loop {
        let heartbeat_enabled = ws.is_some() && options.as_ref().map_or(false, |o| o.heartbeat);
        let heartbeat_interval = Duration::from_millis(
            options.as_ref().map_or(30_000, |o| o.heartbeat_interval_ms),
        );

        if let Some(ref mut stream) = ws {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ConnCmd::Connect { options: new_options }) => {
                            close_stream(stream).await;
                            ws = None;
                            sinks.handlers.emit_disconnect(DisconnectReason::with_code(
                                "Superseded by a new connect()",
                                NORMAL_CLOSE_CODE,
                            ));
                            sinks
                                .publish_system(
                                    MessageType::SystemDisconnected,
                                    "Superseded by a new connect()",
                                )
                                .await;
                            sinks.publish_state(ConnectionState::Disconnected).await;
                            start_connect(
                                new_options,
                                &mut options,
                                &mut ws,
                                &mut attempts,
                                &mut reconnect_at,
                                &mut heartbeat_at,
                                &sinks,
                            )
                            .await;
                        }
                        Some(ConnCmd::Disconnect) => {
                            close_stream(stream).await;
                            ws = None;
                            reconnect_at = None;
                            attempts = 0;
                            log::info!("[thesia-link] Disconnected by client request");
                            sinks.handlers.emit_disconnect(DisconnectReason::with_code(
                                "Client disconnect",
                                NORMAL_CLOSE_CODE,
                            ));
                            sinks
                                .publish_system(MessageType::SystemDisconnected, "Client disconnect")
                                .await;
                            sinks.publish_state(ConnectionState::Disconnected).await;
                        }
                        Some(ConnCmd::Send { mut envelope, result_tx }) => {
                            stamp_envelope(&mut envelope);
                            match transmit(stream, &envelope).await {
                                Ok(()) => {
                                    let _ = result_tx.send(true);
                                }
                                Err(e) => {
                                    let _ = result_tx.send(false);
                                    log::warn!("[thesia-link] Send failed: {}", e);
                                    ws = None;
                                    fail_transport(
                                        format!("Send failed: {}", e),
                                        &options,
                                        &mut attempts,
                                        &mut reconnect_at,
                                        &sinks,
                                    )
                                    .await;
                                }
                            }
                        }
                        Some(ConnCmd::Shutdown) | None => {
                            close_stream(stream).await;
                            ws = None;
                            sinks.publish_state(ConnectionState::Disconnected).await;
                            return;
                        }
                    }
                }

                _ = tokio::time::sleep_until(heartbeat_at), if heartbeat_enabled => {
                    let mut ping = MessageEnvelope::ping();
                    stamp_envelope(&mut ping);
                    match transmit(stream, &ping).await {
                        Ok(()) => {
                            log::debug!("[thesia-link] Heartbeat PING sent");
                            heartbeat_at = TokioInstant::now() + heartbeat_interval;
                        }
                        Err(e) => {
                            log::warn!("[thesia-link] Heartbeat ping failed: {}", e);
                            ws = None;
                            fail_transport(
                                format!("Heartbeat ping failed: {}", e),
                                &options,
                                &mut attempts,
                                &mut reconnect_at,
                                &sinks,
                            )
                            .await;
                        }
                    }
                }

                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            dispatch_frame(text.as_str(), stream, &sinks).await;
                        }
                        Some(Ok(Message::Binary(data))) => {
                            match std::str::from_utf8(&data) {
                                Ok(text) => dispatch_frame(text, stream, &sinks).await,
                                Err(_) => {
                                    sinks
                                        .forward(MessageEnvelope::parse_error(
                                            &String::from_utf8_lossy(&data),
                                        ))
                                        .await;
                                }
                            }
                        }
                        Some(Ok(Message::Close(close))) => {
                            let (code, message) = match close {
                                Some(f) => (Some(u16::from(f.code)), f.reason.to_string()),
                                None => (None, "Connection closed".to_string()),
                            };
                            let reason = match code {
                                Some(c) => DisconnectReason::with_code(message.clone(), c),
                                None => DisconnectReason::new(message.clone()),
                            };
                            log::info!("[thesia-link] Server closed the connection: {}", reason);
                            sinks.handlers.emit_disconnect(reason);
                            sinks
                                .publish_system(MessageType::SystemDisconnected, &message)
                                .await;
                            ws = None;
                            if code == Some(NORMAL_CLOSE_CODE) {
                                attempts = 0;
                                reconnect_at = None;
                                sinks.publish_state(ConnectionState::Disconnected).await;
                            } else if let Some(ref opts) = options {
                                schedule_reconnect(opts, &mut attempts, &mut reconnect_at, &sinks)
                                    .await;
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            let _ = stream.send(Message::Pong(payload)).await;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            log::debug!("[thesia-link] Transport pong received");
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            ws = None;
                            fail_transport(
                                format!("WebSocket error: {}", e),
                                &options,
                                &mut attempts,
                                &mut reconnect_at,
                                &sinks,
                            )
                            .await;
                        }
                        None => {
                            log::info!("[thesia-link] WebSocket stream ended");
                            sinks
                                .handlers
                                .emit_disconnect(DisconnectReason::new("WebSocket stream ended"));
                            sinks
                                .publish_system(
                                    MessageType::SystemDisconnected,
                                    "WebSocket stream ended",
                                )
                                .await;
                            ws = None;
                            if let Some(ref opts) = options {
                                schedule_reconnect(opts, &mut attempts, &mut reconnect_at, &sinks)
                                    .await;
                            }
                        }
                    }
                }
            }
        } else if let Some(deadline) = reconnect_at {
            // ── Backoff pending — wait for the timer or a command ───────
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ConnCmd::Connect { options: new_options }) => {
                            start_connect(
                                new_options,
                                &mut options,
                                &mut ws,
                                &mut attempts,
                                &mut reconnect_at,
                                &mut heartbeat_at,
                                &sinks,
                            )
                            .await;
                        }
                        Some(ConnCmd::Disconnect) => {
                            reconnect_at = None;
                            attempts = 0;
                            log::info!("[thesia-link] Reconnection cancelled by client request");
                            sinks.handlers.emit_disconnect(DisconnectReason::with_code(
                                "Client disconnect",
                                NORMAL_CLOSE_CODE,
                            ));
                            sinks.publish_state(ConnectionState::Disconnected).await;
                        }
                        Some(ConnCmd::Send { result_tx, .. }) => {
                            let _ = result_tx.send(false);
                        }
                        Some(ConnCmd::Shutdown) | None => return,
                    }
                }

                _ = tokio::time::sleep_until(deadline) => {
                    reconnect_at = None;
                    if let Some(ref opts) = options {
                        try_open(
                            opts,
                            &mut ws,
                            &mut attempts,
                            &mut reconnect_at,
                            &mut heartbeat_at,
                            &sinks,
                        )
                        .await;
                    }
                }
            }
        } else {
            // ── Idle (Disconnected or terminal Error) ───────────────────
            match cmd_rx.recv().await {
                Some(ConnCmd::Connect { options: new_options }) => {
                    start_connect(
                        new_options,
                        &mut options,
                        &mut ws,
                        &mut attempts,
                        &mut reconnect_at,
                        &mut heartbeat_at,
                        &sinks,
                    )
                    .await;
                }
                Some(ConnCmd::Disconnect) => {
                    attempts = 0;
                    if sinks.current_state() != ConnectionState::Disconnected {
                        sinks.publish_state(ConnectionState::Disconnected).await;
                    }
                }
                Some(ConnCmd::Send { result_tx, .. }) => {
                    let _ = result_tx.send(false);
                }
                Some(ConnCmd::Shutdown) | None => return,
            }
        }
    }
}
