//! Statistics stream connection manager.
//!
//! Owns at most one WebSocket connection to the statistics endpoint,
//! delivers inbound frames to registered handlers, and recovers from
//! transport drops with a bounded number of fixed-delay reconnect
//! attempts. A deliberate [`StatsSocket::disconnect`] is terminal and
//! never triggers reconnection.

mod dispatch;
mod error;
mod frame;
mod state;


pub use dispatch::{Handler, HandlerId, HandlerRegistry};
pub use error::SocketError;
pub use frame::{epoch_millis, ClientFrame, MessageKind, ServerFrame};
pub use state::{ConnectionEvent, ConnectionStatus};

use crate::config::StreamConfig;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

type Transport = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingConnect = Shared<BoxFuture<'static, Result<(), SocketError>>>;

/// Client for the statistics push stream.
///
/// Cheap to clone; all clones drive the same underlying connection.
#[derive(Clone)]
pub struct StatsSocket {
    inner: Arc<SocketShared>,
}

struct SocketShared {
    endpoint: String,
    channel: String,
    max_reconnect_attempts: u32,
    reconnect_delay: Duration,
    registry: HandlerRegistry,
    status: Mutex<ConnectionStatus>,
    /// Sender side of the writer task for the current connection
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    /// Monotonic id of the current physical connection; dispatch is
    /// guarded on it so frames from a superseded connection are dropped
    generation: AtomicU64,
    reconnect_attempts: AtomicU32,
    last_pong: Mutex<Option<DateTime<Utc>>>,
    /// Cancelled by disconnect(); aborts any pending scheduled reconnect
    shutdown: CancellationToken,
    /// Shared in-flight connect attempt, so concurrent connect() calls
    /// open at most one transport
    pending_connect: tokio::sync::Mutex<Option<PendingConnect>>,
}

impl StatsSocket {
    /// Create a socket for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::InvalidEndpoint`] when the endpoint is empty
    /// or is not a `ws://`/`wss://` URI. A missing endpoint is a
    /// configuration error, never silently defaulted here.
    pub fn new(config: &StreamConfig) -> Result<Self, SocketError> {
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(SocketError::InvalidEndpoint {
                endpoint: String::new(),
                reason: "endpoint is not set".to_string(),
            });
        }

        let parsed = Url::parse(endpoint).map_err(|e| SocketError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(SocketError::InvalidEndpoint {
                    endpoint: endpoint.to_string(),
                    reason: format!("unsupported scheme '{}'", other),
                })
            }
        }

        Ok(Self {
            inner: Arc::new(SocketShared {
                endpoint: endpoint.to_string(),
                channel: config.channel.clone(),
                max_reconnect_attempts: config.max_reconnect_attempts,
                reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
                registry: HandlerRegistry::new(),
                status: Mutex::new(ConnectionStatus::Disconnected),
                outbound: Mutex::new(None),
                generation: AtomicU64::new(0),
                reconnect_attempts: AtomicU32::new(0),
                last_pong: Mutex::new(None),
                shutdown: CancellationToken::new(),
                pending_connect: tokio::sync::Mutex::new(None),
            }),
        })
    }

    /// Open the transport and subscribe to the configured channel.
    ///
    /// Resolves once the handshake for this attempt succeeds or fails.
    /// While a handshake is already in flight, concurrent callers await
    /// the same attempt instead of opening a second transport.
    ///
    /// A failed call surfaces the error to the caller and schedules
    /// nothing; automatic reconnection is driven only by transport drops
    /// after a successful open.
    pub async fn connect(&self) -> Result<(), SocketError> {
        SocketShared::connect_shared(Arc::clone(&self.inner)).await
    }

    /// Close the transport deliberately.
    ///
    /// Terminal: cancels any pending scheduled reconnect and guarantees
    /// no handler invocation occurs after this returns, even for frames
    /// already in flight.
    pub fn disconnect(&self) {
        self.inner.shutdown.cancel();
        // Supersede the live connection before closing so the reader task
        // stops dispatching immediately.
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.transition(ConnectionEvent::DisconnectRequested);
        if let Some(tx) = self
            .inner
            .outbound
            .lock()
            .expect("outbound lock poisoned")
            .take()
        {
            let _ = tx.send(Message::Close(None));
        }
        self.inner.transition(ConnectionEvent::Closed);
        tracing::info!("Statistics stream disconnected");
    }

    /// Send a `SUBSCRIBE` control frame. Silent no-op when not connected.
    pub fn subscribe(&self, channel: &str) {
        self.inner.send_frame(&ClientFrame::subscribe(channel));
    }

    /// Send an `UNSUBSCRIBE` control frame. Silent no-op when not connected.
    pub fn unsubscribe(&self, channel: &str) {
        self.inner.send_frame(&ClientFrame::unsubscribe(channel));
    }

    /// Send an arbitrary JSON-serializable payload. No queuing: when the
    /// transport is not open the payload is dropped with a warning.
    pub fn send<T: Serialize>(&self, payload: &T) {
        match serde_json::to_string(payload) {
            Ok(json) => self.inner.send_text(json),
            Err(e) => tracing::error!(error = %e, "Failed to serialize outbound payload"),
        }
    }

    /// Send a liveness `PING`. The server is expected to answer with a
    /// `PONG` frame; no pairing or timeout is tracked here (see
    /// [`StatsSocket::last_pong`]).
    pub fn ping(&self) {
        self.inner.send_frame(&ClientFrame::ping());
    }

    /// Register a handler for a message kind. Handlers persist across
    /// reconnects. Multiple handlers per kind run in registration order.
    pub fn on(&self, kind: MessageKind, handler: Handler) -> HandlerId {
        self.inner.registry.on(kind, handler)
    }

    /// Remove a handler registered with [`StatsSocket::on`].
    pub fn off(&self, kind: MessageKind, id: HandlerId) -> bool {
        self.inner.registry.off(kind, id)
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: MessageKind) -> usize {
        self.inner.registry.handler_count(kind)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.status()
    }

    /// Whether the transport is open and outbound frames will be sent.
    pub fn is_ready(&self) -> bool {
        self.inner.status().is_open()
    }

    /// Reconnect attempts consumed since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.reconnect_attempts.load(Ordering::SeqCst)
    }

    /// When the last `PONG` arrived, if any. Consumers can layer their
    /// own liveness timeout on top of this.
    pub fn last_pong(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_pong.lock().expect("last_pong lock poisoned")
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }
}

impl SocketShared {
    fn status(&self) -> ConnectionStatus {
        *self.status.lock().expect("status lock poisoned")
    }

    /// Apply a named event to the state machine. The only place the
    /// connection status is mutated.
    fn transition(&self, event: ConnectionEvent) {
        let mut status = self.status.lock().expect("status lock poisoned");
        let next = status.apply(event);
        if next != *status {
            tracing::debug!(from = ?*status, to = ?next, ?event, "Connection status changed");
            *status = next;
        }
    }

    /// Connect, sharing one in-flight attempt between concurrent callers.
    async fn connect_shared(inner: Arc<SocketShared>) -> Result<(), SocketError> {
        if inner.shutdown.is_cancelled() {
            // disconnect() is terminal; a fresh socket is required.
            return Err(SocketError::ConnectionFailed(
                "socket was shut down".to_string(),
            ));
        }
        let attempt = {
            let mut pending = inner.pending_connect.lock().await;
            match inner.status() {
                ConnectionStatus::Open => return Ok(()),
                ConnectionStatus::Connecting => match pending.as_ref() {
                    Some(shared) => shared.clone(),
                    None => Self::begin_attempt(&inner, &mut pending),
                },
                _ => {
                    // Transition under the lock so a racing caller sees
                    // Connecting and joins this attempt.
                    inner.transition(ConnectionEvent::ConnectRequested);
                    Self::begin_attempt(&inner, &mut pending)
                }
            }
        };
        attempt.await
    }

    fn begin_attempt(
        inner: &Arc<SocketShared>,
        pending: &mut Option<PendingConnect>,
    ) -> PendingConnect {
        let shared = Self::open(Arc::clone(inner)).boxed().shared();
        *pending = Some(shared.clone());
        shared
    }

    /// Perform one handshake. The caller has already moved the state
    /// machine to `Connecting`.
    async fn open(inner: Arc<SocketShared>) -> Result<(), SocketError> {
        tracing::debug!(endpoint = %inner.endpoint, "Opening statistics stream");

        let mut transport = match connect_async(inner.endpoint.as_str()).await {
            Ok((transport, _response)) => transport,
            Err(e) => {
                inner.transition(ConnectionEvent::OpenFailed);
                tracing::warn!(endpoint = %inner.endpoint, error = %e, "Handshake failed");
                return Err(SocketError::ConnectionFailed(e.to_string()));
            }
        };

        // disconnect() may have raced the handshake; a cancelled socket
        // must never come up as Open or dispatch frames.
        if inner.shutdown.is_cancelled() {
            let _ = transport.close(None).await;
            tracing::debug!("Handshake completed after disconnect; dropping transport");
            return Err(SocketError::ConnectionFailed(
                "socket was shut down".to_string(),
            ));
        }

        let (sink, stream) = transport.split();
        let (tx, rx) = mpsc::unbounded_channel();
        *inner.outbound.lock().expect("outbound lock poisoned") = Some(tx);

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        inner.reconnect_attempts.store(0, Ordering::SeqCst);
        inner.transition(ConnectionEvent::OpenSucceeded);
        tracing::info!(endpoint = %inner.endpoint, "Statistics stream connected");

        tokio::spawn(Self::write_loop(sink, rx));
        tokio::spawn(Self::read_loop(Arc::clone(&inner), stream, generation));

        // Re-subscribe on every open: a subscription lost with the old
        // connection heals on the next one.
        inner.send_frame(&ClientFrame::subscribe(&inner.channel));

        // Cancellation may have landed between the check above and task
        // startup. Supersede the connection so the reader stops
        // dispatching, and tear the transport down.
        if inner.shutdown.is_cancelled() {
            inner.generation.fetch_add(1, Ordering::SeqCst);
            inner
                .outbound
                .lock()
                .expect("outbound lock poisoned")
                .take();
            inner.transition(ConnectionEvent::DisconnectRequested);
            inner.transition(ConnectionEvent::Closed);
            return Err(SocketError::ConnectionFailed(
                "socket was shut down".to_string(),
            ));
        }

        Ok(())
    }

    /// Drain outbound frames into the sink until the channel or the
    /// transport closes.
    async fn write_loop(mut sink: SplitSink<Transport, Message>, mut rx: mpsc::UnboundedReceiver<Message>) {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                break;
            }
            if closing {
                break;
            }
        }
        let _ = sink.close().await;
    }

    /// Read inbound frames for one physical connection and dispatch them.
    async fn read_loop(inner: Arc<SocketShared>, mut stream: SplitStream<Transport>, generation: u64) {
        while let Some(item) = stream.next().await {
            if inner.generation.load(Ordering::SeqCst) != generation {
                // Superseded by a disconnect or a newer connection.
                return;
            }
            match item {
                Ok(Message::Text(text)) => inner.handle_frame(&text),
                Ok(Message::Close(_)) => break,
                Ok(_) => {
                    // Binary and transport-level ping/pong frames are not
                    // part of the protocol.
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Statistics stream error");
                    break;
                }
            }
        }

        if inner.generation.load(Ordering::SeqCst) != generation {
            return;
        }

        inner
            .outbound
            .lock()
            .expect("outbound lock poisoned")
            .take();
        inner.transition(ConnectionEvent::Closed);
        tracing::warn!("Statistics stream closed");
        inner.schedule_reconnect();
    }

    /// Decode one text frame and fan it out to registered handlers.
    /// Malformed JSON is absorbed here and never reaches handlers.
    fn handle_frame(&self, text: &str) {
        let frame: ServerFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed frame");
                return;
            }
        };

        if matches!(frame, ServerFrame::Pong) {
            *self.last_pong.lock().expect("last_pong lock poisoned") = Some(Utc::now());
        }

        let invoked = self.registry.dispatch(&frame);
        tracing::debug!(kind = ?frame.kind(), invoked, "Dispatched inbound frame");
    }

    /// Schedule one reconnect attempt after the fixed delay, unless the
    /// cap is reached. A failed attempt schedules the next one; attempts
    /// reset to zero only on a successful open.
    fn schedule_reconnect(self: &Arc<Self>) {
        let attempts = self.reconnect_attempts.load(Ordering::SeqCst);
        if attempts >= self.max_reconnect_attempts {
            tracing::error!(
                attempts,
                max = self.max_reconnect_attempts,
                "Reconnect attempts exhausted; staying disconnected"
            );
            return;
        }
        let attempt = self.reconnect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            attempt,
            max = self.max_reconnect_attempts,
            delay_ms = self.reconnect_delay.as_millis() as u64,
            "Scheduling reconnect"
        );

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = inner.shutdown.cancelled() => {
                    tracing::debug!(attempt, "Pending reconnect cancelled by shutdown");
                }
                _ = tokio::time::sleep(inner.reconnect_delay) => {
                    match Self::connect_shared(Arc::clone(&inner)).await {
                        Ok(()) => {}
                        Err(e) => {
                            tracing::warn!(attempt, error = %e, "Reconnect attempt failed");
                            inner.schedule_reconnect();
                        }
                    }
                }
            }
        });
    }

    fn send_frame(&self, frame: &ClientFrame) {
        match serde_json::to_string(frame) {
            Ok(json) => self.send_text(json),
            Err(e) => tracing::error!(error = %e, "Failed to serialize control frame"),
        }
    }

    /// Best-effort send. Re-checks readiness at send time; a connection
    /// lost since the caller's check means the frame is dropped, never a
    /// panic or an error.
    fn send_text(&self, json: String) {
        if !self.status().is_open() {
            tracing::warn!("Statistics stream is not connected; dropping outbound frame");
            return;
        }
        match self
            .outbound
            .lock()
            .expect("outbound lock poisoned")
            .as_ref()
        {
            Some(tx) => {
                let _ = tx.send(Message::Text(json));
            }
            None => {
                tracing::warn!("Outbound channel already closed; dropping frame");
            }
        }
    }
}
