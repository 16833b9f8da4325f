//! Statistics state container and stream monitor.
//!
//! [`StatsStore`] holds the latest snapshot plus connection metadata and
//! is safe to read from any task. [`StatsMonitor`] wires a
//! [`StatsSocket`] to a store: it registers the frame handlers, drives
//! the initial connect, and keeps a liveness ping running until shutdown.

pub mod snapshot;
pub mod view;

#[cfg(test)]
mod tests;

pub use snapshot::{CategoryStat, CategoryStatus, StatisticsSnapshot, SystemHealth};
pub use view::{health_severity, status_severity, Severity};

use crate::config::StreamConfig;
use crate::ws::{MessageKind, ServerFrame, SocketError, StatsSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Latest-wins container for statistics snapshots.
///
/// Readers always see either no snapshot or one complete snapshot;
/// updates replace the whole report atomically, never field by field.
#[derive(Default)]
pub struct StatsStore {
    snapshot: RwLock<Option<Arc<StatisticsSnapshot>>>,
    connected: AtomicBool,
    loading: AtomicBool,
    last_error: RwLock<Option<String>>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent snapshot, if any has arrived.
    pub fn snapshot(&self) -> Option<Arc<StatisticsSnapshot>> {
        self.snapshot
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }

    /// Overall health, derived from the current snapshot.
    ///
    /// Before the first snapshot arrives the system is presumed healthy;
    /// an absent report is a delivery gap, not an incident.
    pub fn system_health(&self) -> SystemHealth {
        self.snapshot()
            .map(|s| s.system_health)
            .unwrap_or(SystemHealth::Healthy)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// True between the start of a connect attempt and the outcome of
    /// that attempt.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Most recent connection or server-reported error, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .expect("last_error lock poisoned")
            .clone()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }

    pub fn set_error(&self, error: Option<String>) {
        *self.last_error.write().expect("last_error lock poisoned") = error;
    }

    /// Fold one inbound frame into the store.
    pub fn apply(&self, frame: &ServerFrame) {
        match frame {
            ServerFrame::StatsUpdate { data: Some(report) } => {
                *self.snapshot.write().expect("snapshot lock poisoned") =
                    Some(Arc::new(report.clone()));
                self.set_loading(false);
                self.set_error(None);
                tracing::debug!(
                    report_id = %report.report_id,
                    categories = report.statistics.len(),
                    "Applied statistics snapshot"
                );
            }
            ServerFrame::StatsUpdate { data: None } => {
                // A push with no payload carries nothing to apply; keep
                // the previous snapshot.
                tracing::warn!("Statistics update arrived without data; ignoring");
            }
            ServerFrame::Connected => {
                self.set_connected(true);
                self.set_error(None);
                tracing::info!("Statistics service acknowledged the session");
            }
            ServerFrame::Error { message } => {
                let message = message
                    .clone()
                    .unwrap_or_else(|| "server reported an unspecified error".to_string());
                tracing::error!(%message, "Statistics service reported an error");
                self.set_error(Some(message));
            }
            ServerFrame::Pong => {
                tracing::trace!("Liveness pong received");
            }
            ServerFrame::Unknown => {}
        }
    }
}

/// Drives one statistics stream into one [`StatsStore`].
pub struct StatsMonitor {
    socket: StatsSocket,
    store: Arc<StatsStore>,
    ping_interval: Duration,
    ping_started: AtomicBool,
    shutdown: CancellationToken,
}

impl StatsMonitor {
    /// Build a monitor for the configured stream. Fails on an unusable
    /// endpoint; no I/O happens until [`StatsMonitor::start`].
    ///
    /// Frame handlers are registered here, exactly once, so repeated
    /// `start()` calls never double them.
    pub fn new(config: &StreamConfig) -> Result<Self, SocketError> {
        let socket = StatsSocket::new(config)?;
        let store = Arc::new(StatsStore::new());

        for kind in [
            MessageKind::StatsUpdate,
            MessageKind::Connected,
            MessageKind::Error,
            MessageKind::Pong,
        ] {
            let store = Arc::clone(&store);
            socket.on(
                kind,
                Arc::new(move |frame| {
                    store.apply(frame);
                    Ok(())
                }),
            );
        }

        Ok(Self {
            socket,
            store,
            ping_interval: Duration::from_secs(config.ping_interval_seconds),
            ping_started: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn store(&self) -> Arc<StatsStore> {
        Arc::clone(&self.store)
    }

    pub fn socket(&self) -> &StatsSocket {
        &self.socket
    }

    /// Open the stream and start the ping loop.
    ///
    /// Idempotent: the connect is shared with any attempt already in
    /// flight and the ping loop is spawned at most once. On failure the
    /// store is left disconnected with the error recorded, so a consumer
    /// can render the failure without a second channel, and `start()` may
    /// be called again.
    pub async fn start(&self) -> Result<(), SocketError> {
        self.store.set_loading(true);
        match self.socket.connect().await {
            Ok(()) => {
                self.store.set_connected(true);
                self.store.set_loading(false);
                if !self.ping_started.swap(true, Ordering::SeqCst) {
                    self.spawn_ping_loop();
                }
                Ok(())
            }
            Err(e) => {
                self.store.set_connected(false);
                self.store.set_loading(false);
                self.store.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Stop the ping loop and close the stream. Terminal.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.socket.disconnect();
        self.store.set_connected(false);
    }

    fn spawn_ping_loop(&self) {
        let socket = self.socket.clone();
        let token = self.shutdown.clone();
        let period = self.ping_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; the subscribe frame
            // already announced us, so skip it.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!("Ping loop stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        socket.ping();
                    }
                }
            }
        });
    }
}
