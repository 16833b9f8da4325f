//! Connection state machine.
//!
//! All status changes go through [`ConnectionStatus::apply`]; nothing else
//! mutates the status. Unexpected event/status combinations are ignored
//! rather than panicking, since transport callbacks can race a deliberate
//! disconnect.

/// Lifecycle status of the statistics stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No transport; either never connected or terminally dropped
    Disconnected,
    /// A handshake is in flight
    Connecting,
    /// Transport is open and frames flow
    Open,
    /// A caller-initiated close is in progress
    Closing,
}

/// Named events that drive status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A caller asked for a new transport
    ConnectRequested,
    /// The handshake completed
    OpenSucceeded,
    /// The handshake was rejected or timed out
    OpenFailed,
    /// The transport closed (any cause)
    Closed,
    /// The caller asked for a deliberate close
    DisconnectRequested,
}

impl ConnectionStatus {
    /// Compute the status that follows `event`.
    ///
    /// Combinations not listed leave the status unchanged.
    pub fn apply(self, event: ConnectionEvent) -> ConnectionStatus {
        use ConnectionEvent::*;
        use ConnectionStatus::*;

        match (self, event) {
            (Disconnected, ConnectRequested) => Connecting,
            (Connecting, OpenSucceeded) => Open,
            (Connecting, OpenFailed) => Disconnected,
            (Connecting, DisconnectRequested) => Closing,
            (Open, Closed) => Disconnected,
            (Open, DisconnectRequested) => Closing,
            (Closing, Closed) => Disconnected,
            (current, _) => current,
        }
    }

    /// Whether outbound frames may be sent in this status.
    pub fn is_open(self) -> bool {
        self == ConnectionStatus::Open
    }
}
