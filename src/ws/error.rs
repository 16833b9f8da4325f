//! Error types for the statistics stream socket.

use thiserror::Error;

/// Errors that can occur while opening or driving the stream connection.
///
/// `Clone` so that concurrent callers sharing one pending connect attempt
/// can each receive the outcome.
#[derive(Debug, Clone, Error)]
pub enum SocketError {
    /// The configured endpoint is not a usable WebSocket URI
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The transport handshake was rejected or the peer is unreachable
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}
