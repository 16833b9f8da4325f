//! Wire frame definitions for the statistics stream.
//!
//! The protocol is JSON objects tagged by a `type` field. Server frame
//! types outside the recognized set decode to [`ServerFrame::Unknown`]
//! so that new server-side message types never break the client.

use crate::stats::snapshot::StatisticsSnapshot;
use serde::{Deserialize, Serialize};

/// Message kind used as the dispatch key for inbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    StatsUpdate,
    Connected,
    Error,
    Pong,
    Unknown,
}

/// A frame pushed by the statistics service.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// A full statistics snapshot; `data` may be absent on malformed pushes
    #[serde(rename = "STATS_UPDATE")]
    StatsUpdate {
        #[serde(default)]
        data: Option<StatisticsSnapshot>,
    },

    /// Hello frame sent by the server after it registers the session
    #[serde(rename = "CONNECTED")]
    Connected,

    /// Application-level error reported by the server
    #[serde(rename = "ERROR")]
    Error {
        #[serde(default)]
        message: Option<String>,
    },

    /// Reply to a liveness ping
    #[serde(rename = "PONG")]
    Pong,

    /// Any `type` tag this client does not recognize
    #[serde(other)]
    Unknown,
}

impl ServerFrame {
    pub fn kind(&self) -> MessageKind {
        match self {
            ServerFrame::StatsUpdate { .. } => MessageKind::StatsUpdate,
            ServerFrame::Connected => MessageKind::Connected,
            ServerFrame::Error { .. } => MessageKind::Error,
            ServerFrame::Pong => MessageKind::Pong,
            ServerFrame::Unknown => MessageKind::Unknown,
        }
    }
}

/// A control frame sent by this client.
///
/// All control frames are fire-and-forget; no acknowledgement is awaited.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    #[serde(rename = "SUBSCRIBE")]
    Subscribe { channel: String, timestamp: i64 },

    #[serde(rename = "UNSUBSCRIBE")]
    Unsubscribe { channel: String, timestamp: i64 },

    #[serde(rename = "PING")]
    Ping { timestamp: i64 },
}

impl ClientFrame {
    pub fn subscribe(channel: &str) -> Self {
        ClientFrame::Subscribe {
            channel: channel.to_string(),
            timestamp: epoch_millis(),
        }
    }

    pub fn unsubscribe(channel: &str) -> Self {
        ClientFrame::Unsubscribe {
            channel: channel.to_string(),
            timestamp: epoch_millis(),
        }
    }

    pub fn ping() -> Self {
        ClientFrame::Ping {
            timestamp: epoch_millis(),
        }
    }
}

/// Current wall-clock time as epoch milliseconds, the protocol's timestamp unit.
pub fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
