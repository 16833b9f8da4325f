//! Statistics stream configuration

use serde::{Deserialize, Serialize};

/// Settings for the statistics stream connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// WebSocket endpoint of the statistics service
    pub endpoint: String,
    /// Channel named in the subscription frame
    pub channel: String,
    /// Reconnect attempts allowed per outage before giving up
    pub max_reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay_ms: u64,
    /// Liveness ping period
    pub ping_interval_seconds: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8083/ws/statistics".to_string(),
            channel: "statistics".to_string(),
            max_reconnect_attempts: 5,
            reconnect_delay_ms: 3000,
            ping_interval_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.endpoint, "ws://localhost:8083/ws/statistics");
        assert_eq!(config.channel, "statistics");
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.reconnect_delay_ms, 3000);
        assert_eq!(config.ping_interval_seconds, 30);
    }

    #[test]
    fn test_stream_config_partial_toml() {
        let config: StreamConfig = toml::from_str("endpoint = \"wss://ops.example/ws\"").unwrap();
        assert_eq!(config.endpoint, "wss://ops.example/ws");
        assert_eq!(config.max_reconnect_attempts, 5);
    }
}
