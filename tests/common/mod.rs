//! Shared helpers for integration tests: a minimal in-process
//! statistics service speaking the same JSON frame protocol.

use futures_util::{SinkExt, StreamExt};
use statdash::config::StreamConfig;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// Bind an ephemeral listener and return it with its ws:// endpoint.
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("ws://{}/ws/statistics", addr))
}

/// Stream config with short timings suitable for tests.
pub fn stream_config(endpoint: &str) -> StreamConfig {
    StreamConfig {
        endpoint: endpoint.to_string(),
        channel: "statistics".to_string(),
        max_reconnect_attempts: 3,
        reconnect_delay_ms: 150,
        ping_interval_seconds: 30,
    }
}

/// Accept one connection, consume the subscription frame, push the given
/// frames, then keep the connection open until the peer closes it.
pub fn spawn_stream_server(listener: TcpListener, frames: Vec<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        // First inbound message is the SUBSCRIBE frame.
        let first = ws.next().await.unwrap().unwrap();
        assert!(first.to_text().unwrap().contains("SUBSCRIBE"));

        for frame in frames {
            ws.send(Message::Text(frame)).await.unwrap();
        }

        // Hold the connection open; exit when the peer closes it.
        while let Some(Ok(msg)) = ws.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    })
}

/// Poll `condition` until it holds or `deadline` elapses.
pub async fn wait_for<F: Fn() -> bool>(deadline: Duration, condition: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

pub fn stats_update_frame(report_id: &str, health: &str) -> String {
    format!(
        r#"{{"type":"STATS_UPDATE","data":{{"reportId":"{}","title":"Order Platform","timestamp":1726000000000,"systemUptime":3600.0,"totalTransactions":1250,"totalOrders":430,"activeUsers":17,"systemHealth":"{}","statistics":[{{"statType":"ORDER","status":"ACTIVE","totalCount":430,"successCount":425,"failureCount":5,"successRate":98.8,"avgProcessingTime":12.4,"lastUpdated":1726000000000}}]}}}}"#,
        report_id, health
    )
}
