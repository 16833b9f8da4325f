//! Output formatting helpers for the watch command

use crate::stats::{
    health_severity, status_severity, Severity, StatisticsSnapshot, StatsStore, SystemHealth,
};
use crate::ws::ConnectionStatus;
use chrono::{TimeZone, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Render the full dashboard screen: banner, category table, footer.
pub fn format_dashboard(store: &StatsStore, status: ConnectionStatus) -> String {
    let mut out = String::new();
    out.push_str(&format_banner(store, status));
    out.push('\n');

    match store.snapshot() {
        Some(snapshot) => {
            out.push_str(&format_totals(&snapshot));
            out.push('\n');
            out.push_str(&format_categories_table(&snapshot));
        }
        None if store.is_loading() => out.push_str("Waiting for the first snapshot...\n"),
        None => out.push_str("No statistics received yet.\n"),
    }

    if let Some(error) = store.last_error() {
        out.push('\n');
        out.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
    }

    out
}

fn format_banner(store: &StatsStore, status: ConnectionStatus) -> String {
    let title = store
        .snapshot()
        .and_then(|s| s.title.clone())
        .unwrap_or_else(|| "Real-Time Statistics".to_string());

    let connection = match status {
        ConnectionStatus::Open => "● connected".green().to_string(),
        ConnectionStatus::Connecting => "◌ connecting".yellow().to_string(),
        ConnectionStatus::Closing => "◌ closing".yellow().to_string(),
        ConnectionStatus::Disconnected => "○ disconnected".red().to_string(),
    };

    let health = store.system_health();
    format!(
        "{}  [{}]  health: {}\n",
        title.bold(),
        connection,
        colorize_severity(health_label(health), health_severity(health))
    )
}

fn format_totals(snapshot: &StatisticsSnapshot) -> String {
    let generated = Utc
        .timestamp_millis_opt(snapshot.timestamp)
        .single()
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "transactions: {}  orders: {}  active users: {}  uptime: {}  report: {} @ {}\n",
        snapshot.total_transactions,
        snapshot.total_orders,
        snapshot.active_users,
        format_uptime(snapshot.system_uptime),
        snapshot.report_id,
        generated
    )
}

/// Format category counters as a table
pub fn format_categories_table(snapshot: &StatisticsSnapshot) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Category",
        "Status",
        "Total",
        "Success",
        "Failure",
        "Success Rate",
        "Avg Time",
    ]);

    for stat in &snapshot.statistics {
        let severity = status_severity(stat.status);
        table.add_row(vec![
            Cell::new(&stat.stat_type),
            Cell::new(colorize_severity(&format!("{:?}", stat.status), severity)),
            Cell::new(stat.total_count),
            Cell::new(stat.success_count),
            Cell::new(stat.failure_count),
            Cell::new(format!("{:.1}%", stat.success_rate)),
            Cell::new(format!("{:.1}ms", stat.avg_processing_time)),
        ]);
    }

    table.to_string()
}

/// Format the current state as JSON, for machine consumers.
pub fn format_state_json(store: &StatsStore, status: ConnectionStatus) -> String {
    serde_json::to_string(&json!({
        "status": format!("{:?}", status),
        "connected": store.is_connected(),
        "loading": store.is_loading(),
        "lastError": store.last_error(),
        "snapshot": store.snapshot().as_deref(),
    }))
    .unwrap_or_else(|_| "{}".to_string())
}

fn colorize_severity(text: &str, severity: Severity) -> String {
    match severity {
        Severity::Ok => text.green().to_string(),
        Severity::Warn => text.yellow().to_string(),
        Severity::Critical => text.red().to_string(),
        Severity::Unknown => text.dimmed().to_string(),
    }
}

fn health_label(health: SystemHealth) -> &'static str {
    match health {
        SystemHealth::Healthy => "HEALTHY",
        SystemHealth::Warning => "WARNING",
        SystemHealth::Critical => "CRITICAL",
        SystemHealth::Unknown => "UNKNOWN",
    }
}

fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    format!("{:02}:{:02}:{:02}", h, m, s)
}
