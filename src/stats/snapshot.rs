//! Wire model for statistics snapshots.
//!
//! Field names follow the service's camelCase JSON. Every field is
//! defaulted so a snapshot missing optional sections still decodes;
//! the stream must stay up even when the producer sends partial data.

use serde::{Deserialize, Serialize};

/// A complete point-in-time statistics report.
///
/// Snapshots are self-contained; consumers replace their previous copy
/// wholesale rather than merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    #[serde(default)]
    pub report_id: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Epoch milliseconds at which the producer assembled the report
    #[serde(default)]
    pub timestamp: i64,

    /// Seconds since the producing service started
    #[serde(default)]
    pub system_uptime: f64,

    #[serde(default)]
    pub total_transactions: u64,

    #[serde(default)]
    pub total_orders: u64,

    #[serde(default)]
    pub active_users: u64,

    #[serde(default)]
    pub system_health: SystemHealth,

    /// Per-category breakdown; order is producer-defined
    #[serde(default)]
    pub statistics: Vec<CategoryStat>,
}

/// Rolled-up counters for one event category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    #[serde(default)]
    pub stat_type: String,

    #[serde(default)]
    pub status: CategoryStatus,

    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub success_count: u64,

    #[serde(default)]
    pub failure_count: u64,

    /// Percentage in [0, 100], computed by the producer
    #[serde(default)]
    pub success_rate: f64,

    /// Average processing time in milliseconds
    #[serde(default)]
    pub avg_processing_time: f64,

    /// Epoch milliseconds of the last event counted into this category
    #[serde(default)]
    pub last_updated: i64,
}

/// Overall system condition as judged by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemHealth {
    #[default]
    Healthy,
    Warning,
    Critical,
    /// Any value this client does not recognize
    #[serde(other)]
    Unknown,
}

/// Condition of a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryStatus {
    #[default]
    Active,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}
