//! Presentation mapping from health values to display severity.

use super::snapshot::{CategoryStatus, SystemHealth};

/// Display severity shared by system health and category status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warn,
    Critical,
    Unknown,
}

impl Severity {
    /// Hex color used when rendering this severity.
    pub fn hex(self) -> &'static str {
        match self {
            Severity::Ok => "#10b981",
            Severity::Warn => "#f59e0b",
            Severity::Critical => "#ef4444",
            Severity::Unknown => "#6b7280",
        }
    }
}

pub fn health_severity(health: SystemHealth) -> Severity {
    match health {
        SystemHealth::Healthy => Severity::Ok,
        SystemHealth::Warning => Severity::Warn,
        SystemHealth::Critical => Severity::Critical,
        SystemHealth::Unknown => Severity::Unknown,
    }
}

pub fn status_severity(status: CategoryStatus) -> Severity {
    match status {
        CategoryStatus::Active => Severity::Ok,
        CategoryStatus::Warning => Severity::Warn,
        CategoryStatus::Critical => Severity::Critical,
        CategoryStatus::Unknown => Severity::Unknown,
    }
}
