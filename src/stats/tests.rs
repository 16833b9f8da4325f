use super::snapshot::{CategoryStat, CategoryStatus, StatisticsSnapshot, SystemHealth};
use super::view::{health_severity, status_severity, Severity};
use super::StatsStore;
use crate::ws::ServerFrame;
use proptest::prelude::*;

fn snapshot(report_id: &str, health: SystemHealth) -> StatisticsSnapshot {
    StatisticsSnapshot {
        report_id: report_id.to_string(),
        title: Some("Real-Time Statistics".to_string()),
        timestamp: 1_726_000_000_000,
        system_uptime: 3600.0,
        total_transactions: 1250,
        total_orders: 430,
        active_users: 17,
        system_health: health,
        statistics: vec![CategoryStat {
            stat_type: "ORDER".to_string(),
            status: CategoryStatus::Active,
            total_count: 430,
            success_count: 425,
            failure_count: 5,
            success_rate: 98.8,
            avg_processing_time: 12.4,
            last_updated: 1_726_000_000_000,
        }],
    }
}

mod store {
    use super::*;

    #[test]
    fn starts_empty_and_presumed_healthy() {
        let store = StatsStore::new();
        assert!(store.snapshot().is_none());
        assert_eq!(store.system_health(), SystemHealth::Healthy);
        assert!(!store.is_connected());
        assert!(!store.is_loading());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn stats_update_replaces_snapshot_wholesale() {
        let store = StatsStore::new();
        store.apply(&ServerFrame::StatsUpdate {
            data: Some(snapshot("r-1", SystemHealth::Healthy)),
        });
        store.apply(&ServerFrame::StatsUpdate {
            data: Some(snapshot("r-2", SystemHealth::Warning)),
        });

        let current = store.snapshot().unwrap();
        assert_eq!(current.report_id, "r-2");
        assert_eq!(store.system_health(), SystemHealth::Warning);
    }

    #[test]
    fn stats_update_without_data_keeps_previous_snapshot() {
        let store = StatsStore::new();
        store.apply(&ServerFrame::StatsUpdate {
            data: Some(snapshot("r-1", SystemHealth::Healthy)),
        });
        store.apply(&ServerFrame::StatsUpdate { data: None });

        assert_eq!(store.snapshot().unwrap().report_id, "r-1");
    }

    #[test]
    fn stats_update_clears_loading_and_error() {
        let store = StatsStore::new();
        store.set_loading(true);
        store.set_error(Some("stale failure".to_string()));

        store.apply(&ServerFrame::StatsUpdate {
            data: Some(snapshot("r-1", SystemHealth::Healthy)),
        });

        assert!(!store.is_loading());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn connected_frame_marks_connected_and_clears_error() {
        let store = StatsStore::new();
        store.set_error(Some("handshake refused".to_string()));

        store.apply(&ServerFrame::Connected);

        assert!(store.is_connected());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn error_frame_records_message_without_dropping_connection() {
        let store = StatsStore::new();
        store.set_connected(true);

        store.apply(&ServerFrame::Error {
            message: Some("subscription rejected".to_string()),
        });

        assert!(store.is_connected());
        assert_eq!(store.last_error().as_deref(), Some("subscription rejected"));
    }

    #[test]
    fn error_frame_without_message_still_records_something() {
        let store = StatsStore::new();
        store.apply(&ServerFrame::Error { message: None });
        assert!(store.last_error().is_some());
    }

    #[test]
    fn pong_frame_changes_nothing() {
        let store = StatsStore::new();
        store.apply(&ServerFrame::StatsUpdate {
            data: Some(snapshot("r-1", SystemHealth::Critical)),
        });

        store.apply(&ServerFrame::Pong);

        assert_eq!(store.snapshot().unwrap().report_id, "r-1");
        assert_eq!(store.system_health(), SystemHealth::Critical);
    }
}

mod wire {
    use super::*;

    #[test]
    fn snapshot_decodes_from_camel_case() {
        let report: StatisticsSnapshot = serde_json::from_str(
            r#"{
                "reportId": "rpt-42",
                "title": "Real-Time Statistics",
                "timestamp": 1726000000000,
                "systemUptime": 120.5,
                "totalTransactions": 900,
                "totalOrders": 300,
                "activeUsers": 8,
                "systemHealth": "WARNING",
                "statistics": [{
                    "statType": "PAYMENT",
                    "status": "CRITICAL",
                    "totalCount": 50,
                    "successCount": 30,
                    "failureCount": 20,
                    "successRate": 60.0,
                    "avgProcessingTime": 45.2,
                    "lastUpdated": 1726000000000
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(report.report_id, "rpt-42");
        assert_eq!(report.system_health, SystemHealth::Warning);
        assert_eq!(report.statistics[0].stat_type, "PAYMENT");
        assert_eq!(report.statistics[0].status, CategoryStatus::Critical);
        assert_eq!(report.statistics[0].failure_count, 20);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let report: StatisticsSnapshot = serde_json::from_str(r#"{"reportId":"rpt-1"}"#).unwrap();
        assert_eq!(report.system_health, SystemHealth::Healthy);
        assert!(report.statistics.is_empty());
        assert!(report.title.is_none());
        assert_eq!(report.total_orders, 0);
    }

    #[test]
    fn unrecognized_health_value_decodes_to_unknown() {
        let report: StatisticsSnapshot =
            serde_json::from_str(r#"{"systemHealth":"DEGRADED"}"#).unwrap();
        assert_eq!(report.system_health, SystemHealth::Unknown);
    }

    // Counters are not cross-validated on decode; the producer owns
    // consistency and an inconsistent report is still displayed.
    #[test]
    fn inconsistent_counters_are_accepted() {
        let report: StatisticsSnapshot = serde_json::from_str(
            r#"{"statistics":[{"statType":"ORDER","totalCount":10,"successCount":9,"failureCount":9}]}"#,
        )
        .unwrap();
        let stat = &report.statistics[0];
        assert_ne!(stat.success_count + stat.failure_count, stat.total_count);
    }

    proptest! {
        #[test]
        fn arbitrary_counters_never_break_decoding(
            total in 0u64..1_000_000,
            success in 0u64..1_000_000,
            failure in 0u64..1_000_000,
            rate in -1000.0f64..1000.0,
        ) {
            let json = format!(
                r#"{{"statistics":[{{"statType":"ORDER","totalCount":{},"successCount":{},"failureCount":{},"successRate":{}}}]}}"#,
                total, success, failure, rate
            );
            let report: StatisticsSnapshot = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(report.statistics[0].total_count, total);
        }
    }
}

mod severity {
    use super::*;

    #[test]
    fn health_maps_to_severity() {
        assert_eq!(health_severity(SystemHealth::Healthy), Severity::Ok);
        assert_eq!(health_severity(SystemHealth::Warning), Severity::Warn);
        assert_eq!(health_severity(SystemHealth::Critical), Severity::Critical);
        assert_eq!(health_severity(SystemHealth::Unknown), Severity::Unknown);
    }

    #[test]
    fn category_status_maps_to_severity() {
        assert_eq!(status_severity(CategoryStatus::Active), Severity::Ok);
        assert_eq!(status_severity(CategoryStatus::Warning), Severity::Warn);
        assert_eq!(status_severity(CategoryStatus::Critical), Severity::Critical);
        assert_eq!(status_severity(CategoryStatus::Unknown), Severity::Unknown);
    }

    #[test]
    fn severity_colors_match_the_palette() {
        assert_eq!(Severity::Ok.hex(), "#10b981");
        assert_eq!(Severity::Warn.hex(), "#f59e0b");
        assert_eq!(Severity::Critical.hex(), "#ef4444");
        assert_eq!(Severity::Unknown.hex(), "#6b7280");
    }
}
