//! Export record domain model.
//!
//! Tracks one source-device IP queued for monitor-side
//! scan-after-create.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of one exported IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "export_status", rename_all = "snake_case")]
pub enum ExportStatus {
    Pending,
    Exported,
    ScanTriggered,
    ScanCompleted,
    Error,
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Exported => write!(f, "exported"),
            Self::ScanTriggered => write!(f, "scan_triggered"),
            Self::ScanCompleted => write!(f, "scan_completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One source-device IP queued for export to the monitoring system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportRecord {
    pub id: Uuid,
    pub connection_id: Uuid,
    /// Non-owning reference to the external source-inventory device.
    pub source_device_id: Uuid,
    pub ip_address: String,
    pub export_status: ExportStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate export counts for one connection.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportStats {
    pub total: i64,
    pub pending: i64,
    pub exported: i64,
    pub scan_triggered: i64,
    pub scan_completed: i64,
    pub errors: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_status_display() {
        assert_eq!(ExportStatus::Pending.to_string(), "pending");
        assert_eq!(ExportStatus::ScanTriggered.to_string(), "scan_triggered");
    }

    #[test]
    fn test_export_status_serde() {
        let status: ExportStatus = serde_json::from_str("\"scan_completed\"").unwrap();
        assert_eq!(status, ExportStatus::ScanCompleted);
    }

    #[test]
    fn test_export_stats_serialization() {
        let stats = ExportStats {
            total: 5,
            pending: 1,
            exported: 2,
            scan_triggered: 1,
            scan_completed: 1,
            errors: 0,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"total\":5"));
        assert!(json.contains("\"scan_triggered\":1"));
    }
}
