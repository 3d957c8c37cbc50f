//! Synced-device domain model.
//!
//! A `SyncedDevice` is the join record linking one source-inventory
//! device to its counterpart in one connection's monitoring system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sync state of one device mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sync_status", rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Success,
    Failed,
    Error,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Mapping between one source-inventory device and one monitoring-system
/// device within one connection.
///
/// Invariant: at most one record per (connection, source device) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncedDevice {
    pub id: Uuid,
    pub connection_id: Uuid,
    /// Non-owning reference to the external source-inventory device.
    pub source_device_id: Uuid,
    /// Device ID assigned by the monitoring system, once known.
    pub monitor_device_id: Option<String>,
    pub device_name: String,
    pub ip_address: String,
    pub sync_status: SyncStatus,
    /// Operator override to pause sync for this device.
    pub sync_enabled: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_sync_attempt: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response payload for synced-device listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncedDeviceResponse {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub source_device_id: Uuid,
    pub monitor_device_id: Option<String>,
    pub device_name: String,
    pub ip_address: String,
    pub sync_status: SyncStatus,
    pub sync_enabled: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_sync_attempt: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl From<SyncedDevice> for SyncedDeviceResponse {
    fn from(d: SyncedDevice) -> Self {
        Self {
            id: d.id,
            connection_id: d.connection_id,
            source_device_id: d.source_device_id,
            monitor_device_id: d.monitor_device_id,
            device_name: d.device_name,
            ip_address: d.ip_address,
            sync_status: d.sync_status,
            sync_enabled: d.sync_enabled,
            last_sync: d.last_sync,
            last_sync_attempt: d.last_sync_attempt,
            error_message: d.error_message,
        }
    }
}

/// Per-connection device counts for the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncedDeviceStats {
    pub total: i64,
    pub synced: i64,
    pub pending: i64,
    pub failed: i64,
    pub errors: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_display() {
        assert_eq!(SyncStatus::Pending.to_string(), "pending");
        assert_eq!(SyncStatus::Success.to_string(), "success");
        assert_eq!(SyncStatus::Failed.to_string(), "failed");
        assert_eq!(SyncStatus::Error.to_string(), "error");
    }

    #[test]
    fn test_sync_status_serde_round() {
        let status: SyncStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, SyncStatus::Failed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"failed\"");
    }

    #[test]
    fn test_synced_device_response_serialization() {
        let device = SyncedDevice {
            id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            source_device_id: Uuid::new_v4(),
            monitor_device_id: Some("4711".to_string()),
            device_name: "core-sw-01".to_string(),
            ip_address: "10.1.1.10".to_string(),
            sync_status: SyncStatus::Success,
            sync_enabled: true,
            last_sync: Some(Utc::now()),
            last_sync_attempt: Some(Utc::now()),
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&SyncedDeviceResponse::from(device)).unwrap();
        assert!(json.contains("\"sync_status\":\"success\""));
        assert!(json.contains("\"monitor_device_id\":\"4711\""));
    }
}
