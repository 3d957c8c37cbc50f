//! Sync audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of sync operation recorded in a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "sync_type", rename_all = "snake_case")]
pub enum SyncType {
    /// Source-to-monitor device creation/update.
    Push,
    /// Monitor-to-source inventory read.
    Pull,
    /// Operator-triggered bulk reconciliation.
    Manual,
    /// Post-provisioning duplicate-IP check.
    IpConflictCheck,
}

impl std::fmt::Display for SyncType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
            Self::Manual => write!(f, "manual"),
            Self::IpConflictCheck => write!(f, "ip_conflict_check"),
        }
    }
}

/// Outcome of a sync operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sync_log_status", rename_all = "lowercase")]
pub enum SyncLogStatus {
    Running,
    Completed,
    Failed,
    Error,
    Warning,
}

impl std::fmt::Display for SyncLogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Append-only audit record of one sync operation.
///
/// Created at the start of every attempt and finalized at the end;
/// never mutated after completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncLog {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub sync_type: SyncType,
    pub status: SyncLogStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub devices_discovered: i32,
    pub devices_created: i32,
    pub devices_updated: i32,
    pub devices_errors: i32,
    pub summary: Option<String>,
}

impl SyncLog {
    /// Percentage of discovered devices processed without error.
    ///
    /// Returns 0.0 when nothing was discovered.
    pub fn success_rate(&self) -> f64 {
        if self.devices_discovered <= 0 {
            return 0.0;
        }
        let ok = (self.devices_discovered - self.devices_errors).max(0);
        f64::from(ok) / f64::from(self.devices_discovered) * 100.0
    }
}

/// Response payload for sync-log queries, with the derived rate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncLogResponse {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub sync_type: SyncType,
    pub status: SyncLogStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub devices_discovered: i32,
    pub devices_created: i32,
    pub devices_updated: i32,
    pub devices_errors: i32,
    pub success_rate: f64,
    pub summary: Option<String>,
}

impl From<SyncLog> for SyncLogResponse {
    fn from(log: SyncLog) -> Self {
        let success_rate = log.success_rate();
        Self {
            id: log.id,
            connection_id: log.connection_id,
            sync_type: log.sync_type,
            status: log.status,
            start_time: log.start_time,
            end_time: log.end_time,
            devices_discovered: log.devices_discovered,
            devices_created: log.devices_created,
            devices_updated: log.devices_updated,
            devices_errors: log.devices_errors,
            success_rate,
            summary: log.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_log(discovered: i32, errors: i32) -> SyncLog {
        SyncLog {
            id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            sync_type: SyncType::Push,
            status: SyncLogStatus::Completed,
            start_time: Utc::now(),
            end_time: Some(Utc::now()),
            devices_discovered: discovered,
            devices_created: 1,
            devices_updated: 0,
            devices_errors: errors,
            summary: None,
        }
    }

    #[test]
    fn test_success_rate_all_ok() {
        let log = create_test_log(4, 0);
        assert_eq!(log.success_rate(), 100.0);
    }

    #[test]
    fn test_success_rate_partial() {
        let log = create_test_log(4, 1);
        assert_eq!(log.success_rate(), 75.0);
    }

    #[test]
    fn test_success_rate_empty() {
        let log = create_test_log(0, 0);
        assert_eq!(log.success_rate(), 0.0);
    }

    #[test]
    fn test_success_rate_errors_exceed_discovered() {
        let log = create_test_log(1, 2);
        assert_eq!(log.success_rate(), 0.0);
    }

    #[test]
    fn test_sync_type_display() {
        assert_eq!(SyncType::Push.to_string(), "push");
        assert_eq!(SyncType::IpConflictCheck.to_string(), "ip_conflict_check");
    }

    #[test]
    fn test_sync_type_serde() {
        let t: SyncType = serde_json::from_str("\"ip_conflict_check\"").unwrap();
        assert_eq!(t, SyncType::IpConflictCheck);
    }

    #[test]
    fn test_response_carries_success_rate() {
        let response = SyncLogResponse::from(create_test_log(2, 1));
        assert_eq!(response.success_rate, 50.0);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success_rate\":50.0"));
    }
}
