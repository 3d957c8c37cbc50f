//! Sync-log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{SyncLogStatus, SyncType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the sync_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct SyncLogEntity {
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

impl From<SyncLogEntity> for domain::models::SyncLog {
    fn from(entity: SyncLogEntity) -> Self {
        Self {
            id: entity.id,
            connection_id: entity.connection_id,
            sync_type: entity.sync_type,
            status: entity.status,
            start_time: entity.start_time,
            end_time: entity.end_time,
            devices_discovered: entity.devices_discovered,
            devices_created: entity.devices_created,
            devices_updated: entity.devices_updated,
            devices_errors: entity.devices_errors,
            summary: entity.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_log_entity_to_domain() {
        let entity = SyncLogEntity {
            id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            sync_type: SyncType::Manual,
            status: SyncLogStatus::Completed,
            start_time: Utc::now(),
            end_time: Some(Utc::now()),
            devices_discovered: 10,
            devices_created: 3,
            devices_updated: 6,
            devices_errors: 1,
            summary: Some("manual sync finished".to_string()),
        };

        let log: domain::models::SyncLog = entity.clone().into();
        assert_eq!(log.id, entity.id);
        assert_eq!(log.sync_type, SyncType::Manual);
        assert_eq!(log.devices_discovered, 10);
        assert_eq!(log.success_rate(), 90.0);
    }
}
