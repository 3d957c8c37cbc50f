//! Synced-device entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::SyncStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the synced_devices table.
#[derive(Debug, Clone, FromRow)]
pub struct SyncedDeviceEntity {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SyncedDeviceEntity> for domain::models::SyncedDevice {
    fn from(entity: SyncedDeviceEntity) -> Self {
        Self {
            id: entity.id,
            connection_id: entity.connection_id,
            source_device_id: entity.source_device_id,
            monitor_device_id: entity.monitor_device_id,
            device_name: entity.device_name,
            ip_address: entity.ip_address,
            sync_status: entity.sync_status,
            sync_enabled: entity.sync_enabled,
            last_sync: entity.last_sync,
            last_sync_attempt: entity.last_sync_attempt,
            error_message: entity.error_message,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entity() -> SyncedDeviceEntity {
        SyncedDeviceEntity {
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
        }
    }

    #[test]
    fn test_synced_device_entity_to_domain() {
        let entity = create_test_entity();
        let device: domain::models::SyncedDevice = entity.clone().into();

        assert_eq!(device.id, entity.id);
        assert_eq!(device.connection_id, entity.connection_id);
        assert_eq!(device.source_device_id, entity.source_device_id);
        assert_eq!(device.monitor_device_id, entity.monitor_device_id);
        assert_eq!(device.sync_status, SyncStatus::Success);
    }

    #[test]
    fn test_synced_device_entity_optional_fields() {
        let mut entity = create_test_entity();
        entity.monitor_device_id = None;
        entity.last_sync = None;

        let device: domain::models::SyncedDevice = entity.into();
        assert!(device.monitor_device_id.is_none());
        assert!(device.last_sync.is_none());
    }
}
