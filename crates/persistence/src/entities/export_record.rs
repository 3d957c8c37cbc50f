//! Export-record entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::ExportStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the export_records table.
#[derive(Debug, Clone, FromRow)]
pub struct ExportRecordEntity {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub source_device_id: Uuid,
    pub ip_address: String,
    pub export_status: ExportStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExportRecordEntity> for domain::models::ExportRecord {
    fn from(entity: ExportRecordEntity) -> Self {
        Self {
            id: entity.id,
            connection_id: entity.connection_id,
            source_device_id: entity.source_device_id,
            ip_address: entity.ip_address,
            export_status: entity.export_status,
            error_message: entity.error_message,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_record_entity_to_domain() {
        let entity = ExportRecordEntity {
            id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            source_device_id: Uuid::new_v4(),
            ip_address: "10.0.0.5".to_string(),
            export_status: ExportStatus::ScanTriggered,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let record: domain::models::ExportRecord = entity.clone().into();
        assert_eq!(record.id, entity.id);
        assert_eq!(record.export_status, ExportStatus::ScanTriggered);
        assert_eq!(record.ip_address, "10.0.0.5");
    }
}
