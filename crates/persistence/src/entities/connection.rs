//! Connection entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the connections table.
#[derive(Debug, Clone, FromRow)]
pub struct ConnectionEntity {
    pub id: Uuid,
    pub name: String,
    pub host: String,
    pub port: i32,
    pub username: String,
    pub password: String,
    pub use_ssl: bool,
    pub verify_ssl: bool,
    pub is_active: bool,
    pub enable_export: bool,
    pub last_export: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConnectionEntity> for domain::models::Connection {
    fn from(entity: ConnectionEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            host: entity.host,
            port: entity.port,
            username: entity.username,
            password: entity.password,
            use_ssl: entity.use_ssl,
            verify_ssl: entity.verify_ssl,
            is_active: entity.is_active,
            enable_export: entity.enable_export,
            last_export: entity.last_export,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entity() -> ConnectionEntity {
        ConnectionEntity {
            id: Uuid::new_v4(),
            name: "Primary Monitor".to_string(),
            host: "monitor.example.com".to_string(),
            port: 9644,
            username: "api-user".to_string(),
            password: "api-password".to_string(),
            use_ssl: true,
            verify_ssl: false,
            is_active: true,
            enable_export: false,
            last_export: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_connection_entity_to_domain() {
        let entity = create_test_entity();
        let connection: domain::models::Connection = entity.clone().into();

        assert_eq!(connection.id, entity.id);
        assert_eq!(connection.host, entity.host);
        assert_eq!(connection.port, entity.port);
        assert_eq!(connection.username, entity.username);
        assert_eq!(connection.is_active, entity.is_active);
        assert!(connection.last_export.is_none());
    }
}
