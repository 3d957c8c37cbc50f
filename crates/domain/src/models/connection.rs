//! Monitoring-system connection domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Configuration for one monitoring-system endpoint.
///
/// Connections are created by operators and read by every sync
/// operation. They are soft-disabled via `is_active`, never deleted
/// implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Connection {
    pub id: Uuid,
    pub name: String,
    pub host: String,
    pub port: i32,
    pub username: String,
    pub password: String,
    pub use_ssl: bool,
    pub verify_ssl: bool,
    pub is_active: bool,
    /// Whether source-to-monitor export is allowed for this connection.
    pub enable_export: bool,
    pub last_export: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default API port for the monitoring system.
pub const DEFAULT_MONITOR_PORT: i32 = 9644;

fn default_port() -> i32 {
    DEFAULT_MONITOR_PORT
}

fn default_use_ssl() -> bool {
    true
}

fn default_is_active() -> bool {
    true
}

/// Request payload for creating a connection.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateConnectionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Host must be 1-255 characters"))]
    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1, max = 65535, message = "Port must be 1-65535"))]
    pub port: i32,

    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 255, message = "Password must be 1-255 characters"))]
    pub password: String,

    #[serde(default = "default_use_ssl")]
    pub use_ssl: bool,

    #[serde(default)]
    pub verify_ssl: bool,

    #[serde(default = "default_is_active")]
    pub is_active: bool,

    #[serde(default)]
    pub enable_export: bool,
}

/// Request payload for updating a connection (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateConnectionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Host must be 1-255 characters"))]
    pub host: Option<String>,

    #[validate(range(min = 1, max = 65535, message = "Port must be 1-65535"))]
    pub port: Option<i32>,

    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Password must be 1-255 characters"))]
    pub password: Option<String>,

    pub use_ssl: Option<bool>,
    pub verify_ssl: Option<bool>,
    pub is_active: Option<bool>,
    pub enable_export: Option<bool>,
}

/// Response payload for connection operations.
///
/// Credentials are never serialized back out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectionResponse {
    pub id: Uuid,
    pub name: String,
    pub host: String,
    pub port: i32,
    pub username: String,
    pub use_ssl: bool,
    pub verify_ssl: bool,
    pub is_active: bool,
    pub enable_export: bool,
    pub last_export: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Connection> for ConnectionResponse {
    fn from(c: Connection) -> Self {
        Self {
            id: c.id,
            name: c.name,
            host: c.host,
            port: c.port,
            username: c.username,
            use_ssl: c.use_ssl,
            verify_ssl: c.verify_ssl,
            is_active: c.is_active,
            enable_export: c.enable_export,
            last_export: c.last_export,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_connection() -> Connection {
        Connection {
            id: Uuid::new_v4(),
            name: "Primary Monitor".to_string(),
            host: "monitor.example.com".to_string(),
            port: DEFAULT_MONITOR_PORT,
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
    fn test_create_request_defaults() {
        let json = r#"{
            "name": "Primary Monitor",
            "host": "monitor.example.com",
            "username": "api-user",
            "password": "api-password"
        }"#;

        let request: CreateConnectionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.port, DEFAULT_MONITOR_PORT);
        assert!(request.use_ssl);
        assert!(!request.verify_ssl);
        assert!(request.is_active);
        assert!(!request.enable_export);
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateConnectionRequest {
            name: String::new(),
            host: "monitor.example.com".to_string(),
            port: 9644,
            username: "api-user".to_string(),
            password: "api-password".to_string(),
            use_ssl: true,
            verify_ssl: false,
            is_active: true,
            enable_export: false,
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_port_out_of_range() {
        let json = r#"{
            "name": "Primary Monitor",
            "host": "monitor.example.com",
            "port": 0,
            "username": "api-user",
            "password": "api-password"
        }"#;

        let request: CreateConnectionRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_partial() {
        let json = r#"{"is_active": false}"#;
        let request: UpdateConnectionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.is_active, Some(false));
        assert!(request.name.is_none());
        assert!(request.password.is_none());
    }

    #[test]
    fn test_response_omits_password() {
        let connection = create_test_connection();
        let response = ConnectionResponse::from(connection);

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("api-password"));
        assert!(json.contains("\"host\":\"monitor.example.com\""));
    }
}
