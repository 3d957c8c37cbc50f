//! Business-logic services.

pub mod conflict;
pub mod export;
pub mod sync_engine;

use domain::models::{Connection, DEFAULT_MONITOR_PORT};
use monitor::MonitorConfig;

use crate::config::SyncConfig;

/// Client configuration for one stored connection, with the service's
/// sync defaults applied.
pub(crate) fn monitor_config(connection: &Connection, defaults: &SyncConfig) -> MonitorConfig {
    let mut config = MonitorConfig::new(
        connection.host.clone(),
        connection.username.clone(),
        connection.password.clone(),
    );
    config.port = u16::try_from(connection.port).unwrap_or(DEFAULT_MONITOR_PORT as u16);
    config.use_ssl = connection.use_ssl;
    config.verify_ssl = connection.verify_ssl;
    config.timeout_secs = defaults.monitor_timeout_secs;
    config.device_name_prefix = defaults.device_name_prefix.clone();
    config.import_group = defaults.import_group.clone();
    config.bulk_import_group = defaults.bulk_import_group.clone();
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_monitor_config_from_connection() {
        let connection = Connection {
            id: Uuid::new_v4(),
            name: "Primary Monitor".to_string(),
            host: "monitor.example.com".to_string(),
            port: 8443,
            username: "api-user".to_string(),
            password: "api-password".to_string(),
            use_ssl: true,
            verify_ssl: true,
            is_active: true,
            enable_export: false,
            last_export: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let defaults = SyncConfig::default();

        let config = monitor_config(&connection, &defaults);
        assert_eq!(config.host, "monitor.example.com");
        assert_eq!(config.port, 8443);
        assert!(config.verify_ssl);
        assert_eq!(config.device_name_prefix, "inv");
        assert_eq!(config.import_group, "Inventory Imports");
    }
}
