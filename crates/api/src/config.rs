use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Sync behavior defaults applied to every connection.
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Pool settings in the form the persistence layer expects.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Prefix for default device names in the monitoring system.
    #[serde(default = "default_device_name_prefix")]
    pub device_name_prefix: String,

    /// Monitor-side group for devices created by event-driven sync.
    #[serde(default = "default_import_group")]
    pub import_group: String,

    /// Monitor-side group for bulk exports.
    #[serde(default = "default_bulk_import_group")]
    pub bulk_import_group: String,

    /// Per-request timeout for monitoring API calls.
    #[serde(default = "default_monitor_timeout")]
    pub monitor_timeout_secs: u64,

    /// Default page size for sync-log history queries.
    #[serde(default = "default_log_history_limit")]
    pub log_history_limit: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            device_name_prefix: default_device_name_prefix(),
            import_group: default_import_group(),
            bulk_import_group: default_bulk_import_group(),
            monitor_timeout_secs: default_monitor_timeout(),
            log_history_limit: default_log_history_limit(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_device_name_prefix() -> String {
    "inv".to_string()
}
fn default_import_group() -> String {
    "Inventory Imports".to_string()
}
fn default_bulk_import_group() -> String {
    "Inventory Bulk Import".to_string()
}
fn default_monitor_timeout() -> u64 {
    30
}
fn default_log_history_limit() -> i64 {
    20
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SYNC__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SYNC").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds entirely from embedded defaults and overrides, without
    /// relying on config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = "postgres://localhost/inventory_sync_test"
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [sync]
        "#;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            defaults,
            config::FileFormat::Toml,
        ));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "database.url".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_for_test_defaults() {
        let config = Config::load_for_test(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sync.device_name_prefix, "inv");
        assert_eq!(config.sync.import_group, "Inventory Imports");
        assert_eq!(config.sync.monitor_timeout_secs, 30);
    }

    #[test]
    fn test_load_for_test_overrides() {
        let config = Config::load_for_test(&[
            ("server.port", "9090"),
            ("sync.device_name_prefix", "netlab"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.sync.device_name_prefix, "netlab");
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[("server.host", "127.0.0.1")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_pool_config_conversion() {
        let config = Config::load_for_test(&[("database.max_connections", "7")]).unwrap();
        let pool_config = config.database.pool_config();
        assert_eq!(pool_config.max_connections, 7);
        assert!(pool_config.url.contains("inventory_sync_test"));
    }
}
