//! Request/response types for the monitoring API.
//!
//! The remote API is inconsistent about field names and envelopes, so
//! raw payloads are normalized here and kept alongside the parsed
//! fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How credentials are presented to a token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// JSON body `{username, password}`.
    Json,
    /// HTTP Basic `Authorization` header.
    Basic,
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Basic => write!(f, "basic"),
        }
    }
}

/// One token endpoint to try during authentication.
///
/// Candidates are ordered configuration data, not hard-coded branches:
/// new endpoints can be appended without touching the client logic.
#[derive(Debug, Clone)]
pub struct AuthCandidate {
    /// Path from the server root, e.g. `/api/v1/token`.
    pub path: String,
    pub scheme: AuthScheme,
}

impl AuthCandidate {
    pub fn new(path: impl Into<String>, scheme: AuthScheme) -> Self {
        Self {
            path: path.into(),
            scheme,
        }
    }
}

/// The default ordered candidate list: JSON-body attempts first, then
/// HTTP Basic against the same paths, then the legacy console paths.
pub fn default_auth_candidates() -> Vec<AuthCandidate> {
    vec![
        AuthCandidate::new("/api/v1/token", AuthScheme::Json),
        AuthCandidate::new("/api/token", AuthScheme::Json),
        AuthCandidate::new("/api/v1/token", AuthScheme::Basic),
        AuthCandidate::new("/api/token", AuthScheme::Basic),
        AuthCandidate::new("/auth/token", AuthScheme::Json),
        AuthCandidate::new("/console/api/token", AuthScheme::Json),
    ]
}

/// Token endpoint response. Some builds of the monitor return `token`,
/// others `access_token`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: Option<String>,
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub fn token_value(&self) -> Option<&str> {
        self.token.as_deref().or(self.access_token.as_deref())
    }
}

/// First string-ish value among `keys` in a JSON object. Numeric IDs
/// are stringified because the monitor mixes both representations.
pub(crate) fn value_str(raw: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match raw.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// A device entry from the monitoring system, normalized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitorDevice {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub location: Option<String>,
    pub group: Option<String>,
    pub status: Option<String>,
    /// Original payload, kept for fields not normalized above.
    pub raw: Value,
}

impl MonitorDevice {
    /// Normalize one raw device entry, mapping the monitor's aliased
    /// field names onto one shape.
    pub fn from_raw(raw: Value) -> Self {
        Self {
            id: value_str(&raw, &["id", "deviceId"]),
            name: value_str(&raw, &["displayName", "deviceName", "name"]),
            ip_address: value_str(&raw, &["ipAddress", "networkAddress", "ip_address"]),
            mac_address: value_str(&raw, &["macAddress", "mac_address"]),
            location: value_str(&raw, &["location"]),
            group: value_str(&raw, &["groupName", "group"]),
            status: value_str(&raw, &["status"]),
            raw,
        }
    }
}

/// A device group from the monitoring system.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DeviceGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub raw: Value,
}

impl DeviceGroup {
    pub fn from_raw(raw: Value) -> Self {
        Self {
            id: value_str(&raw, &["id", "groupId"]),
            name: value_str(&raw, &["name", "groupName", "displayName"]),
            raw,
        }
    }
}

/// Result of an add-by-IP operation.
#[derive(Debug, Clone)]
pub struct AddDeviceResult {
    pub success: bool,
    pub device_id: Option<String>,
    pub message: String,
    pub details: Value,
}

/// Result of triggering a discovery scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub success: bool,
    pub scan_id: String,
    pub message: String,
    pub details: Value,
}

/// Results of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanResults {
    pub scan_id: String,
    pub status: Option<String>,
    pub devices_found: Vec<Value>,
    pub summary: Value,
    pub errors: Vec<Value>,
}

/// Result of a bulk IP import.
#[derive(Debug, Clone)]
pub struct BulkAddResult {
    pub success: bool,
    pub batch_id: Option<String>,
    pub added_count: i64,
    pub failed_count: i64,
    pub scan_ids: Vec<String>,
    pub message: String,
    pub details: Value,
}

/// Result of a connection test. Never raises; failures are reported
/// in `message`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectionTest {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_count: Option<usize>,
}

/// Source-inventory metadata pushed into the monitor's custom fields.
#[derive(Debug, Clone, Default)]
pub struct DeviceMetadata {
    pub name: Option<String>,
    pub site: Option<String>,
    pub role: Option<String>,
    pub device_type: Option<String>,
    pub platform: Option<String>,
    pub serial: Option<String>,
    pub asset_tag: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_candidates_order() {
        let candidates = default_auth_candidates();
        assert_eq!(candidates.len(), 6);
        assert_eq!(candidates[0].path, "/api/v1/token");
        assert_eq!(candidates[0].scheme, AuthScheme::Json);
        assert_eq!(candidates[2].path, "/api/v1/token");
        assert_eq!(candidates[2].scheme, AuthScheme::Basic);
        assert_eq!(candidates[5].path, "/console/api/token");
    }

    #[test]
    fn test_token_response_prefers_token_field() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"token":"abc","access_token":"def","expires_in":600}"#,
        )
        .unwrap();
        assert_eq!(response.token_value(), Some("abc"));
    }

    #[test]
    fn test_token_response_falls_back_to_access_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"def"}"#).unwrap();
        assert_eq!(response.token_value(), Some("def"));
        assert!(response.expires_in.is_none());
    }

    #[test]
    fn test_device_normalization_camel_case_aliases() {
        let device = MonitorDevice::from_raw(json!({
            "deviceId": 4711,
            "displayName": "edge-rtr-01",
            "networkAddress": "10.9.9.9",
            "groupName": "Routers"
        }));
        assert_eq!(device.id.as_deref(), Some("4711"));
        assert_eq!(device.name.as_deref(), Some("edge-rtr-01"));
        assert_eq!(device.ip_address.as_deref(), Some("10.9.9.9"));
        assert_eq!(device.group.as_deref(), Some("Routers"));
    }

    #[test]
    fn test_device_normalization_prefers_id_over_device_id() {
        let device = MonitorDevice::from_raw(json!({"id": "1", "deviceId": "2"}));
        assert_eq!(device.id.as_deref(), Some("1"));
    }

    #[test]
    fn test_device_normalization_missing_fields() {
        let device = MonitorDevice::from_raw(json!({}));
        assert!(device.id.is_none());
        assert!(device.ip_address.is_none());
    }

    #[test]
    fn test_group_normalization() {
        let group = DeviceGroup::from_raw(json!({"groupId": 3, "name": "Core"}));
        assert_eq!(group.id.as_deref(), Some("3"));
        assert_eq!(group.name.as_deref(), Some("Core"));
    }
}
