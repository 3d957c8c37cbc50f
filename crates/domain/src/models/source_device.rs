//! Source-inventory device view.
//!
//! The source inventory is an external collaborator; devices are
//! referenced by ID only and their lifecycle is not owned here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a device in the source inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDeviceStatus {
    Active,
    Planned,
    Staged,
    Offline,
    Decommissioning,
}

impl std::fmt::Display for SourceDeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Planned => write!(f, "planned"),
            Self::Staged => write!(f, "staged"),
            Self::Offline => write!(f, "offline"),
            Self::Decommissioning => write!(f, "decommissioning"),
        }
    }
}

/// A device as exposed by the source-of-truth inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceDevice {
    pub id: Uuid,
    pub name: String,
    pub status: SourceDeviceStatus,
    /// Primary IPv4 address, possibly in CIDR notation.
    pub primary_ip4: Option<String>,
    pub site: Option<String>,
    pub role: Option<String>,
    pub platform: Option<String>,
    pub device_type: Option<String>,
    pub serial: Option<String>,
    pub asset_tag: Option<String>,
    pub comments: Option<String>,
}

impl SourceDevice {
    /// Primary IPv4 address with any CIDR suffix stripped.
    pub fn primary_ip(&self) -> Option<String> {
        self.primary_ip4
            .as_deref()
            .map(|ip| ip.split('/').next().unwrap_or(ip).to_string())
    }

    /// Whether the device is in the active lifecycle state.
    pub fn is_active(&self) -> bool {
        self.status == SourceDeviceStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn create_test_device(ip: Option<&str>) -> SourceDevice {
        SourceDevice {
            id: Uuid::new_v4(),
            name: "core-sw-01".to_string(),
            status: SourceDeviceStatus::Active,
            primary_ip4: ip.map(String::from),
            site: Some("DC-East".to_string()),
            role: Some("core-switch".to_string()),
            platform: Some("ios-xe".to_string()),
            device_type: Some("C9500-48Y4C".to_string()),
            serial: None,
            asset_tag: None,
            comments: Some("rack 12".to_string()),
        }
    }

    #[test]
    fn test_primary_ip_strips_cidr() {
        let device = create_test_device(Some("10.1.1.10/24"));
        assert_eq!(device.primary_ip(), Some("10.1.1.10".to_string()));
    }

    #[test]
    fn test_primary_ip_plain_address() {
        let device = create_test_device(Some("10.1.1.10"));
        assert_eq!(device.primary_ip(), Some("10.1.1.10".to_string()));
    }

    #[test]
    fn test_primary_ip_absent() {
        let device = create_test_device(None);
        assert_eq!(device.primary_ip(), None);
    }

    #[test]
    fn test_is_active() {
        let mut device = create_test_device(Some("10.1.1.10/24"));
        assert!(device.is_active());

        device.status = SourceDeviceStatus::Offline;
        assert!(!device.is_active());
    }

    #[test]
    fn test_status_deserialization() {
        let device: SourceDevice = serde_json::from_str(
            r#"{"id":"550e8400-e29b-41d4-a716-446655440000","name":"edge-rtr-01","status":"decommissioning"}"#,
        )
        .unwrap();
        assert_eq!(device.status, SourceDeviceStatus::Decommissioning);
        assert!(device.primary_ip4.is_none());
    }
}
