//! Duplicate-IP detection across both inventories.
//!
//! Runs after a device is created in the monitoring system: the same
//! IP appearing on another source device or another monitor device is
//! reported, never auto-resolved.

use domain::models::{ConflictSide, IpConflict, IpConflictReport, SourceDevice};
use domain::services::SourceInventory;
use monitor::{MonitorClient, MonitorDevice};
use tracing::warn;
use uuid::Uuid;

const UNKNOWN: &str = "Unknown";

/// Check one freshly provisioned IP against both inventories.
///
/// `own_monitor_id` is the monitor-side ID of the device that was just
/// created, so it does not conflict with itself. The monitor-side
/// lookup is best effort: a fetch failure is logged and the report is
/// built from the source matches alone.
pub async fn check_ip_conflict(
    inventory: &dyn SourceInventory,
    client: &mut MonitorClient,
    device: &SourceDevice,
    ip: &str,
    own_monitor_id: Option<&str>,
) -> IpConflictReport {
    let source_matches = inventory.find_by_primary_ip(ip).await;
    let monitor_devices = match client.get_devices(false).await {
        Ok(devices) => devices,
        Err(e) => {
            warn!(ip = %ip, error = %e, "monitor device lookup failed during conflict check");
            Vec::new()
        }
    };
    build_report(
        &device.name,
        device.id,
        ip,
        &source_matches,
        &monitor_devices,
        own_monitor_id,
    )
}

/// Pure conflict aggregation over already-fetched device lists.
pub fn build_report(
    device_name: &str,
    source_device_id: Uuid,
    ip: &str,
    source_matches: &[SourceDevice],
    monitor_devices: &[MonitorDevice],
    own_monitor_id: Option<&str>,
) -> IpConflictReport {
    let mut conflicts = Vec::new();

    for other in source_matches {
        if other.id == source_device_id {
            continue;
        }
        conflicts.push(IpConflict {
            side: ConflictSide::Source,
            device_name: other.name.clone(),
            device_id: other.id.to_string(),
            ip_address: ip.to_string(),
            location: other.site.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        });
    }

    for other in monitor_devices {
        if other.ip_address.as_deref() != Some(ip) {
            continue;
        }
        if own_monitor_id.is_some() && other.id.as_deref() == own_monitor_id {
            continue;
        }
        conflicts.push(IpConflict {
            side: ConflictSide::Monitor,
            device_name: other.name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            device_id: other.id.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            ip_address: ip.to_string(),
            location: other.location.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        });
    }

    IpConflictReport {
        ip_address: ip.to_string(),
        device_name: device_name.to_string(),
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::SourceDeviceStatus;
    use domain::services::InMemorySourceInventory;
    use monitor::MonitorConfig;
    use serde_json::json;

    fn source_device(name: &str, ip: &str, site: Option<&str>) -> SourceDevice {
        SourceDevice {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: SourceDeviceStatus::Active,
            primary_ip4: Some(ip.to_string()),
            site: site.map(String::from),
            role: None,
            platform: None,
            device_type: None,
            serial: None,
            asset_tag: None,
            comments: None,
        }
    }

    #[test]
    fn test_own_device_does_not_conflict() {
        let device = source_device("core-sw-01", "10.0.0.5/24", None);
        let monitor_device = MonitorDevice::from_raw(json!({
            "id": "100", "displayName": "core-sw-01", "ipAddress": "10.0.0.5"
        }));

        let report = build_report(
            &device.name,
            device.id,
            "10.0.0.5",
            std::slice::from_ref(&device),
            &[monitor_device],
            Some("100"),
        );
        assert!(report.is_empty());
    }

    #[test]
    fn test_source_side_conflict() {
        let device = source_device("core-sw-01", "10.0.0.5/24", None);
        let other = source_device("old-sw-09", "10.0.0.5", Some("DC-East"));

        let report = build_report(
            &device.name,
            device.id,
            "10.0.0.5",
            &[device.clone(), other.clone()],
            &[],
            None,
        );
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].side, ConflictSide::Source);
        assert_eq!(report.conflicts[0].device_name, "old-sw-09");
        assert_eq!(report.conflicts[0].location, "DC-East");
    }

    #[test]
    fn test_monitor_side_conflict_with_missing_fields() {
        let device = source_device("core-sw-01", "10.0.0.5/24", None);
        let stranger = MonitorDevice::from_raw(json!({"ipAddress": "10.0.0.5"}));
        let unrelated = MonitorDevice::from_raw(json!({"id": "7", "ipAddress": "10.9.9.9"}));

        let report = build_report(
            &device.name,
            device.id,
            "10.0.0.5",
            &[],
            &[stranger, unrelated],
            Some("100"),
        );
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].side, ConflictSide::Monitor);
        assert_eq!(report.conflicts[0].device_name, "Unknown");
        assert_eq!(report.conflicts[0].device_id, "Unknown");
    }

    #[tokio::test]
    async fn test_monitor_fetch_failure_keeps_source_conflicts() {
        let inventory = InMemorySourceInventory::new();
        let device = source_device("core-sw-01", "10.0.0.5/24", None);
        let other = source_device("old-sw-09", "10.0.0.5", Some("DC-East"));
        inventory.upsert(device.clone()).await;
        inventory.upsert(other).await;

        // Nothing listens on the discard port, so every monitor call
        // fails; the source-side conflict must survive that.
        let mut config = MonitorConfig::new("127.0.0.1", "api-user", "api-password");
        config.use_ssl = false;
        config.port = 9;
        config.timeout_secs = 1;
        let mut client = MonitorClient::new(config).unwrap();

        let report = check_ip_conflict(&inventory, &mut client, &device, "10.0.0.5", None).await;
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].side, ConflictSide::Source);
        assert_eq!(report.conflicts[0].device_name, "old-sw-09");
    }

    #[test]
    fn test_conflicts_from_both_sides_are_combined() {
        let device = source_device("core-sw-01", "10.0.0.5/24", None);
        let other = source_device("old-sw-09", "10.0.0.5", None);
        let stranger = MonitorDevice::from_raw(json!({
            "id": "1007", "displayName": "legacy-host", "ipAddress": "10.0.0.5"
        }));

        let report = build_report(
            &device.name,
            device.id,
            "10.0.0.5",
            &[other],
            &[stranger],
            None,
        );
        assert_eq!(report.conflicts.len(), 2);
        let summary = report.summary();
        assert!(summary.contains("SOURCE: old-sw-09"));
        assert!(summary.contains("MONITOR: legacy-host"));
    }
}
