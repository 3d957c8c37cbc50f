//! IP-conflict report types.

use serde::{Deserialize, Serialize};

/// Which inventory a conflicting device was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSide {
    Source,
    Monitor,
}

impl std::fmt::Display for ConflictSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Monitor => write!(f, "monitor"),
        }
    }
}

/// One device found sharing an IP address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IpConflict {
    pub side: ConflictSide,
    pub device_name: String,
    pub device_id: String,
    pub ip_address: String,
    pub location: String,
}

/// Union of all conflicts detected for one IP after provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IpConflictReport {
    pub ip_address: String,
    /// Name of the device that was just provisioned at this IP.
    pub device_name: String,
    pub conflicts: Vec<IpConflict>,
}

impl IpConflictReport {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Aggregated warning text for logs and the audit trail.
    pub fn summary(&self) -> String {
        let details: Vec<String> = self
            .conflicts
            .iter()
            .map(|c| {
                format!(
                    "{}: {} (ID: {}, Location: {})",
                    c.side.to_string().to_uppercase(),
                    c.device_name,
                    c.device_id,
                    c.location
                )
            })
            .collect();

        format!(
            "IP conflict detected for {}: device {} shares this IP with: {}",
            self.ip_address,
            self.device_name,
            details.join("; ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_single_source_conflict() {
        let report = IpConflictReport {
            ip_address: "10.0.0.5".to_string(),
            device_name: "core-sw-01".to_string(),
            conflicts: vec![IpConflict {
                side: ConflictSide::Source,
                device_name: "old-sw-09".to_string(),
                device_id: "42".to_string(),
                ip_address: "10.0.0.5".to_string(),
                location: "DC-East".to_string(),
            }],
        };

        let summary = report.summary();
        assert!(summary.contains("10.0.0.5"));
        assert!(summary.contains("SOURCE: old-sw-09 (ID: 42, Location: DC-East)"));
    }

    #[test]
    fn test_summary_joins_multiple_conflicts() {
        let report = IpConflictReport {
            ip_address: "10.0.0.5".to_string(),
            device_name: "core-sw-01".to_string(),
            conflicts: vec![
                IpConflict {
                    side: ConflictSide::Source,
                    device_name: "old-sw-09".to_string(),
                    device_id: "42".to_string(),
                    ip_address: "10.0.0.5".to_string(),
                    location: "DC-East".to_string(),
                },
                IpConflict {
                    side: ConflictSide::Monitor,
                    device_name: "legacy-host".to_string(),
                    device_id: "1007".to_string(),
                    ip_address: "10.0.0.5".to_string(),
                    location: "Unknown".to_string(),
                },
            ],
        };

        let summary = report.summary();
        assert!(summary.contains("SOURCE: old-sw-09"));
        assert!(summary.contains("; MONITOR: legacy-host"));
    }

    #[test]
    fn test_empty_report() {
        let report = IpConflictReport {
            ip_address: "10.0.0.5".to_string(),
            device_name: "core-sw-01".to_string(),
            conflicts: vec![],
        };
        assert!(report.is_empty());
    }
}
