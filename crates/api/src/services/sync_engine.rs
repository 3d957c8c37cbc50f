//! Event-driven reconciliation between the source inventory and the
//! monitoring systems behind each stored connection.
//!
//! One device event fans out to every active connection. Failures are
//! isolated per connection and per device: one broken monitor never
//! stops the rest of a run, and every outcome leaves a sync-log entry.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use domain::models::{
    Connection, IpConflictReport, SourceDevice, SyncLog, SyncLogResponse, SyncLogStatus,
    SyncStatus, SyncType,
};
use domain::services::SourceInventory;
use monitor::{DeviceMetadata, MonitorClient, MonitorDevice, MonitorError};
use persistence::entities::SyncedDeviceEntity;
use persistence::metrics::record_sync_outcome;
use persistence::repositories::sync_log::SyncCounts;
use persistence::repositories::{
    ConnectionRepository, ExportRecordRepository, SyncLogRepository, SyncedDeviceRepository,
};

use crate::config::SyncConfig;
use crate::services::{conflict, monitor_config};

/// Errors surfaced by the sync engine.
#[derive(Debug, Error)]
pub enum SyncEngineError {
    #[error("connection {0} not found")]
    ConnectionNotFound(Uuid),

    #[error("synced device {0} not found")]
    DeviceNotFound(Uuid),

    #[error("{0}")]
    NotEligible(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// What happened to one device on one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Updated,
    Removed,
    Skipped,
    Failed,
}

/// Per-connection result of processing one device event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectionSyncOutcome {
    pub connection_id: Uuid,
    pub connection_name: String,
    pub action: SyncAction,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<IpConflictReport>,
}

impl ConnectionSyncOutcome {
    fn new(connection: &Connection, action: SyncAction, message: impl Into<String>) -> Self {
        Self {
            connection_id: connection.id,
            connection_name: connection.name.clone(),
            action,
            message: message.into(),
            conflict: None,
        }
    }
}

/// Monitor-side device payload for one source device. Fields the
/// inventory does not track get the monitor's conventional defaults.
fn device_payload(device: &SourceDevice) -> Value {
    let mut payload = json!({
        "device_name": device.name,
        "description": format!(
            "Synced from inventory - {}",
            device.device_type.as_deref().unwrap_or("Unknown")
        ),
        "location": device.site.as_deref().unwrap_or("Unknown"),
        "contact": device.comments.as_deref().unwrap_or(""),
        "snmp_community": "public",
        "snmp_version": "2c",
        "monitoring_enabled": true,
    });
    if let Some(role) = &device.role {
        payload["role"] = json!(role);
    }
    if let Some(platform) = &device.platform {
        payload["platform"] = json!(platform);
    }
    payload
}

/// Discovery baseline for a manual run: the device list the monitor
/// itself reports.
fn pull_baseline(remote: &[MonitorDevice]) -> SyncCounts {
    SyncCounts {
        discovered: remote.len() as i32,
        ..Default::default()
    }
}

/// Push action for a mapping state: a known pair is an update, an
/// unknown one a create. A mapping only exists once a previous push
/// succeeded.
fn action_for(record: Option<&SyncedDeviceEntity>) -> SyncAction {
    if record.is_some() {
        SyncAction::Updated
    } else {
        SyncAction::Created
    }
}

/// Monitor-side metadata derived from a source device.
fn metadata_for(device: &SourceDevice) -> DeviceMetadata {
    DeviceMetadata {
        name: Some(device.name.clone()),
        site: device.site.clone(),
        role: device.role.clone(),
        device_type: device.device_type.clone(),
        platform: device.platform.clone(),
        serial: device.serial.clone(),
        asset_tag: device.asset_tag.clone(),
        description: device.comments.clone(),
    }
}

/// IP a device is eligible to sync with, if any.
///
/// Eligible means active lifecycle state and a primary IPv4 address;
/// the active-connection requirement is checked per run.
pub fn eligible_ip(device: &SourceDevice) -> Option<String> {
    if !device.is_active() {
        return None;
    }
    device.primary_ip()
}

/// Reconciliation engine. One instance per application; repositories
/// and API clients are constructed per operation.
#[derive(Clone)]
pub struct SyncEngine {
    pool: PgPool,
    defaults: SyncConfig,
}

impl SyncEngine {
    pub fn new(pool: PgPool, defaults: SyncConfig) -> Self {
        Self { pool, defaults }
    }

    /// React to a device being created or updated in the source
    /// inventory. Fans out to every active connection; per-connection
    /// failures are reported in the outcome list, never propagated.
    pub async fn handle_device_saved(
        &self,
        device: &SourceDevice,
        inventory: &dyn SourceInventory,
    ) -> Result<Vec<ConnectionSyncOutcome>, SyncEngineError> {
        let ip = match eligible_ip(device) {
            Some(ip) => ip,
            None => {
                debug!(
                    device = %device.name,
                    status = %device.status,
                    "device not eligible for sync"
                );
                return Ok(Vec::new());
            }
        };

        let connections = ConnectionRepository::new(self.pool.clone()).list_active().await?;
        if connections.is_empty() {
            debug!(device = %device.name, "no active connections, nothing to sync");
            return Ok(Vec::new());
        }

        let mut outcomes = Vec::with_capacity(connections.len());
        for entity in connections {
            let connection: Connection = entity.into();
            match self.sync_device(&connection, device, &ip, inventory).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!(
                        connection = %connection.name,
                        device = %device.name,
                        error = %e,
                        "device sync failed"
                    );
                    outcomes.push(ConnectionSyncOutcome::new(
                        &connection,
                        SyncAction::Failed,
                        e.to_string(),
                    ));
                }
            }
        }
        Ok(outcomes)
    }

    /// React to a device being deleted from the source inventory.
    /// The monitor-side device is removed first; the local mapping is
    /// deleted only when that removal succeeds.
    pub async fn handle_device_deleted(
        &self,
        source_device_id: Uuid,
        device_name: &str,
    ) -> Result<Vec<ConnectionSyncOutcome>, SyncEngineError> {
        let synced_repo = SyncedDeviceRepository::new(self.pool.clone());
        let connection_repo = ConnectionRepository::new(self.pool.clone());

        let records = synced_repo.find_by_source_device(source_device_id).await?;
        let mut outcomes = Vec::with_capacity(records.len());

        for record in records {
            let connection = match connection_repo.find_by_id(record.connection_id).await? {
                Some(entity) => Connection::from(entity),
                None => continue,
            };

            match self.remove_device(&connection, &record, device_name).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!(
                        connection = %connection.name,
                        device = %device_name,
                        error = %e,
                        "device removal failed"
                    );
                    outcomes.push(ConnectionSyncOutcome::new(
                        &connection,
                        SyncAction::Failed,
                        e.to_string(),
                    ));
                }
            }
        }
        Ok(outcomes)
    }

    /// Operator-triggered full reconciliation of one connection against
    /// the entire source inventory.
    pub async fn run_manual_sync(
        &self,
        connection_id: Uuid,
        inventory: &dyn SourceInventory,
    ) -> Result<SyncLogResponse, SyncEngineError> {
        let connection = ConnectionRepository::new(self.pool.clone())
            .find_by_id(connection_id)
            .await?
            .map(Connection::from)
            .ok_or(SyncEngineError::ConnectionNotFound(connection_id))?;

        let log_repo = SyncLogRepository::new(self.pool.clone());
        let log = log_repo.start(connection.id, SyncType::Manual).await?;

        // An unreachable monitor aborts the whole pass; per-device
        // failures below do not.
        let mut probe = MonitorClient::new(monitor_config(&connection, &self.defaults))?;
        let test = probe.test_connection().await;
        if !test.success {
            warn!(connection = %connection.name, message = %test.message, "manual sync aborted");
            record_sync_outcome("manual", "failed");
            let finished = log_repo
                .complete(
                    log.id,
                    SyncLogStatus::Failed,
                    SyncCounts::default(),
                    Some(&format!("connection test failed: {}", test.message)),
                )
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            return Ok(SyncLogResponse::from(SyncLog::from(finished)));
        }

        // Pull pass: the monitor's full device list is the discovery
        // baseline for the run. A fetch failure aborts like a failed
        // connection test does.
        let remote = match probe.get_devices(false).await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(connection = %connection.name, error = %e, "manual sync aborted");
                record_sync_outcome("manual", "failed");
                let finished = log_repo
                    .complete(
                        log.id,
                        SyncLogStatus::Failed,
                        SyncCounts::default(),
                        Some(&format!("device list fetch failed: {e}")),
                    )
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                return Ok(SyncLogResponse::from(SyncLog::from(finished)));
            }
        };
        log_repo
            .record(
                connection.id,
                SyncType::Pull,
                SyncLogStatus::Completed,
                pull_baseline(&remote),
                Some(&format!("monitor reports {} devices", remote.len())),
            )
            .await?;
        record_sync_outcome("pull", "completed");

        let devices = inventory.list_devices().await;
        let mut counts = pull_baseline(&remote);

        for device in &devices {
            let ip = match eligible_ip(device) {
                Some(ip) => ip,
                None => continue,
            };

            match self.sync_device(&connection, device, &ip, inventory).await {
                Ok(outcome) => match outcome.action {
                    SyncAction::Created => counts.created += 1,
                    SyncAction::Updated => counts.updated += 1,
                    SyncAction::Failed => counts.errors += 1,
                    _ => {}
                },
                Err(e) => {
                    warn!(device = %device.name, error = %e, "manual sync: device failed");
                    counts.errors += 1;
                }
            }
        }

        let status = if counts.errors == 0 {
            SyncLogStatus::Completed
        } else if counts.created + counts.updated > 0 {
            SyncLogStatus::Warning
        } else {
            SyncLogStatus::Failed
        };
        let summary = format!(
            "manual sync: {} discovered, {} created, {} updated, {} errors",
            counts.discovered, counts.created, counts.updated, counts.errors
        );

        info!(connection = %connection.name, %summary, "manual sync finished");
        record_sync_outcome("manual", &status.to_string());

        let finished = log_repo
            .complete(log.id, status, counts, Some(&summary))
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(SyncLogResponse::from(SyncLog::from(finished)))
    }

    /// Operator-triggered sync of a single existing mapping, outside
    /// any inventory event.
    pub async fn force_sync(
        &self,
        synced_device_id: Uuid,
        inventory: &dyn SourceInventory,
    ) -> Result<ConnectionSyncOutcome, SyncEngineError> {
        let record = SyncedDeviceRepository::new(self.pool.clone())
            .find_by_id(synced_device_id)
            .await?
            .ok_or(SyncEngineError::DeviceNotFound(synced_device_id))?;
        let connection = ConnectionRepository::new(self.pool.clone())
            .find_by_id(record.connection_id)
            .await?
            .map(Connection::from)
            .ok_or(SyncEngineError::ConnectionNotFound(record.connection_id))?;
        let device = inventory
            .get_device(record.source_device_id)
            .await
            .ok_or_else(|| {
                SyncEngineError::NotEligible(format!(
                    "source device {} is not known to the inventory",
                    record.source_device_id
                ))
            })?;
        let ip = eligible_ip(&device).ok_or_else(|| {
            SyncEngineError::NotEligible(format!(
                "device {} has no active primary IP address",
                device.name
            ))
        })?;

        self.sync_device(&connection, &device, &ip, inventory).await
    }

    /// Create or update one device on one connection.
    ///
    /// Create vs update is decided by whether a mapping already exists
    /// for this (connection, source device) pair. Either way the device
    /// is pushed through the monitor's add-by-IP endpoint, which
    /// upserts on its side.
    async fn sync_device(
        &self,
        connection: &Connection,
        device: &SourceDevice,
        ip: &str,
        inventory: &dyn SourceInventory,
    ) -> Result<ConnectionSyncOutcome, SyncEngineError> {
        let synced_repo = SyncedDeviceRepository::new(self.pool.clone());

        let existing = synced_repo.find_by_pair(connection.id, device.id).await?;
        if let Some(record) = &existing {
            if !record.sync_enabled {
                debug!(device = %device.name, connection = %connection.name, "sync disabled, skipping");
                return Ok(ConnectionSyncOutcome::new(
                    connection,
                    SyncAction::Skipped,
                    "sync disabled for this device",
                ));
            }
            synced_repo.mark_attempt(record.id, Utc::now()).await?;
        }

        let mut client = MonitorClient::new(monitor_config(connection, &self.defaults))?;
        self.push_device(connection, device, existing.as_ref(), ip, inventory, &mut client)
            .await
    }

    /// Push one device to the monitoring system and record the result.
    ///
    /// The local mapping is written only after the monitor has accepted
    /// the device; a failed first push leaves no mapping behind, only a
    /// sync-log entry.
    async fn push_device(
        &self,
        connection: &Connection,
        device: &SourceDevice,
        record: Option<&SyncedDeviceEntity>,
        ip: &str,
        inventory: &dyn SourceInventory,
        client: &mut MonitorClient,
    ) -> Result<ConnectionSyncOutcome, SyncEngineError> {
        let synced_repo = SyncedDeviceRepository::new(self.pool.clone());
        let log_repo = SyncLogRepository::new(self.pool.clone());
        let action = action_for(record);

        match client.add_device_by_ip(ip, Some(device_payload(device))).await {
            Ok(result) if result.success => {
                let row = synced_repo
                    .upsert(connection.id, device.id, &device.name, ip)
                    .await?;
                let monitor_id = result
                    .device_id
                    .clone()
                    .or_else(|| record.and_then(|r| r.monitor_device_id.clone()));
                synced_repo
                    .mark_success(row.id, monitor_id.as_deref(), Utc::now())
                    .await?;

                // Fields add-by-IP does not cover are pushed separately
                // once the monitor-side ID is known; best effort.
                if let Some(id) = monitor_id.as_deref() {
                    if let Err(e) = client.update_device_metadata(id, &metadata_for(device)).await {
                        warn!(device = %device.name, error = %e, "metadata push failed");
                    }
                }

                // Conflicts are only checked once the discovery scan
                // went through; without the scan the monitor list is
                // too stale to judge.
                let mut conflict = None;
                match client.scan_ip_address(ip, None).await {
                    Ok(_) => {
                        conflict = self
                            .check_conflicts(
                                connection,
                                device,
                                ip,
                                monitor_id.as_deref(),
                                inventory,
                                client,
                            )
                            .await;
                    }
                    Err(e) => {
                        warn!(
                            device = %device.name,
                            ip = %ip,
                            error = %e,
                            "discovery scan failed, conflict check skipped"
                        );
                    }
                }

                let (verb, counts) = match action {
                    SyncAction::Created => (
                        "created",
                        SyncCounts {
                            discovered: 1,
                            created: 1,
                            ..Default::default()
                        },
                    ),
                    _ => (
                        "updated",
                        SyncCounts {
                            discovered: 1,
                            updated: 1,
                            ..Default::default()
                        },
                    ),
                };
                log_repo
                    .record(
                        connection.id,
                        SyncType::Push,
                        SyncLogStatus::Completed,
                        counts,
                        Some(&format!("{verb} device {} at {}", device.name, ip)),
                    )
                    .await?;
                record_sync_outcome("push", "completed");
                info!(device = %device.name, connection = %connection.name, ip = %ip, "device {verb}");

                let mut outcome = ConnectionSyncOutcome::new(
                    connection,
                    action,
                    format!("device {} {verb} at {}", device.name, ip),
                );
                outcome.conflict = conflict;
                Ok(outcome)
            }
            Ok(result) => {
                // The monitor answered but rejected the device.
                self.record_device_error(
                    connection,
                    record.map(|r| r.id),
                    SyncStatus::Failed,
                    &result.message,
                )
                .await?;
                Ok(ConnectionSyncOutcome::new(
                    connection,
                    SyncAction::Failed,
                    result.message,
                ))
            }
            Err(e) => {
                self.record_device_error(
                    connection,
                    record.map(|r| r.id),
                    SyncStatus::Error,
                    &e.to_string(),
                )
                .await?;
                Ok(ConnectionSyncOutcome::new(
                    connection,
                    SyncAction::Failed,
                    e.to_string(),
                ))
            }
        }
    }

    async fn remove_device(
        &self,
        connection: &Connection,
        record: &SyncedDeviceEntity,
        device_name: &str,
    ) -> Result<ConnectionSyncOutcome, SyncEngineError> {
        let synced_repo = SyncedDeviceRepository::new(self.pool.clone());
        let export_repo = ExportRecordRepository::new(self.pool.clone());
        let log_repo = SyncLogRepository::new(self.pool.clone());

        if let Some(monitor_id) = &record.monitor_device_id {
            let mut client = MonitorClient::new(monitor_config(connection, &self.defaults))?;
            if let Err(e) = client.delete_device(monitor_id).await {
                synced_repo
                    .mark_failure(record.id, SyncStatus::Error, &e.to_string(), Utc::now())
                    .await?;
                log_repo
                    .record(
                        connection.id,
                        SyncType::Push,
                        SyncLogStatus::Error,
                        SyncCounts {
                            discovered: 1,
                            errors: 1,
                            ..Default::default()
                        },
                        Some(&format!("failed to remove device {device_name}: {e}")),
                    )
                    .await?;
                record_sync_outcome("push", "error");
                return Ok(ConnectionSyncOutcome::new(
                    connection,
                    SyncAction::Failed,
                    e.to_string(),
                ));
            }
        }

        synced_repo
            .delete_by_pair(connection.id, record.source_device_id)
            .await?;
        export_repo
            .delete_by_pair(connection.id, record.source_device_id)
            .await?;
        log_repo
            .record(
                connection.id,
                SyncType::Push,
                SyncLogStatus::Completed,
                SyncCounts {
                    discovered: 1,
                    ..Default::default()
                },
                Some(&format!("removed device {device_name}")),
            )
            .await?;
        record_sync_outcome("push", "completed");
        info!(device = %device_name, connection = %connection.name, "device removed");

        Ok(ConnectionSyncOutcome::new(
            connection,
            SyncAction::Removed,
            format!("device {device_name} removed"),
        ))
    }

    async fn check_conflicts(
        &self,
        connection: &Connection,
        device: &SourceDevice,
        ip: &str,
        own_monitor_id: Option<&str>,
        inventory: &dyn SourceInventory,
        client: &mut MonitorClient,
    ) -> Option<IpConflictReport> {
        let report =
            conflict::check_ip_conflict(inventory, client, device, ip, own_monitor_id).await;
        if report.is_empty() {
            return None;
        }

        let summary = report.summary();
        warn!(device = %device.name, ip = %ip, %summary, "IP conflict detected");
        let log_repo = SyncLogRepository::new(self.pool.clone());
        if let Err(e) = log_repo
            .record(
                connection.id,
                SyncType::IpConflictCheck,
                SyncLogStatus::Warning,
                SyncCounts {
                    discovered: 1,
                    ..Default::default()
                },
                Some(&summary),
            )
            .await
        {
            warn!(error = %e, "failed to record conflict log entry");
        }
        record_sync_outcome("ip_conflict_check", "warning");
        Some(report)
    }

    /// Record a failed push. The mapping row is only touched when one
    /// exists; a device the monitor never accepted has none.
    async fn record_device_error(
        &self,
        connection: &Connection,
        record_id: Option<Uuid>,
        status: SyncStatus,
        message: &str,
    ) -> Result<(), SyncEngineError> {
        let log_repo = SyncLogRepository::new(self.pool.clone());

        if let Some(id) = record_id {
            SyncedDeviceRepository::new(self.pool.clone())
                .mark_failure(id, status, message, Utc::now())
                .await?;
        }
        let log_status = match status {
            SyncStatus::Failed => SyncLogStatus::Failed,
            _ => SyncLogStatus::Error,
        };
        log_repo
            .record(
                connection.id,
                SyncType::Push,
                log_status,
                SyncCounts {
                    discovered: 1,
                    errors: 1,
                    ..Default::default()
                },
                Some(message),
            )
            .await?;
        record_sync_outcome("push", &log_status.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::SourceDeviceStatus;

    fn device(status: SourceDeviceStatus, ip: Option<&str>) -> SourceDevice {
        SourceDevice {
            id: Uuid::new_v4(),
            name: "core-sw-01".to_string(),
            status,
            primary_ip4: ip.map(String::from),
            site: Some("DC-East".to_string()),
            role: Some("core-switch".to_string()),
            platform: None,
            device_type: None,
            serial: Some("FDO1234".to_string()),
            asset_tag: None,
            comments: Some("rack 12".to_string()),
        }
    }

    #[test]
    fn test_eligible_ip_active_with_address() {
        let d = device(SourceDeviceStatus::Active, Some("10.1.1.10/24"));
        assert_eq!(eligible_ip(&d), Some("10.1.1.10".to_string()));
    }

    #[test]
    fn test_eligible_ip_inactive_status() {
        let d = device(SourceDeviceStatus::Planned, Some("10.1.1.10/24"));
        assert_eq!(eligible_ip(&d), None);
    }

    #[test]
    fn test_eligible_ip_missing_address() {
        let d = device(SourceDeviceStatus::Active, None);
        assert_eq!(eligible_ip(&d), None);
    }

    fn entity_for(d: &SourceDevice, monitor_id: Option<&str>) -> SyncedDeviceEntity {
        SyncedDeviceEntity {
            id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            source_device_id: d.id,
            monitor_device_id: monitor_id.map(String::from),
            device_name: d.name.clone(),
            ip_address: "10.1.1.10".to_string(),
            sync_status: SyncStatus::Success,
            sync_enabled: true,
            last_sync: None,
            last_sync_attempt: None,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pull_baseline_counts_remote_devices() {
        let remote = vec![
            MonitorDevice::from_raw(serde_json::json!({"id": "1", "displayName": "core-sw-01"})),
            MonitorDevice::from_raw(serde_json::json!({"id": "2", "displayName": "edge-rtr-01"})),
        ];
        let counts = pull_baseline(&remote);
        assert_eq!(counts.discovered, 2);
        assert_eq!(counts.created, 0);
        assert_eq!(counts.errors, 0);

        assert_eq!(pull_baseline(&[]).discovered, 0);
    }

    #[test]
    fn test_action_for_unknown_pair_is_create() {
        assert_eq!(action_for(None), SyncAction::Created);
    }

    #[test]
    fn test_action_for_known_pair_is_update() {
        let d = device(SourceDeviceStatus::Active, Some("10.1.1.10/24"));
        let record = entity_for(&d, Some("1007"));
        assert_eq!(action_for(Some(&record)), SyncAction::Updated);
    }

    #[test]
    fn test_device_payload_fills_monitor_defaults() {
        let mut d = device(SourceDeviceStatus::Active, Some("10.1.1.10/24"));
        d.site = None;
        d.role = None;
        d.device_type = None;
        d.comments = None;

        let payload = device_payload(&d);
        assert_eq!(payload["device_name"], "core-sw-01");
        assert_eq!(payload["description"], "Synced from inventory - Unknown");
        assert_eq!(payload["location"], "Unknown");
        assert_eq!(payload["contact"], "");
        assert_eq!(payload["snmp_community"], "public");
        assert_eq!(payload["snmp_version"], "2c");
        assert_eq!(payload["monitoring_enabled"], true);
        assert!(payload.get("role").is_none());
        assert!(payload.get("platform").is_none());
    }

    #[test]
    fn test_device_payload_carries_inventory_fields() {
        let mut d = device(SourceDeviceStatus::Active, Some("10.1.1.10/24"));
        d.device_type = Some("C9300-48P".to_string());
        d.platform = Some("ios-xe".to_string());

        let payload = device_payload(&d);
        assert_eq!(payload["description"], "Synced from inventory - C9300-48P");
        assert_eq!(payload["location"], "DC-East");
        assert_eq!(payload["contact"], "rack 12");
        assert_eq!(payload["role"], "core-switch");
        assert_eq!(payload["platform"], "ios-xe");
    }

    #[test]
    fn test_metadata_for_maps_fields() {
        let d = device(SourceDeviceStatus::Active, Some("10.1.1.10/24"));
        let metadata = metadata_for(&d);
        assert_eq!(metadata.name.as_deref(), Some("core-sw-01"));
        assert_eq!(metadata.site.as_deref(), Some("DC-East"));
        assert_eq!(metadata.serial.as_deref(), Some("FDO1234"));
        assert_eq!(metadata.description.as_deref(), Some("rack 12"));
        assert!(metadata.platform.is_none());
    }

    #[test]
    fn test_outcome_serialization_omits_absent_conflict() {
        let outcome = ConnectionSyncOutcome {
            connection_id: Uuid::new_v4(),
            connection_name: "Primary Monitor".to_string(),
            action: SyncAction::Created,
            message: "device created".to_string(),
            conflict: None,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"action\":\"created\""));
        assert!(!json.contains("conflict"));
    }
}
