//! One-way bulk export of the source inventory into a monitoring
//! system, tracked per device in export records.
//!
//! Export is independent from event-driven sync: it pushes every
//! eligible device on demand, for connections that opted in.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::{Connection, ExportRecord, ExportStats, ExportStatus, SyncLogStatus, SyncType};
use domain::services::SourceInventory;
use monitor::MonitorClient;
use persistence::entities::ExportRecordEntity;
use persistence::metrics::record_sync_outcome;
use persistence::repositories::sync_log::SyncCounts;
use persistence::repositories::{ConnectionRepository, ExportRecordRepository, SyncLogRepository};

use crate::config::SyncConfig;
use crate::services::monitor_config;
use crate::services::sync_engine::{eligible_ip, SyncEngineError};

/// Totals for one export run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExportRunSummary {
    pub total: u32,
    pub added: i64,
    pub failed: i64,
    pub scans_triggered: u32,
}

/// Bulk export of eligible source devices into one connection.
#[derive(Clone)]
pub struct ExportService {
    pool: PgPool,
    defaults: SyncConfig,
}

impl ExportService {
    pub fn new(pool: PgPool, defaults: SyncConfig) -> Self {
        Self { pool, defaults }
    }

    /// Export every eligible device to the given connection in one
    /// bulk request.
    ///
    /// The monitor's bulk endpoint reports aggregate counts, so record
    /// statuses advance together: all exported (and scan-triggered
    /// when the bulk response carries scan IDs) on success, all error
    /// on failure.
    pub async fn export_connection(
        &self,
        connection_id: Uuid,
        inventory: &dyn SourceInventory,
    ) -> Result<ExportRunSummary, SyncEngineError> {
        let connection_repo = ConnectionRepository::new(self.pool.clone());
        let export_repo = ExportRecordRepository::new(self.pool.clone());
        let log_repo = SyncLogRepository::new(self.pool.clone());

        let connection = connection_repo
            .find_by_id(connection_id)
            .await?
            .map(Connection::from)
            .ok_or(SyncEngineError::ConnectionNotFound(connection_id))?;

        let mut records: Vec<ExportRecordEntity> = Vec::new();
        let mut ips: Vec<String> = Vec::new();
        for device in inventory.list_devices().await {
            let ip = match eligible_ip(&device) {
                Some(ip) => ip,
                None => continue,
            };
            records.push(export_repo.upsert(connection.id, device.id, &ip).await?);
            ips.push(ip);
        }

        if ips.is_empty() {
            info!(connection = %connection.name, "export: no eligible devices");
            return Ok(ExportRunSummary::default());
        }

        let mut client = MonitorClient::new(monitor_config(&connection, &self.defaults))?;
        let mut summary = ExportRunSummary {
            total: ips.len() as u32,
            ..Default::default()
        };

        match client.bulk_add_ips(&ips, None).await {
            Ok(result) if result.success => {
                summary.added = result.added_count;
                summary.failed = result.failed_count;
                summary.scans_triggered = result.scan_ids.len() as u32;

                let status = if result.scan_ids.is_empty() {
                    ExportStatus::Exported
                } else {
                    ExportStatus::ScanTriggered
                };
                for record in &records {
                    export_repo.set_status(record.id, status, None).await?;
                }
            }
            Ok(result) => {
                summary.failed = ips.len() as i64;
                for record in &records {
                    export_repo
                        .set_status(record.id, ExportStatus::Error, Some(&result.message))
                        .await?;
                }
            }
            Err(e) => {
                warn!(connection = %connection.name, error = %e, "bulk export request failed");
                summary.failed = ips.len() as i64;
                for record in &records {
                    export_repo
                        .set_status(record.id, ExportStatus::Error, Some(&e.to_string()))
                        .await?;
                }
            }
        }

        connection_repo.mark_export(connection.id, Utc::now()).await?;

        let status = if summary.failed == 0 {
            SyncLogStatus::Completed
        } else if summary.added > 0 {
            SyncLogStatus::Warning
        } else {
            SyncLogStatus::Failed
        };
        let text = format!(
            "export: {} devices, {} added, {} failed, {} scans triggered",
            summary.total, summary.added, summary.failed, summary.scans_triggered
        );
        log_repo
            .record(
                connection.id,
                SyncType::Push,
                status,
                SyncCounts {
                    discovered: summary.total as i32,
                    created: summary.added as i32,
                    errors: summary.failed as i32,
                    ..Default::default()
                },
                Some(&text),
            )
            .await?;
        record_sync_outcome("export", &status.to_string());
        info!(connection = %connection.name, %text, "export finished");

        Ok(summary)
    }

    /// Export-record totals plus the most recently touched records.
    pub async fn status(
        &self,
        connection_id: Uuid,
        limit: i64,
    ) -> Result<(ExportStats, Vec<ExportRecord>), SyncEngineError> {
        let repo = ExportRecordRepository::new(self.pool.clone());
        let stats = repo.stats(connection_id).await?;
        let recent = repo
            .list_recent(connection_id, limit)
            .await?
            .into_iter()
            .map(ExportRecord::from)
            .collect();
        Ok((stats, recent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serialization() {
        let summary = ExportRunSummary {
            total: 5,
            added: 4,
            failed: 1,
            scans_triggered: 2,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"total\":5"));
        assert!(json.contains("\"scans_triggered\":2"));
    }
}
