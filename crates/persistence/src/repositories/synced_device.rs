//! Synced-device repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{SyncStatus, SyncedDeviceStats};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SyncedDeviceEntity;
use crate::metrics::QueryTimer;

const DEVICE_COLUMNS: &str = "id, connection_id, source_device_id, monitor_device_id, \
                              device_name, ip_address, sync_status, sync_enabled, last_sync, \
                              last_sync_attempt, error_message, created_at, updated_at";

/// Repository for synced-device mappings.
///
/// At most one row exists per (connection, source device) pair; the
/// upsert path enforces this.
#[derive(Clone)]
pub struct SyncedDeviceRepository {
    pool: PgPool,
}

impl SyncedDeviceRepository {
    /// Creates a new SyncedDeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh the mapping for a (connection, source device)
    /// pair. Name and IP are refreshed on conflict; sync state is not
    /// touched.
    pub async fn upsert(
        &self,
        connection_id: Uuid,
        source_device_id: Uuid,
        device_name: &str,
        ip_address: &str,
    ) -> Result<SyncedDeviceEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_synced_device");
        let result = sqlx::query_as::<_, SyncedDeviceEntity>(&format!(
            r#"
            INSERT INTO synced_devices (connection_id, source_device_id, device_name, ip_address)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (connection_id, source_device_id) DO UPDATE SET
                device_name = EXCLUDED.device_name,
                ip_address = EXCLUDED.ip_address,
                updated_at = NOW()
            RETURNING {DEVICE_COLUMNS}
            "#,
        ))
        .bind(connection_id)
        .bind(source_device_id)
        .bind(device_name)
        .bind(ip_address)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the mapping for a (connection, source device) pair.
    pub async fn find_by_pair(
        &self,
        connection_id: Uuid,
        source_device_id: Uuid,
    ) -> Result<Option<SyncedDeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_synced_device_by_pair");
        let result = sqlx::query_as::<_, SyncedDeviceEntity>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM synced_devices
            WHERE connection_id = $1 AND source_device_id = $2
            "#,
        ))
        .bind(connection_id)
        .bind(source_device_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SyncedDeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_synced_device_by_id");
        let result = sqlx::query_as::<_, SyncedDeviceEntity>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM synced_devices
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All mappings for one source device across connections.
    pub async fn find_by_source_device(
        &self,
        source_device_id: Uuid,
    ) -> Result<Vec<SyncedDeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_synced_devices_by_source");
        let result = sqlx::query_as::<_, SyncedDeviceEntity>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM synced_devices
            WHERE source_device_id = $1
            ORDER BY created_at ASC
            "#,
        ))
        .bind(source_device_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All mappings for one connection, sorted by device name.
    pub async fn list_by_connection(
        &self,
        connection_id: Uuid,
    ) -> Result<Vec<SyncedDeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_synced_devices");
        let result = sqlx::query_as::<_, SyncedDeviceEntity>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM synced_devices
            WHERE connection_id = $1
            ORDER BY device_name ASC
            "#,
        ))
        .bind(connection_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Stamp a sync attempt before talking to the monitoring system.
    pub async fn mark_attempt(
        &self,
        id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_sync_attempt");
        sqlx::query(
            r#"
            UPDATE synced_devices
            SET last_sync_attempt = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Record a successful sync, clearing any previous error.
    pub async fn mark_success(
        &self,
        id: Uuid,
        monitor_device_id: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_sync_success");
        sqlx::query(
            r#"
            UPDATE synced_devices
            SET sync_status = 'success',
                monitor_device_id = COALESCE($2, monitor_device_id),
                last_sync = $3,
                last_sync_attempt = $3,
                error_message = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(monitor_device_id)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Record a failed or errored sync with its message.
    pub async fn mark_failure(
        &self,
        id: Uuid,
        status: SyncStatus,
        error_message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_sync_failure");
        sqlx::query(
            r#"
            UPDATE synced_devices
            SET sync_status = $2,
                error_message = $3,
                last_sync_attempt = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(error_message)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Operator toggle to pause or resume sync for one device.
    /// Returns the number of rows affected (0 if not found).
    pub async fn set_sync_enabled(&self, id: Uuid, enabled: bool) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_sync_enabled");
        let result = sqlx::query(
            r#"
            UPDATE synced_devices
            SET sync_enabled = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(enabled)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Delete the mapping for a (connection, source device) pair.
    /// Returns the number of rows deleted.
    pub async fn delete_by_pair(
        &self,
        connection_id: Uuid,
        source_device_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_synced_device_by_pair");
        let result = sqlx::query(
            r#"
            DELETE FROM synced_devices
            WHERE connection_id = $1 AND source_device_id = $2
            "#,
        )
        .bind(connection_id)
        .bind(source_device_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Per-status counts for one connection.
    pub async fn stats(&self, connection_id: Uuid) -> Result<SyncedDeviceStats, sqlx::Error> {
        let timer = QueryTimer::new("synced_device_stats");
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE sync_status = 'success'),
                   COUNT(*) FILTER (WHERE sync_status = 'pending'),
                   COUNT(*) FILTER (WHERE sync_status = 'failed'),
                   COUNT(*) FILTER (WHERE sync_status = 'error')
            FROM synced_devices
            WHERE connection_id = $1
            "#,
        )
        .bind(connection_id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        Ok(SyncedDeviceStats {
            total: row.0,
            synced: row.1,
            pending: row.2,
            failed: row.3,
            errors: row.4,
        })
    }
}
