//! Export-record repository for database operations.

use domain::models::{ExportStats, ExportStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ExportRecordEntity;
use crate::metrics::QueryTimer;

const EXPORT_COLUMNS: &str = "id, connection_id, source_device_id, ip_address, export_status, \
                              error_message, created_at, updated_at";

/// Repository for source-to-monitor export tracking.
#[derive(Clone)]
pub struct ExportRecordRepository {
    pool: PgPool,
}

impl ExportRecordRepository {
    /// Creates a new ExportRecordRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh the export record for a (connection, source
    /// device) pair. A re-export resets the record to pending.
    pub async fn upsert(
        &self,
        connection_id: Uuid,
        source_device_id: Uuid,
        ip_address: &str,
    ) -> Result<ExportRecordEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_export_record");
        let result = sqlx::query_as::<_, ExportRecordEntity>(&format!(
            r#"
            INSERT INTO export_records (connection_id, source_device_id, ip_address)
            VALUES ($1, $2, $3)
            ON CONFLICT (connection_id, source_device_id) DO UPDATE SET
                ip_address = EXCLUDED.ip_address,
                export_status = 'pending',
                error_message = NULL,
                updated_at = NOW()
            RETURNING {EXPORT_COLUMNS}
            "#,
        ))
        .bind(connection_id)
        .bind(source_device_id)
        .bind(ip_address)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Advance the record through its lifecycle.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: ExportStatus,
        error_message: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("set_export_status");
        sqlx::query(
            r#"
            UPDATE export_records
            SET export_status = $2, error_message = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(error_message)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    pub async fn find_by_pair(
        &self,
        connection_id: Uuid,
        source_device_id: Uuid,
    ) -> Result<Option<ExportRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_export_record_by_pair");
        let result = sqlx::query_as::<_, ExportRecordEntity>(&format!(
            r#"
            SELECT {EXPORT_COLUMNS}
            FROM export_records
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

    /// Records still waiting to be pushed for one connection.
    pub async fn list_pending(
        &self,
        connection_id: Uuid,
    ) -> Result<Vec<ExportRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_export_records");
        let result = sqlx::query_as::<_, ExportRecordEntity>(&format!(
            r#"
            SELECT {EXPORT_COLUMNS}
            FROM export_records
            WHERE connection_id = $1 AND export_status = 'pending'
            ORDER BY created_at ASC
            "#,
        ))
        .bind(connection_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recently touched export records for one connection.
    pub async fn list_recent(
        &self,
        connection_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ExportRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_recent_export_records");
        let result = sqlx::query_as::<_, ExportRecordEntity>(&format!(
            r#"
            SELECT {EXPORT_COLUMNS}
            FROM export_records
            WHERE connection_id = $1
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        ))
        .bind(connection_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete the export record for a (connection, source device) pair.
    /// Returns the number of rows deleted.
    pub async fn delete_by_pair(
        &self,
        connection_id: Uuid,
        source_device_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_export_record_by_pair");
        let result = sqlx::query(
            r#"
            DELETE FROM export_records
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
    pub async fn stats(&self, connection_id: Uuid) -> Result<ExportStats, sqlx::Error> {
        let timer = QueryTimer::new("export_record_stats");
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE export_status = 'pending'),
                   COUNT(*) FILTER (WHERE export_status = 'exported'),
                   COUNT(*) FILTER (WHERE export_status = 'scan_triggered'),
                   COUNT(*) FILTER (WHERE export_status = 'scan_completed'),
                   COUNT(*) FILTER (WHERE export_status = 'error')
            FROM export_records
            WHERE connection_id = $1
            "#,
        )
        .bind(connection_id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        Ok(ExportStats {
            total: row.0,
            pending: row.1,
            exported: row.2,
            scan_triggered: row.3,
            scan_completed: row.4,
            errors: row.5,
        })
    }
}
