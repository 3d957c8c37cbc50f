//! Sync-log repository for database operations.

use domain::models::{SyncLogStatus, SyncType};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SyncLogEntity;
use crate::metrics::QueryTimer;

const LOG_COLUMNS: &str = "id, connection_id, sync_type, status, start_time, end_time, \
                           devices_discovered, devices_created, devices_updated, \
                           devices_errors, summary";

/// Counts carried by a finished sync-log entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncCounts {
    pub discovered: i32,
    pub created: i32,
    pub updated: i32,
    pub errors: i32,
}

/// Repository for the append-only sync audit log.
#[derive(Clone)]
pub struct SyncLogRepository {
    pool: PgPool,
}

impl SyncLogRepository {
    /// Creates a new SyncLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a running log entry at the start of a long sync operation.
    pub async fn start(
        &self,
        connection_id: Uuid,
        sync_type: SyncType,
    ) -> Result<SyncLogEntity, sqlx::Error> {
        let timer = QueryTimer::new("start_sync_log");
        let result = sqlx::query_as::<_, SyncLogEntity>(&format!(
            r#"
            INSERT INTO sync_logs (connection_id, sync_type, status)
            VALUES ($1, $2, 'running')
            RETURNING {LOG_COLUMNS}
            "#,
        ))
        .bind(connection_id)
        .bind(sync_type)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Finalize a running log entry with its outcome and counts.
    /// Returns None if the entry does not exist.
    pub async fn complete(
        &self,
        id: Uuid,
        status: SyncLogStatus,
        counts: SyncCounts,
        summary: Option<&str>,
    ) -> Result<Option<SyncLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("complete_sync_log");
        let result = sqlx::query_as::<_, SyncLogEntity>(&format!(
            r#"
            UPDATE sync_logs SET
                status = $2,
                end_time = NOW(),
                devices_discovered = $3,
                devices_created = $4,
                devices_updated = $5,
                devices_errors = $6,
                summary = $7
            WHERE id = $1
            RETURNING {LOG_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .bind(counts.discovered)
        .bind(counts.created)
        .bind(counts.updated)
        .bind(counts.errors)
        .bind(summary)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// One-shot entry for a short per-device operation that is already
    /// finished when it is logged.
    pub async fn record(
        &self,
        connection_id: Uuid,
        sync_type: SyncType,
        status: SyncLogStatus,
        counts: SyncCounts,
        summary: Option<&str>,
    ) -> Result<SyncLogEntity, sqlx::Error> {
        let timer = QueryTimer::new("record_sync_log");
        let result = sqlx::query_as::<_, SyncLogEntity>(&format!(
            r#"
            INSERT INTO sync_logs (connection_id, sync_type, status, end_time,
                                   devices_discovered, devices_created, devices_updated,
                                   devices_errors, summary)
            VALUES ($1, $2, $3, NOW(), $4, $5, $6, $7, $8)
            RETURNING {LOG_COLUMNS}
            "#,
        ))
        .bind(connection_id)
        .bind(sync_type)
        .bind(status)
        .bind(counts.discovered)
        .bind(counts.created)
        .bind(counts.updated)
        .bind(counts.errors)
        .bind(summary)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recent log entry for one connection.
    pub async fn latest_for_connection(
        &self,
        connection_id: Uuid,
    ) -> Result<Option<SyncLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("latest_sync_log");
        let result = sqlx::query_as::<_, SyncLogEntity>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM sync_logs
            WHERE connection_id = $1
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        ))
        .bind(connection_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Log history for one connection, newest first.
    pub async fn list_for_connection(
        &self,
        connection_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SyncLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_sync_logs");
        let result = sqlx::query_as::<_, SyncLogEntity>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM sync_logs
            WHERE connection_id = $1
            ORDER BY start_time DESC
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

    /// Log history across all connections, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<SyncLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_recent_sync_logs");
        let result = sqlx::query_as::<_, SyncLogEntity>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM sync_logs
            ORDER BY start_time DESC
            LIMIT $1
            "#,
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
