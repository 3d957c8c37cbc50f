//! Connection repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{CreateConnectionRequest, UpdateConnectionRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ConnectionEntity;
use crate::metrics::QueryTimer;

const CONNECTION_COLUMNS: &str = "id, name, host, port, username, password, use_ssl, verify_ssl, \
                                  is_active, enable_export, last_export, created_at, updated_at";

/// Repository for connection-related database operations.
#[derive(Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
}

impl ConnectionRepository {
    /// Creates a new ConnectionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a connection from a validated request.
    pub async fn create(
        &self,
        request: &CreateConnectionRequest,
    ) -> Result<ConnectionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_connection");
        let result = sqlx::query_as::<_, ConnectionEntity>(&format!(
            r#"
            INSERT INTO connections (name, host, port, username, password, use_ssl, verify_ssl, is_active, enable_export)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CONNECTION_COLUMNS}
            "#,
        ))
        .bind(&request.name)
        .bind(&request.host)
        .bind(request.port)
        .bind(&request.username)
        .bind(&request.password)
        .bind(request.use_ssl)
        .bind(request.verify_ssl)
        .bind(request.is_active)
        .bind(request.enable_export)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a connection by its UUID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_connection_by_id");
        let result = sqlx::query_as::<_, ConnectionEntity>(&format!(
            r#"
            SELECT {CONNECTION_COLUMNS}
            FROM connections
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All connections, newest first.
    pub async fn list_all(&self) -> Result<Vec<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_connections");
        let result = sqlx::query_as::<_, ConnectionEntity>(&format!(
            r#"
            SELECT {CONNECTION_COLUMNS}
            FROM connections
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Active connections only; these are the sync targets.
    pub async fn list_active(&self) -> Result<Vec<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_connections");
        let result = sqlx::query_as::<_, ConnectionEntity>(&format!(
            r#"
            SELECT {CONNECTION_COLUMNS}
            FROM connections
            WHERE is_active = true
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Active connections with export enabled.
    pub async fn list_export_enabled(&self) -> Result<Vec<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_export_enabled_connections");
        let result = sqlx::query_as::<_, ConnectionEntity>(&format!(
            r#"
            SELECT {CONNECTION_COLUMNS}
            FROM connections
            WHERE is_active = true AND enable_export = true
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Partial update; absent fields keep their current value.
    /// Returns None if the connection does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateConnectionRequest,
    ) -> Result<Option<ConnectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_connection");
        let result = sqlx::query_as::<_, ConnectionEntity>(&format!(
            r#"
            UPDATE connections SET
                name = COALESCE($2, name),
                host = COALESCE($3, host),
                port = COALESCE($4, port),
                username = COALESCE($5, username),
                password = COALESCE($6, password),
                use_ssl = COALESCE($7, use_ssl),
                verify_ssl = COALESCE($8, verify_ssl),
                is_active = COALESCE($9, is_active),
                enable_export = COALESCE($10, enable_export),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CONNECTION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.host)
        .bind(request.port)
        .bind(&request.username)
        .bind(&request.password)
        .bind(request.use_ssl)
        .bind(request.verify_ssl)
        .bind(request.is_active)
        .bind(request.enable_export)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a connection. Synced devices, logs and export records go
    /// with it via FK cascade. Returns the number of rows deleted.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_connection");
        let result = sqlx::query("DELETE FROM connections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Stamp the time of the last successful export run.
    pub async fn mark_export(
        &self,
        id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_connection_export");
        sqlx::query(
            r#"
            UPDATE connections
            SET last_export = $2, updated_at = NOW()
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
}
