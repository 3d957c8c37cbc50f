//! Sync-log endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use domain::models::{SyncLog, SyncLogResponse};
use persistence::repositories::SyncLogRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// Query parameters for log listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LogQuery {
    pub limit: Option<i64>,
}

/// Sync history for one connection, newest first.
///
/// GET /api/v1/connections/:id/sync-logs?limit=<n>
pub async fn list_connection_logs(
    State(state): State<AppState>,
    Path(connection_id): Path<Uuid>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<SyncLogResponse>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.config.sync.log_history_limit)
        .max(1);
    let logs = SyncLogRepository::new(state.pool.clone())
        .list_for_connection(connection_id, limit)
        .await?
        .into_iter()
        .map(|entity| SyncLogResponse::from(SyncLog::from(entity)))
        .collect();
    Ok(Json(logs))
}

/// Sync history across all connections, newest first.
///
/// GET /api/v1/sync-logs?limit=<n>
pub async fn list_recent_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<SyncLogResponse>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.config.sync.log_history_limit)
        .max(1);
    let logs = SyncLogRepository::new(state.pool.clone())
        .list_recent(limit)
        .await?
        .into_iter()
        .map(|entity| SyncLogResponse::from(SyncLog::from(entity)))
        .collect();
    Ok(Json(logs))
}
