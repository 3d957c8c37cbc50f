//! Connection endpoint handlers.
//!
//! A connection is one stored monitoring-system target: credentials,
//! host and the per-connection sync/export switches.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    Connection, ConnectionResponse, CreateConnectionRequest, ExportRecord, ExportStats, SyncLog,
    SyncLogResponse, SyncedDeviceStats, UpdateConnectionRequest,
};
use monitor::{ConnectionTest, MonitorClient};
use persistence::repositories::{ConnectionRepository, SyncLogRepository, SyncedDeviceRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::export::{ExportRunSummary, ExportService};
use crate::services::monitor_config;
use crate::services::sync_engine::SyncEngine;

/// Export-record counts and recent history for one connection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportStatusResponse {
    pub stats: ExportStats,
    pub recent: Vec<ExportRecord>,
}

/// Aggregated status of one connection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectionStatusResponse {
    pub connection: ConnectionResponse,
    pub devices: SyncedDeviceStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_sync: Option<SyncLogResponse>,
}

async fn load_connection(state: &AppState, id: Uuid) -> Result<Connection, ApiError> {
    ConnectionRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(Connection::from)
        .ok_or_else(|| ApiError::NotFound(format!("connection {id} not found")))
}

/// Create a connection.
///
/// POST /api/v1/connections
pub async fn create_connection(
    State(state): State<AppState>,
    Json(request): Json<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<ConnectionResponse>), ApiError> {
    request.validate()?;
    let entity = ConnectionRepository::new(state.pool.clone())
        .create(&request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ConnectionResponse::from(Connection::from(entity))),
    ))
}

/// List all connections.
///
/// GET /api/v1/connections
pub async fn list_connections(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConnectionResponse>>, ApiError> {
    let connections = ConnectionRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(|entity| ConnectionResponse::from(Connection::from(entity)))
        .collect();
    Ok(Json(connections))
}

/// Get one connection.
///
/// GET /api/v1/connections/:id
pub async fn get_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionResponse>, ApiError> {
    let connection = load_connection(&state, id).await?;
    Ok(Json(ConnectionResponse::from(connection)))
}

/// Partially update a connection; absent fields are left untouched.
///
/// PUT /api/v1/connections/:id
pub async fn update_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateConnectionRequest>,
) -> Result<Json<ConnectionResponse>, ApiError> {
    request.validate()?;
    let entity = ConnectionRepository::new(state.pool.clone())
        .update(id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("connection {id} not found")))?;
    Ok(Json(ConnectionResponse::from(Connection::from(entity))))
}

/// Delete a connection and all of its sync state.
///
/// DELETE /api/v1/connections/:id
pub async fn delete_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = ConnectionRepository::new(state.pool.clone())
        .delete(id)
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("connection {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Probe a connection's monitoring system with the stored credentials.
///
/// POST /api/v1/connections/:id/test
pub async fn test_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionTest>, ApiError> {
    let connection = load_connection(&state, id).await?;
    let mut client = MonitorClient::new(monitor_config(&connection, &state.config.sync))?;
    Ok(Json(client.test_connection().await))
}

/// Aggregated device counts and latest sync run for one connection.
///
/// GET /api/v1/connections/:id/status
pub async fn connection_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionStatusResponse>, ApiError> {
    let connection = load_connection(&state, id).await?;
    let devices = SyncedDeviceRepository::new(state.pool.clone())
        .stats(id)
        .await?;
    let latest_sync = SyncLogRepository::new(state.pool.clone())
        .latest_for_connection(id)
        .await?
        .map(|entity| SyncLogResponse::from(SyncLog::from(entity)));

    Ok(Json(ConnectionStatusResponse {
        connection: ConnectionResponse::from(connection),
        devices,
        latest_sync,
    }))
}

/// Trigger a full reconciliation of the source inventory against one
/// connection.
///
/// POST /api/v1/connections/:id/sync
pub async fn trigger_sync(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SyncLogResponse>, ApiError> {
    let engine = SyncEngine::new(state.pool.clone(), state.config.sync.clone());
    let log = engine.run_manual_sync(id, state.inventory.as_ref()).await?;
    Ok(Json(log))
}

/// Trigger a bulk export run for one connection.
///
/// POST /api/v1/connections/:id/export
pub async fn trigger_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportRunSummary>, ApiError> {
    let connection = load_connection(&state, id).await?;
    if !connection.enable_export {
        return Err(ApiError::Forbidden(
            "export is not enabled for this connection".to_string(),
        ));
    }

    let service = ExportService::new(state.pool.clone(), state.config.sync.clone());
    let summary = service
        .export_connection(id, state.inventory.as_ref())
        .await?;
    Ok(Json(summary))
}

/// Export-record totals and recent history for one connection.
///
/// GET /api/v1/connections/:id/export/stats
pub async fn export_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportStatusResponse>, ApiError> {
    load_connection(&state, id).await?;
    let service = ExportService::new(state.pool.clone(), state.config.sync.clone());
    let (stats, recent) = service
        .status(id, state.config.sync.log_history_limit)
        .await?;
    Ok(Json(ExportStatusResponse { stats, recent }))
}
