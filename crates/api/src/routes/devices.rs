//! Synced-device endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use domain::models::{SyncedDevice, SyncedDeviceResponse};
use persistence::repositories::SyncedDeviceRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::sync_engine::{ConnectionSyncOutcome, SyncEngine};

/// Request body for toggling per-device sync.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetSyncEnabledRequest {
    pub sync_enabled: bool,
}

/// All synced-device mappings for one connection.
///
/// GET /api/v1/connections/:id/devices
pub async fn list_synced_devices(
    State(state): State<AppState>,
    Path(connection_id): Path<Uuid>,
) -> Result<Json<Vec<SyncedDeviceResponse>>, ApiError> {
    let devices = SyncedDeviceRepository::new(state.pool.clone())
        .list_by_connection(connection_id)
        .await?
        .into_iter()
        .map(|entity| SyncedDeviceResponse::from(SyncedDevice::from(entity)))
        .collect();
    Ok(Json(devices))
}

/// One synced-device mapping by its own ID.
///
/// GET /api/v1/devices/:id
pub async fn get_synced_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SyncedDeviceResponse>, ApiError> {
    let device = SyncedDeviceRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(|entity| SyncedDeviceResponse::from(SyncedDevice::from(entity)))
        .ok_or_else(|| ApiError::NotFound(format!("synced device {id} not found")))?;
    Ok(Json(device))
}

/// Enable or disable sync for one device mapping. Disabled devices are
/// skipped by every sync path until re-enabled.
///
/// PATCH /api/v1/devices/:id/sync-enabled
pub async fn set_sync_enabled(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetSyncEnabledRequest>,
) -> Result<Json<SyncedDeviceResponse>, ApiError> {
    let repo = SyncedDeviceRepository::new(state.pool.clone());
    let updated = repo.set_sync_enabled(id, request.sync_enabled).await?;
    if updated == 0 {
        return Err(ApiError::NotFound(format!("synced device {id} not found")));
    }

    let device = repo
        .find_by_id(id)
        .await?
        .map(|entity| SyncedDeviceResponse::from(SyncedDevice::from(entity)))
        .ok_or_else(|| ApiError::NotFound(format!("synced device {id} not found")))?;
    Ok(Json(device))
}

/// Re-sync one device mapping immediately, outside any inventory
/// event.
///
/// POST /api/v1/devices/:id/force-sync
pub async fn force_sync(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionSyncOutcome>, ApiError> {
    let engine = SyncEngine::new(state.pool.clone(), state.config.sync.clone());
    let outcome = engine.force_sync(id, state.inventory.as_ref()).await?;
    Ok(Json(outcome))
}
