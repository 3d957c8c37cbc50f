//! Source-inventory lifecycle event handlers.
//!
//! The source-of-truth inventory calls these endpoints whenever one of
//! its devices is saved or deleted. Each event updates the in-process
//! mirror and fans out to every active connection.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use domain::models::SourceDevice;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::sync_engine::{ConnectionSyncOutcome, SyncEngine};

/// Device created or updated in the source inventory.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeviceSavedEvent {
    pub device: SourceDevice,
    /// True on first save, false on subsequent updates. Informational;
    /// create vs update on the monitor side is decided per mapping.
    #[serde(default)]
    pub created: bool,
}

/// Device deleted from the source inventory.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeviceDeletedEvent {
    pub device_id: Uuid,
    pub device_name: String,
}

/// Handle a device-saved event.
///
/// POST /api/v1/events/device-saved
pub async fn device_saved(
    State(state): State<AppState>,
    Json(event): Json<DeviceSavedEvent>,
) -> Result<Json<Vec<ConnectionSyncOutcome>>, ApiError> {
    tracing::debug!(
        device = %event.device.name,
        created = event.created,
        "device-saved event received"
    );
    state.inventory.upsert(event.device.clone()).await;

    let engine = SyncEngine::new(state.pool.clone(), state.config.sync.clone());
    let outcomes = engine
        .handle_device_saved(&event.device, state.inventory.as_ref())
        .await?;
    Ok(Json(outcomes))
}

/// Handle a device-deleted event.
///
/// POST /api/v1/events/device-deleted
pub async fn device_deleted(
    State(state): State<AppState>,
    Json(event): Json<DeviceDeletedEvent>,
) -> Result<Json<Vec<ConnectionSyncOutcome>>, ApiError> {
    tracing::debug!(
        device = %event.device_name,
        "device-deleted event received"
    );

    let engine = SyncEngine::new(state.pool.clone(), state.config.sync.clone());
    let outcomes = engine
        .handle_device_deleted(event.device_id, &event.device_name)
        .await?;

    // The mirror entry goes last so conflict checks during removal can
    // still see the device.
    state.inventory.remove(event.device_id).await;
    Ok(Json(outcomes))
}
