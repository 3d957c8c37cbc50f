use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use domain::services::InMemorySourceInventory;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware};
use crate::routes::{connections, devices, events, health, sync_logs};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// In-process mirror of the source inventory, fed by the event
    /// endpoints. Conflict detection and export read from it.
    pub inventory: Arc<InMemorySourceInventory>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        inventory: Arc::new(InMemorySourceInventory::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Versioned API routes
    let api_routes = Router::new()
        // Connection management
        .route("/api/v1/connections", post(connections::create_connection))
        .route("/api/v1/connections", get(connections::list_connections))
        .route("/api/v1/connections/:id", get(connections::get_connection))
        .route("/api/v1/connections/:id", put(connections::update_connection))
        .route(
            "/api/v1/connections/:id",
            delete(connections::delete_connection),
        )
        .route(
            "/api/v1/connections/:id/test",
            post(connections::test_connection),
        )
        .route(
            "/api/v1/connections/:id/status",
            get(connections::connection_status),
        )
        .route(
            "/api/v1/connections/:id/sync",
            post(connections::trigger_sync),
        )
        .route(
            "/api/v1/connections/:id/export",
            post(connections::trigger_export),
        )
        .route(
            "/api/v1/connections/:id/export/stats",
            get(connections::export_stats),
        )
        // Synced devices
        .route(
            "/api/v1/connections/:id/devices",
            get(devices::list_synced_devices),
        )
        .route("/api/v1/devices/:id", get(devices::get_synced_device))
        .route(
            "/api/v1/devices/:id/sync-enabled",
            patch(devices::set_sync_enabled),
        )
        .route("/api/v1/devices/:id/force-sync", post(devices::force_sync))
        // Sync logs
        .route(
            "/api/v1/connections/:id/sync-logs",
            get(sync_logs::list_connection_logs),
        )
        .route("/api/v1/sync-logs", get(sync_logs::list_recent_logs))
        // Source inventory event triggers
        .route("/api/v1/events/device-saved", post(events::device_saved))
        .route("/api/v1/events/device-deleted", post(events::device_deleted));

    // Public routes (no versioning)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
