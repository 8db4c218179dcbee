use axum::{
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::ws::ws_handler;
use crate::state::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        // Coordinator state and session control
        .route("/mtp/state", get(handlers::mtp_state))
        .route("/mtp/start", post(handlers::mtp_start))
        .route("/mtp/stop", post(handlers::mtp_stop))
        // Mount notifier delivery point
        .route("/mtp/storage/state", post(handlers::storage_state_changed))
        // Lock notifier delivery point
        .route("/mtp/unlock", post(handlers::unlock_observed))
        // PTP-mode setting observer
        .route("/mtp/ptp", post(handlers::set_ptp_mode))
        // Object change notifications
        .route("/mtp/objects/added", post(handlers::object_added))
        .route("/mtp/objects/removed", post(handlers::object_removed))
        // WebSocket endpoint for real-time events
        .route("/mtp/events", any(ws_handler));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
