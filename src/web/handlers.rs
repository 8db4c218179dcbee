//! Control surface request handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::coordinator::{MtpState, VolumeState};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Unified success response body
#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Coordinator state snapshot
pub async fn mtp_state(State(state): State<Arc<AppState>>) -> Result<Json<MtpState>> {
    Ok(Json(state.coordinator.state().await?))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct StartRequest {
    /// Primary storage path; defaults to candidate index 0
    pub primary_path: Option<PathBuf>,
}

pub async fn mtp_start(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StartRequest>>,
) -> Result<Json<ApiResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let primary = match request.primary_path {
        Some(path) => path,
        None => state
            .config
            .storage
            .primary_path()
            .cloned()
            .ok_or_else(|| {
                AppError::Config("no candidate storage paths configured".to_string())
            })?,
    };

    info!("session start requested (primary={})", primary.display());
    state.coordinator.start_requested(primary).await?;
    Ok(ApiResponse::ok("session running"))
}

pub async fn mtp_stop(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    info!("session stop requested");
    state.coordinator.stop_requested().await?;
    Ok(ApiResponse::ok("session stopped"))
}

#[derive(Debug, Deserialize)]
pub struct StorageStateRequest {
    pub path: PathBuf,
    pub old_state: VolumeState,
    pub new_state: VolumeState,
}

pub async fn storage_state_changed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StorageStateRequest>,
) -> Json<ApiResponse> {
    state.coordinator.storage_state_changed(
        request.path,
        request.old_state,
        request.new_state,
    );
    ApiResponse::ok("storage state accepted")
}

pub async fn unlock_observed(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    state.coordinator.unlock_observed();
    ApiResponse::ok("unlock accepted")
}

#[derive(Debug, Deserialize)]
pub struct PtpModeRequest {
    pub enabled: bool,
}

pub async fn set_ptp_mode(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PtpModeRequest>,
) -> Json<ApiResponse> {
    state.coordinator.ptp_mode_changed(request.enabled);
    ApiResponse::ok("ptp mode updated")
}

#[derive(Debug, Deserialize)]
pub struct ObjectRequest {
    pub handle: u32,
}

pub async fn object_added(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ObjectRequest>,
) -> Json<ApiResponse> {
    state.coordinator.object_added(request.handle);
    ApiResponse::ok("object notification accepted")
}

pub async fn object_removed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ObjectRequest>,
) -> Json<ApiResponse> {
    state.coordinator.object_removed(request.handle);
    ApiResponse::ok("object notification accepted")
}
