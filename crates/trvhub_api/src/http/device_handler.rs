use crate::http::auth::UserContext;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common::{Device, DiscoveredDevice};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Full-replace payload for updating a device; the identifier comes from
/// the request path, never the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceRequest {
    pub name: String,
    pub current_temperature: f64,
    pub serial_id: String,
    pub active: bool,
    #[serde(default)]
    pub schedules: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn create_devices(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    payload: Option<Json<Vec<DiscoveredDevice>>>,
) -> Result<(StatusCode, Json<Vec<Device>>), ApiError> {
    let devices = payload.map(|Json(devices)| devices);
    let created = state.device_service.create_devices(devices).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn discover_devices(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.discovery_service.discover_all_devices(true).await?;
    debug!(count = devices.len(), "discovery complete");
    Ok(Json(devices))
}

pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Device>, ApiError> {
    let device = state.device_service.get_device(&device_id).await?;
    Ok(Json(device))
}

pub async fn update_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(payload): Json<UpdateDeviceRequest>,
) -> Result<Json<Device>, ApiError> {
    let device = Device {
        id: device_id,
        name: payload.name,
        current_temperature: payload.current_temperature,
        serial_id: payload.serial_id,
        active: payload.active,
        schedules: payload.schedules,
        metadata: payload.metadata,
    };

    let updated = state.device_service.update_device(device).await?;
    Ok(Json(updated))
}

pub async fn delete_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.device_service.delete_device(&device_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
