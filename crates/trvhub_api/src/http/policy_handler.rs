use crate::domain::{CreatePolicyRequest, UpdatePolicyRequest};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use common::{Policy, PolicySpan};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPayload {
    pub name: String,
    pub user_id: String,
    #[serde(default)]
    pub spans: Vec<PolicySpan>,
}

pub async fn create_policy(
    State(state): State<AppState>,
    Json(payload): Json<PolicyPayload>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    let policy = state
        .policy_service
        .create_policy(CreatePolicyRequest {
            name: payload.name,
            user_id: payload.user_id,
            spans: payload.spans,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(policy)))
}

pub async fn list_policies(
    State(state): State<AppState>,
) -> Result<Json<Vec<Policy>>, ApiError> {
    let policies = state.policy_service.list_policies().await?;
    Ok(Json(policies))
}

pub async fn get_policy(
    State(state): State<AppState>,
    Path(policy_id): Path<String>,
) -> Result<Json<Policy>, ApiError> {
    let policy = state.policy_service.get_policy(&policy_id).await?;
    Ok(Json(policy))
}

pub async fn update_policy(
    State(state): State<AppState>,
    Path(policy_id): Path<String>,
    Json(payload): Json<PolicyPayload>,
) -> Result<Json<Policy>, ApiError> {
    let policy = state
        .policy_service
        .update_policy(UpdatePolicyRequest {
            policy_id,
            name: payload.name,
            user_id: payload.user_id,
            spans: payload.spans,
        })
        .await?;

    Ok(Json(policy))
}

pub async fn delete_policy(
    State(state): State<AppState>,
    Path(policy_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.policy_service.delete_policy(&policy_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
