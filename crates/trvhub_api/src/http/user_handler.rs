use crate::domain::{LoginInput, RegisterUserInput, UpdateUserInput};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use common::{GatewayCredentials, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub address: Option<String>,
    pub gateway_credentials: Option<GatewayCredentials>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: String,
    pub address: Option<String>,
    pub password: Option<String>,
    pub gateway_credentials: Option<GatewayCredentials>,
}

/// User representation returned over HTTP; credentials never leave the
/// service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            address: user.address,
        }
    }
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .register_user(RegisterUserInput {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            address: payload.address,
            gateway_credentials: payload.gateway_credentials,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let output = state
        .user_service
        .login_user(LoginInput {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        access_token: output.access_token,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get_user(&user_id).await?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .update_user(UpdateUserInput {
            user_id,
            name: payload.name,
            address: payload.address,
            password: payload.password,
            gateway_credentials: payload.gateway_credentials,
        })
        .await?;

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.user_service.delete_user(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
