use crate::http::error::ApiError;
use crate::http::server::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::debug;

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Authenticated caller identity, attached as a request extension
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
}

/// Require a signed access token on the request.
///
/// A missing header is 403. A present token that fails verification goes
/// through the InvalidToken mapping and surfaces as 500.
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let Some(token) = token else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "No token provided" })),
        )
            .into_response();
    };

    match state.auth_token_provider.validate_token(&token) {
        Ok(user_id) => {
            debug!(user_id = %user_id, "access token verified");
            request.extensions_mut().insert(UserContext { user_id });
            next.run(request).await
        }
        Err(error) => ApiError::from(error).into_response(),
    }
}
