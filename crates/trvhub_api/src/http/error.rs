use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::DomainError;
use serde_json::json;

/// Wrapper giving domain errors an HTTP rendering
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

/// The single place domain errors map to HTTP statuses.
///
/// Invalid tokens map to 500, not 401; the auth layer reserves 403 for a
/// missing token header.
pub fn domain_error_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::BadRequest(_) | DomainError::Validation(_) => StatusCode::BAD_REQUEST,

        DomainError::Conflict(_) => StatusCode::CONFLICT,

        DomainError::NotFound(_) => StatusCode::NOT_FOUND,

        DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,

        DomainError::Upstream(_)
        | DomainError::InvalidToken(_)
        | DomainError::PasswordHashing(_)
        | DomainError::Initialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = domain_error_status(&self.0);
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
