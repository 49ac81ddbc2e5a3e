//! Service error → HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use sentra_core::AuthError;

/// Map a service error to its HTTP shape.
///
/// Authorization failures always carry the generic message and internal
/// faults never leak their detail.
pub fn error_to_response(err: &AuthError) -> axum::response::Response {
    match err {
        AuthError::Authentication(msg) => {
            json_error(StatusCode::UNAUTHORIZED, "authentication_error", msg)
        }
        AuthError::Authorization => json_error(
            StatusCode::FORBIDDEN,
            "authorization_error",
            "insufficient permissions",
        ),
        AuthError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuthError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        AuthError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        AuthError::Internal(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal server error",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
