//! API error type and helpers.
//!
//! # Key invariants
//! - Every failure renders as `{"success": false, "error": <status>, "message": <text>}`.
//! - `error` always equals the HTTP status code of the response.
//! - Internal errors log details server-side and return a generic message.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use casting_authz::AuthError;

pub const BAD_REQUEST_MESSAGE: &str = "Bad request";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const INTERNAL_MESSAGE: &str = "Internal server error.";
pub const UNAVAILABLE_MESSAGE: &str = "Service unavailable";

/// Structured API error returned by handlers.
///
/// `code` is a short machine-readable tag for logs; it is not part of the body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            body: ErrorResponse {
                success: false,
                error: status.as_u16(),
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn api_bad_request() -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "bad_request", BAD_REQUEST_MESSAGE)
}

pub fn api_not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", NOT_FOUND_MESSAGE)
}

pub fn api_method_not_allowed() -> ApiError {
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "method_not_allowed",
        METHOD_NOT_ALLOWED_MESSAGE,
    )
}

/// Build a 500 from a store error, logging the detail.
pub fn api_internal(context: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, context, "casting storage error");
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        INTERNAL_MESSAGE,
    )
}

pub fn api_unavailable(err: &StoreError) -> ApiError {
    tracing::warn!(error = ?err, "casting storage health check failed");
    ApiError::new(
        StatusCode::SERVICE_UNAVAILABLE,
        "unavailable",
        UNAVAILABLE_MESSAGE,
    )
}

/// Map a store error: unknown ids become 404, anything else 500.
pub fn api_store_error(context: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) => api_not_found(),
        other => api_internal(context, &other),
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
        ApiError::new(status, err.code(), err.public_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        api_bad_request()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected path parameter");
        api_not_found()
    }
}
