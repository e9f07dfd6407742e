//! Casting HTTP API module.
pub mod actors;
pub mod error;
pub mod movies;
pub mod openapi;
pub mod system;
pub mod types;

use crate::api::error::{ApiError, api_method_not_allowed, api_not_found};
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub(crate) fn record_change(resource: &'static str, op: &'static str) {
    metrics::counter!(
        "casting_resource_changes_total",
        "resource" => resource,
        "op" => op
    )
    .increment(1);
}

/// Router fallback for unknown paths.
pub(crate) async fn not_found() -> ApiError {
    api_not_found()
}

/// Replace axum's empty 405 with the error envelope, keeping `Allow`.
pub(crate) async fn method_not_allowed_envelope(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut envelope = api_method_not_allowed().into_response();
    if let Some(allow) = allow {
        envelope.headers_mut().insert(header::ALLOW, allow);
    }
    envelope
}
