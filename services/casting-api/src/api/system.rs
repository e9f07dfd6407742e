//! Health probe.
//!
//! Unauthenticated. Reports the storage backend so operators can confirm
//! which store a replica is using.
use crate::api::error::{ApiError, api_unavailable};
use crate::api::types::{ErrorResponse, HealthStatus};
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service and storage healthy", body = HealthStatus),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    state
        .store
        .health_check()
        .await
        .map_err(|err| api_unavailable(&err))?;
    Ok(Json(HealthStatus {
        success: true,
        status: "ok".to_string(),
        storage: state.store.backend_name().to_string(),
    }))
}
