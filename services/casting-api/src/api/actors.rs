//! Actor API handlers.
//!
//! Each handler sits behind a `RequirePermissionLayer`, so the verified
//! claims are always present in the request extensions when it runs.
use crate::api::error::{ApiError, api_bad_request, api_internal, api_store_error};
use crate::api::record_change;
use crate::api::types::{
    ActorCreateRequest, ActorListResponse, ActorResponse, DeleteResponse, ErrorResponse,
};
use crate::app::AppState;
use crate::model::{ActorPatch, NewActor};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Path, State};
use casting_authz::DecodedClaims;

#[utoipa::path(
    get,
    path = "/actors",
    tag = "actors",
    responses(
        (status = 200, description = "All actors", body = ActorListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks read:actors", body = ErrorResponse)
    )
)]
pub(crate) async fn list_actors(
    State(state): State<AppState>,
) -> Result<Json<ActorListResponse>, ApiError> {
    let actors = state
        .store
        .list_actors()
        .await
        .map_err(|err| api_internal("list actors", &err))?;
    Ok(Json(ActorListResponse {
        success: true,
        actors,
    }))
}

#[utoipa::path(
    post,
    path = "/actors",
    tag = "actors",
    request_body = ActorCreateRequest,
    responses(
        (status = 200, description = "Actor created", body = ActorResponse),
        (status = 400, description = "Missing or mistyped field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks post:actors", body = ErrorResponse)
    )
)]
pub(crate) async fn create_actor(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    body: Result<Json<ActorCreateRequest>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Json(body) = body?;
    let (Some(name), Some(age), Some(gender)) = (body.name, body.age, body.gender) else {
        return Err(api_bad_request());
    };
    let actor = state
        .store
        .create_actor(NewActor { name, age, gender })
        .await
        .map_err(|err| api_internal("create actor", &err))?;
    record_change("actors", "create");
    tracing::info!(actor_id = actor.id, subject = ?claims.subject, "actor created");
    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

#[utoipa::path(
    patch,
    path = "/actors/{id}",
    tag = "actors",
    params(("id" = i64, Path, description = "Actor id")),
    request_body = ActorPatch,
    responses(
        (status = 200, description = "Actor updated", body = ActorResponse),
        (status = 400, description = "Mistyped field", body = ErrorResponse),
        (status = 404, description = "Actor not found", body = ErrorResponse)
    )
)]
pub(crate) async fn patch_actor(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ActorPatch>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = body?;
    let actor = state
        .store
        .patch_actor(id, patch)
        .await
        .map_err(|err| api_store_error("patch actor", err))?;
    record_change("actors", "patch");
    tracing::info!(actor_id = id, subject = ?claims.subject, "actor updated");
    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

#[utoipa::path(
    delete,
    path = "/actors/{id}",
    tag = "actors",
    params(("id" = i64, Path, description = "Actor id")),
    responses(
        (status = 200, description = "Actor deleted", body = DeleteResponse),
        (status = 404, description = "Actor not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_actor(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;
    state
        .store
        .delete_actor(id)
        .await
        .map_err(|err| api_store_error("delete actor", err))?;
    record_change("actors", "delete");
    tracing::info!(actor_id = id, subject = ?claims.subject, "actor deleted");
    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
