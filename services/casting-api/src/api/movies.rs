//! Movie API handlers.
use crate::api::error::{ApiError, api_bad_request, api_internal, api_store_error};
use crate::api::record_change;
use crate::api::types::{
    DeleteResponse, ErrorResponse, MovieCreateRequest, MovieListResponse, MoviePatchRequest,
    MovieResponse,
};
use crate::app::AppState;
use crate::model::{MoviePatch, NewMovie, parse_release_date};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Path, State};
use casting_authz::DecodedClaims;
use chrono::NaiveDate;

fn release_date(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_release_date(raw).ok_or_else(|| {
        tracing::debug!(release_date = raw, "unparsable release date");
        api_bad_request()
    })
}

#[utoipa::path(
    get,
    path = "/movies",
    tag = "movies",
    responses(
        (status = 200, description = "All movies", body = MovieListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks read:movies", body = ErrorResponse)
    )
)]
pub(crate) async fn list_movies(
    State(state): State<AppState>,
) -> Result<Json<MovieListResponse>, ApiError> {
    let movies = state
        .store
        .list_movies()
        .await
        .map_err(|err| api_internal("list movies", &err))?;
    Ok(Json(MovieListResponse {
        success: true,
        movies,
    }))
}

#[utoipa::path(
    post,
    path = "/movies",
    tag = "movies",
    request_body = MovieCreateRequest,
    responses(
        (status = 200, description = "Movie created", body = MovieResponse),
        (status = 400, description = "Missing field or bad release date", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks post:movies", body = ErrorResponse)
    )
)]
pub(crate) async fn create_movie(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    body: Result<Json<MovieCreateRequest>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Json(body) = body?;
    let (Some(title), Some(raw_date)) = (body.title, body.release_date) else {
        return Err(api_bad_request());
    };
    let release_date = release_date(&raw_date)?;
    let movie = state
        .store
        .create_movie(NewMovie {
            title,
            release_date,
        })
        .await
        .map_err(|err| api_internal("create movie", &err))?;
    record_change("movies", "create");
    tracing::info!(movie_id = movie.id, subject = ?claims.subject, "movie created");
    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

#[utoipa::path(
    patch,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    request_body = MoviePatchRequest,
    responses(
        (status = 200, description = "Movie updated", body = MovieResponse),
        (status = 400, description = "Mistyped field or bad release date", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse)
    )
)]
pub(crate) async fn patch_movie(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<MoviePatchRequest>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let patch = MoviePatch {
        title: body.title,
        release_date: body.release_date.as_deref().map(release_date).transpose()?,
    };
    let movie = state
        .store
        .patch_movie(id, patch)
        .await
        .map_err(|err| api_store_error("patch movie", err))?;
    record_change("movies", "patch");
    tracing::info!(movie_id = id, subject = ?claims.subject, "movie updated");
    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

#[utoipa::path(
    delete,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie deleted", body = DeleteResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_movie(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;
    state
        .store
        .delete_movie(id)
        .await
        .map_err(|err| api_store_error("delete movie", err))?;
    record_change("movies", "delete");
    tracing::info!(movie_id = id, subject = ?claims.subject, "movie deleted");
    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
