//! HTTP API request/response types.
use crate::model::{Actor, Movie};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub success: bool,
    pub status: String,
    pub storage: String,
}

/// Body of `POST /actors`. Every field is required; they are optional here so
/// a missing field is reported as 400 rather than a deserialization error.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ActorCreateRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MovieCreateRequest {
    pub title: Option<String>,
    #[schema(example = "2024-05-17")]
    pub release_date: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Clone)]
pub struct MoviePatchRequest {
    pub title: Option<String>,
    #[schema(example = "2024-05-17")]
    pub release_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ActorListResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ActorResponse {
    pub success: bool,
    pub actor: Actor,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MovieListResponse {
    pub success: bool,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MovieResponse {
    pub success: bool,
    pub movie: Movie,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i64,
}
