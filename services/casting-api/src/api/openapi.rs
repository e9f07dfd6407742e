//! OpenAPI document for the casting API.
use crate::api::types::{
    ActorCreateRequest, ActorListResponse, ActorResponse, DeleteResponse, ErrorResponse,
    HealthStatus, MovieCreateRequest, MovieListResponse, MoviePatchRequest, MovieResponse,
};
use crate::api::{actors, movies, system};
use crate::model::{Actor, ActorPatch, Movie};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "casting-api",
        version = "v1",
        description = "Casting agency movies and actors API. Every resource route requires a bearer token carrying the route's permission."
    ),
    paths(
        system::health,
        actors::list_actors,
        actors::create_actor,
        actors::patch_actor,
        actors::delete_actor,
        movies::list_movies,
        movies::create_movie,
        movies::patch_movie,
        movies::delete_movie
    ),
    components(schemas(
        ErrorResponse,
        HealthStatus,
        Actor,
        ActorCreateRequest,
        ActorPatch,
        ActorListResponse,
        ActorResponse,
        Movie,
        MovieCreateRequest,
        MoviePatchRequest,
        MovieListResponse,
        MovieResponse,
        DeleteResponse
    )),
    tags(
        (name = "system", description = "Health"),
        (name = "actors", description = "Actor management"),
        (name = "movies", description = "Movie management")
    )
)]
pub struct ApiDoc;
