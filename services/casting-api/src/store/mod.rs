//! Persistence for actors and movies.
//!
//! # Key invariants
//! - Ids are assigned by the backend and never reused within a backend's lifetime.
//! - Patch and delete of an unknown id return [`StoreError::NotFound`].
//! - Backend failures surface as [`StoreError::Unexpected`] and never leak to callers verbatim.
use crate::model::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.into())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CastingStore: Send + Sync {
    async fn list_actors(&self) -> StoreResult<Vec<Actor>>;
    async fn create_actor(&self, actor: NewActor) -> StoreResult<Actor>;
    async fn patch_actor(&self, id: i64, patch: ActorPatch) -> StoreResult<Actor>;
    async fn delete_actor(&self, id: i64) -> StoreResult<()>;

    async fn list_movies(&self) -> StoreResult<Vec<Movie>>;
    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie>;
    async fn patch_movie(&self, id: i64, patch: MoviePatch) -> StoreResult<Movie>;
    async fn delete_movie(&self, id: i64) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
