//! In-memory implementation of the casting store.
//!
//! # Purpose
//! Keeps actors and movies in `BTreeMap`s guarded by `tokio::sync::RwLock` for
//! local development, tests, and deployments that do not need durability.
//!
//! # Durability and consistency
//! - **Not durable**: all records are lost on process restart.
//! - Writes take the table's write lock, so id assignment and insertion are atomic.
//! - Listing returns records in id order, matching the Postgres backend.
use super::{CastingStore, StoreError, StoreResult};
use crate::model::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        // Ids start at 1 like a Postgres BIGSERIAL.
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn update(&mut self, id: i64, entity: &str, apply: impl FnOnce(&mut T)) -> StoreResult<T> {
        let row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("{entity} {id}")))?;
        apply(row);
        Ok(row.clone())
    }

    fn remove(&mut self, id: i64, entity: &str) -> StoreResult<()> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{entity} {id}")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    actors: Arc<RwLock<Table<Actor>>>,
    movies: Arc<RwLock<Table<Movie>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CastingStore for InMemoryStore {
    async fn list_actors(&self) -> StoreResult<Vec<Actor>> {
        Ok(self.actors.read().await.rows.values().cloned().collect())
    }

    async fn create_actor(&self, actor: NewActor) -> StoreResult<Actor> {
        let mut actors = self.actors.write().await;
        Ok(actors.insert_with(|id| Actor {
            id,
            name: actor.name,
            age: actor.age,
            gender: actor.gender,
        }))
    }

    async fn patch_actor(&self, id: i64, patch: ActorPatch) -> StoreResult<Actor> {
        let mut actors = self.actors.write().await;
        actors.update(id, "actor", |actor| patch.apply(actor))
    }

    async fn delete_actor(&self, id: i64) -> StoreResult<()> {
        self.actors.write().await.remove(id, "actor")
    }

    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.movies.read().await.rows.values().cloned().collect())
    }

    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        let mut movies = self.movies.write().await;
        Ok(movies.insert_with(|id| Movie {
            id,
            title: movie.title,
            release_date: movie.release_date,
        }))
    }

    async fn patch_movie(&self, id: i64, patch: MoviePatch) -> StoreResult<Movie> {
        let mut movies = self.movies.write().await;
        movies.update(id, "movie", |movie| patch.apply(movie))
    }

    async fn delete_movie(&self, id: i64) -> StoreResult<()> {
        self.movies.write().await.remove(id, "movie")
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
