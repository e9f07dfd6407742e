//! Postgres-backed implementation of the casting store.
//!
//! # Key invariants
//! - `actors` and `movies` are the authoritative tables; ids come from `BIGSERIAL`.
//! - Patches read and write the row inside one transaction so concurrent
//!   patches to different fields do not lose each other's writes.
//!
//! # Operational notes
//! - Migrations run at startup via `sqlx::migrate!("./migrations")` so handlers
//!   can assume the schema exists.
//! - Pool size and acquire/connect timeouts are explicit; a stalled database
//!   fails requests instead of hanging them.
//! - Database URLs may contain credentials; they are never logged.
use super::{CastingStore, StoreError, StoreResult};
use crate::config::PostgresConfig;
use crate::model::{Actor, ActorPatch, Movie, MoviePatch, NewActor, NewMovie};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use std::time::Duration;

pub struct PostgresStore {
    pool: PgPool,
}

#[derive(Debug, Clone, FromRow)]
struct DbActor {
    id: i64,
    name: String,
    age: i32,
    gender: String,
}

impl From<DbActor> for Actor {
    fn from(row: DbActor) -> Self {
        Actor {
            id: row.id,
            name: row.name,
            age: row.age,
            gender: row.gender,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct DbMovie {
    id: i64,
    title: String,
    release_date: NaiveDate,
}

impl From<DbMovie> for Movie {
    fn from(row: DbMovie) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            release_date: row.release_date,
        }
    }
}

impl PostgresStore {
    /// Connect, run migrations, and return a ready store.
    ///
    /// # Errors
    /// - Invalid URL, connection failure, or migration failure.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options);
        let pool = tokio::time::timeout(Duration::from_millis(pg.connect_timeout_ms), pool)
            .await
            .map_err(|_| StoreError::Unexpected(anyhow::anyhow!("postgres connect timed out")))??;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(
            max_connections = pg.max_connections,
            "postgres store connected"
        );
        Ok(Self { pool })
    }
}

#[async_trait]
impl CastingStore for PostgresStore {
    async fn list_actors(&self) -> StoreResult<Vec<Actor>> {
        let rows =
            sqlx::query_as::<_, DbActor>("SELECT id, name, age, gender FROM actors ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Actor::from).collect())
    }

    async fn create_actor(&self, actor: NewActor) -> StoreResult<Actor> {
        let row = sqlx::query_as::<_, DbActor>(
            r#"INSERT INTO actors (name, age, gender) VALUES ($1, $2, $3)
               RETURNING id, name, age, gender"#,
        )
        .bind(&actor.name)
        .bind(actor.age)
        .bind(&actor.gender)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn patch_actor(&self, id: i64, patch: ActorPatch) -> StoreResult<Actor> {
        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query_as::<_, DbActor>(
            "SELECT id, name, age, gender FROM actors WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("actor {id}")))?;

        let mut actor = Actor::from(existing);
        patch.apply(&mut actor);
        sqlx::query("UPDATE actors SET name = $2, age = $3, gender = $4 WHERE id = $1")
            .bind(actor.id)
            .bind(&actor.name)
            .bind(actor.age)
            .bind(&actor.gender)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(actor)
    }

    async fn delete_actor(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("actor {id}")));
        }
        Ok(())
    }

    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        let rows =
            sqlx::query_as::<_, DbMovie>("SELECT id, title, release_date FROM movies ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        let row = sqlx::query_as::<_, DbMovie>(
            r#"INSERT INTO movies (title, release_date) VALUES ($1, $2)
               RETURNING id, title, release_date"#,
        )
        .bind(&movie.title)
        .bind(movie.release_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn patch_movie(&self, id: i64, patch: MoviePatch) -> StoreResult<Movie> {
        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query_as::<_, DbMovie>(
            "SELECT id, title, release_date FROM movies WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("movie {id}")))?;

        let mut movie = Movie::from(existing);
        patch.apply(&mut movie);
        sqlx::query("UPDATE movies SET title = $2, release_date = $3 WHERE id = $1")
            .bind(movie.id)
            .bind(&movie.title)
            .bind(movie.release_date)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(movie)
    }

    async fn delete_movie(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("movie {id}")));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
