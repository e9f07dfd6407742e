//! Casting API HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, attaches one permission requirement to every
//! resource route, and defines the shared state injected into handlers.
//!
//! # Notes
//! Each resource route is registered per method so its permission layer wraps
//! exactly that handler. Axum merges the method routers that share a path.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth::RequirePermissionLayer;
use crate::observability;
use crate::store::CastingStore;
use axum::Router;
use axum::routing::{delete, get, patch, post};
use casting_authz::{
    AuthorizationGate, DELETE_ACTORS, DELETE_MOVIES, PATCH_ACTORS, PATCH_MOVIES, POST_ACTORS,
    POST_MOVIES, Permission, READ_ACTORS, READ_MOVIES,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CastingStore>,
    pub gate: AuthorizationGate,
}

impl AppState {
    pub fn new(store: Arc<dyn CastingStore>, gate: AuthorizationGate) -> Self {
        Self { store, gate }
    }

    fn require(&self, permission: Permission) -> RequirePermissionLayer {
        RequirePermissionLayer::new(self.gate.clone(), permission)
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route("/health", get(api::system::health))
        .route(
            "/actors",
            get(api::actors::list_actors).route_layer(state.require(READ_ACTORS)),
        )
        .route(
            "/actors",
            post(api::actors::create_actor).route_layer(state.require(POST_ACTORS)),
        )
        .route(
            "/actors/:id",
            patch(api::actors::patch_actor).route_layer(state.require(PATCH_ACTORS)),
        )
        .route(
            "/actors/:id",
            delete(api::actors::delete_actor).route_layer(state.require(DELETE_ACTORS)),
        )
        .route(
            "/movies",
            get(api::movies::list_movies).route_layer(state.require(READ_MOVIES)),
        )
        .route(
            "/movies",
            post(api::movies::create_movie).route_layer(state.require(POST_MOVIES)),
        )
        .route(
            "/movies/:id",
            patch(api::movies::patch_movie).route_layer(state.require(PATCH_MOVIES)),
        )
        .route(
            "/movies/:id",
            delete(api::movies::delete_movie).route_layer(state.require(DELETE_MOVIES)),
        )
        .merge(utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .fallback(api::not_found)
        .layer(axum::middleware::from_fn(api::method_not_allowed_envelope))
        .layer(CorsLayer::permissive())
        .layer(trace_layer)
        .with_state(state)
}
