//! Casting API service entry point.
//!
//! # Purpose
//! Wires configuration, storage and the authorization gate into the HTTP
//! router, then serves the API and the metrics endpoint until shutdown.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
use anyhow::Context;
use casting_api::app::{AppState, build_router};
use casting_api::config::{self, ApiConfig};
use casting_api::store::CastingStore;
use casting_api::store::memory::InMemoryStore;
use casting_api::store::postgres::PostgresStore;
use casting_api::{auth, observability};
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env_or_yaml().context("casting api config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: ApiConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("casting-api")?;
    let state = build_state(config.clone()).await?;
    tracing::info!(backend = state.store.backend_name(), "casting storage ready");
    let metrics_bind = config.metrics_bind;
    let metrics_task = tokio::spawn(async move {
        if let Err(err) = observability::serve_metrics(metrics_handle, metrics_bind).await {
            tracing::warn!(error = %err, %metrics_bind, "metrics listener stopped");
        }
    });

    let app = build_router(state);

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "casting api listening");
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: ApiConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn CastingStore> = match config.storage {
        config::StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        config::StorageBackend::Postgres => {
            let pg = config
                .postgres
                .as_ref()
                .context("postgres configuration missing")?;
            Arc::new(PostgresStore::connect(pg).await?)
        }
    };
    let gate = auth::build_gate(&config.auth)?;
    Ok(AppState::new(store, gate))
}
