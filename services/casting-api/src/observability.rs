//! Logging, tracing and metrics for the casting API.
//!
//! # Purpose
//! Installs the tracing subscriber (fmt output filtered by `RUST_LOG`, plus an
//! OTLP span exporter when `OTEL_EXPORTER_OTLP_ENDPOINT` is set), the W3C
//! trace-context propagator, and the Prometheus recorder behind `/metrics`.
//!
//! # Notes
//! Every installer runs at most once per process; later calls reuse the
//! first result so tests can initialize freely.
use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderMap;
use axum::routing::get;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

static SUBSCRIBER: OnceLock<()> = OnceLock::new();
static PROPAGATOR: OnceLock<()> = OnceLock::new();
static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install logging, tracing and the metrics recorder; returns the handle
/// that renders `/metrics`.
pub fn init_observability(service_name: &str) -> Result<PrometheusHandle> {
    install_propagator();
    SUBSCRIBER.get_or_init(|| {
        let otel = otlp_tracer_provider(service_name).map(|provider| {
            let tracer = provider.tracer(service_name.to_string());
            global::set_tracer_provider(provider);
            tracing_opentelemetry::layer().with_tracer(tracer)
        });
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with(tracing_subscriber::fmt::layer())
            .with(otel)
            .try_init();
    });
    metrics_recorder()
}

fn install_propagator() {
    PROPAGATOR.get_or_init(|| global::set_text_map_propagator(TraceContextPropagator::new()));
}

fn otlp_tracer_provider(service_name: &str) -> Option<SdkTracerProvider> {
    std::env::var_os(OTLP_ENDPOINT_ENV)?;
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    let resource = Resource::builder_empty()
        .with_attributes([
            KeyValue::new("service.name", service_name.to_string()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ])
        .build();
    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

fn metrics_recorder() -> Result<PrometheusHandle> {
    if let Some(handle) = RECORDER.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("install prometheus recorder")?;
    Ok(RECORDER.get_or_init(|| handle).clone())
}

/// Parent context carried by the request's `traceparent`/`tracestate` headers.
pub fn trace_context_from_headers(headers: &HeaderMap) -> opentelemetry::Context {
    install_propagator();
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderCarrier(headers)))
}

struct HeaderCarrier<'a>(&'a HeaderMap);

impl Extractor for HeaderCarrier<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.to_str().ok()
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// Serve `/metrics` on its own listener until the task is dropped.
pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, metrics_router(handle).into_make_service()).await
}
