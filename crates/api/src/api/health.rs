//! Liveness, readiness and Prometheus scrape endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::storage::DomainStore;

#[derive(Clone)]
pub struct AppState {
    pub domain_store: Arc<dyn DomainStore>,
}

impl AppState {
    pub fn new(domain_store: Arc<dyn DomainStore>) -> Self {
        Self { domain_store }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    datastore: &'static str,
}

pub async fn ready(State(state): State<AppState>) -> Response {
    match state.domain_store.list_dead_letter_entries(None).await {
        Ok(_) => Json(ReadyResponse { status: "ready", datastore: "ok" }).into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse { status: "not_ready", datastore: "unreachable" }),
        )
            .into_response(),
    }
}

pub async fn metrics() -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        "# fulfillment orchestrator metrics are exported via OTLP; this endpoint is a scrape placeholder\n",
    )
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .with_state(state)
}
