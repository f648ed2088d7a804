//! Fulfillment orchestrator HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use wms_api::api;
use wms_api::config::AppConfig;
use wms_api::middleware::{idempotency_middleware, IdempotencyState};
use wms_api::openapi::ApiDoc;
use wms_api::services::{DeadLetterService, OrderIntakeService, SignalBridgeService};
use wms_api::storage::{DomainStore, OrchestratorStore, PostgresDomainStore};
use wms_api::telemetry::{init_telemetry, TelemetryConfig};
use wms_durable::WorkflowExecutor;
use wms_reprocessing::postgres::PostgresReprocessingStore;
use wms_reprocessing::prelude::ReprocessingStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("loading configuration")?;

    let mut telemetry_config = TelemetryConfig::from_env();
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    let _telemetry_guard = init_telemetry(telemetry_config);

    tracing::info!("fulfillment orchestrator starting");

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("connecting to database")?;
    tracing::info!("connected to database");

    let domain_store: Arc<dyn DomainStore> = Arc::new(PostgresDomainStore::new(pool.clone()));
    let orchestrator_store = OrchestratorStore::postgres(pool.clone());

    let mut executor = WorkflowExecutor::new(orchestrator_store);
    wms_workflows::register_all(&mut executor);
    let executor = Arc::new(executor);

    let reprocessing_store: Arc<dyn ReprocessingStore> = Arc::new(PostgresReprocessingStore::new(pool.clone()));

    let order_intake = Arc::new(OrderIntakeService::new(domain_store.clone(), executor.clone()));
    let signal_bridge = Arc::new(SignalBridgeService::new(domain_store.clone(), executor.clone()));
    let dead_letters = Arc::new(DeadLetterService::new(domain_store.clone(), reprocessing_store, executor.clone()));

    let idempotency_state = IdempotencyState {
        store: domain_store.clone(),
        require_key: config.idempotency_require_key,
        service_name: "wms-api",
    };

    let orders_routes = api::orders::routes(api::orders::AppState::new(order_intake))
        .layer(axum::middleware::from_fn_with_state(idempotency_state.clone(), idempotency_middleware));
    let signals_routes = api::signals::routes(api::signals::AppState::new(signal_bridge))
        .layer(axum::middleware::from_fn_with_state(idempotency_state.clone(), idempotency_middleware));
    let dead_letters_routes = api::dead_letters::routes(api::dead_letters::AppState::new(dead_letters))
        .layer(axum::middleware::from_fn_with_state(idempotency_state, idempotency_middleware));
    let health_routes = api::health::routes(api::health::AppState::new(domain_store));

    let api_routes = Router::new()
        .merge(orders_routes)
        .merge(signals_routes)
        .merge(dead_letters_routes);

    let mut app = Router::new().merge(health_routes);
    app = app.merge(build_router_with_prefix(api_routes, &config.api_prefix));

    let app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    let cors_origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::HeaderName::from_static("idempotency-key"),
                    header::HeaderName::from_static("x-wms-tenant-id"),
                    header::HeaderName::from_static("x-wms-facility-id"),
                    header::HeaderName::from_static("x-wms-warehouse-id"),
                    header::HeaderName::from_static("x-wms-seller-id"),
                    header::HeaderName::from_static("x-wms-channel-id"),
                    header::HeaderName::from_static("x-wms-correlation-id"),
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    let app = app.layer(TraceLayer::new_for_http());

    let addr = "0.0.0.0:8080";
    let listener = tokio::net::TcpListener::bind(addr).await.context("binding to address")?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(api_routes: Router<S>, api_prefix: &str) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_routes() -> Router {
        Router::new().route("/v1/test", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn test_api_prefix_empty() {
        let app = build_router_with_prefix(test_routes(), "");

        let response = app.oneshot(Request::builder().uri("/v1/test").body(Body::empty()).unwrap()).await.unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_api_prefix_set() {
        let app = build_router_with_prefix(test_routes(), "/api");

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/v1/test").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = app.oneshot(Request::builder().uri("/v1/test").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), 404);
    }
}
