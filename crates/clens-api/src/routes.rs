//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::analyze::analyze_frame;
use crate::handlers::charts::{age_breakdown_today, flow_today};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Ingestion route
    let ingest_routes = Router::new().route("/analyze", post(analyze_frame));

    // Dashboard chart routes
    let chart_routes = Router::new()
        .route("/flow/today/:gender", get(flow_today))
        .route("/age-breakdown/today/:gender/:bracket", get(age_breakdown_today));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(ingest_routes)
        .merge(chart_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Frames arrive base64-encoded in the body; cap it
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
