//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

use clens_models::Gender;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "clens_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "clens_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "clens_http_requests_in_flight";

    // Ingestion pipeline metrics
    pub const DETECTIONS_SKIPPED_TOTAL: &str = "clens_detections_skipped_total";
    pub const FACES_CLASSIFIED_TOTAL: &str = "clens_faces_classified_total";
    pub const BUCKET_WRITES_TOTAL: &str = "clens_bucket_writes_total";
    pub const DEDUP_HITS_TOTAL: &str = "clens_dedup_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a detection skipped before it produced a counter update.
pub fn record_detection_skipped(reason: &'static str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::DETECTIONS_SKIPPED_TOTAL, &labels).increment(1);
}

/// Record a successfully classified face.
pub fn record_face_classified(gender: Gender) {
    let labels = [("gender", gender.as_str().to_string())];
    counter!(names::FACES_CLASSIFIED_TOTAL, &labels).increment(1);
}

/// Record one aggregation bucket write.
pub fn record_bucket_write() {
    counter!(names::BUCKET_WRITES_TOTAL).increment(1);
}

/// Record a tracker suppressed by the dedup cache.
pub fn record_dedup_hit() {
    counter!(names::DEDUP_HITS_TOTAL).increment(1);
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
