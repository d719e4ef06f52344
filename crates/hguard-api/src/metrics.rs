//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

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
    pub const HTTP_REQUESTS_TOTAL: &str = "hguard_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "hguard_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "hguard_http_requests_in_flight";

    // Upload pipeline metrics
    pub const UPLOADS_TOTAL: &str = "hguard_uploads_total";
    pub const UPLOAD_PROCESSING_DURATION_SECONDS: &str =
        "hguard_upload_processing_duration_seconds";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "hguard_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record one processed upload with its outcome status.
pub fn record_upload(kind: &str, status: &str) {
    let labels = [
        ("kind", kind.to_string()),
        ("status", status.to_string()),
    ];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
}

/// Record pipeline processing duration for one file.
pub fn record_processing_duration(kind: &str, duration_secs: f64) {
    let labels = [("kind", kind.to_string())];
    histogram!(names::UPLOAD_PROCESSING_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels so artifact names do not explode label
/// cardinality.
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(r"/processed/[a-zA-Z0-9_.-]+")
        .unwrap()
        .replace_all(path, "/processed/:artifact");
    path.to_string()
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
