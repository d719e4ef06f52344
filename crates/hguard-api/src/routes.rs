//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::pages;
use crate::handlers::{health, predict, ready, serve_processed};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let page_routes = Router::new()
        .route("/", get(pages::index))
        .route("/about", get(pages::about))
        .route("/doctorlogin", get(pages::doctor_login))
        .route("/doctordashboard", get(pages::doctor_dashboard))
        .route("/farmerlogin", get(pages::farmer_login))
        .route("/farmerdashboard", get(pages::farmer_dashboard))
        .route("/farmerregister", get(pages::farmer_register));

    // Inference is expensive, the upload endpoint gets its own limiter
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));
    let predict_routes = Router::new()
        .route("/predict", post(predict))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let artifact_routes =
        Router::new().route("/assets/processed/:filename", get(serve_processed));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(page_routes)
        .merge(predict_routes)
        .merge(artifact_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // The axum extractor default (2 MB) would otherwise cap multipart reads
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
