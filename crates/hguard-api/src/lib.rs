//! Axum HTTP server for the cattle screening service.
//!
//! This crate provides:
//! - Multipart upload endpoint running the detection/classification pipeline
//! - Annotated artifact serving
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
