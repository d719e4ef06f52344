//! Annotated artifact serving.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Serve a processed artifact from the output directory.
pub async fn serve_processed(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    // Keep lookups inside the processed directory
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ApiError::bad_request("Invalid artifact name"));
    }

    let path = state.pipeline.processed_dir().join(&filename);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::not_found("Artifact not found")
        } else {
            ApiError::internal(format!("Failed to read artifact: {}", e))
        }
    })?;

    let content_type = content_type_for(&filename);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}

fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    if lower.ends_with(".mp4") {
        "video/mp4"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for("processed_1.mp4"), "video/mp4");
        assert_eq!(content_type_for("processed_1.JPG"), "image/jpeg");
        assert_eq!(content_type_for("weird.bin"), "application/octet-stream");
    }
}
