//! Upload endpoint.
//!
//! Accepts a multipart batch under the `files` field and runs every file
//! through the annotation pipeline. Each file gets exactly one result entry,
//! in submission order; individual failures never abort the batch. The only
//! 400 is the one for a request with no `files` field at all.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};

use hguard_media::MediaError;
use hguard_models::{MediaKind, PredictResponse, UploadRejection, UploadResult};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let mut results: Vec<UploadResult> = Vec::new();
    let mut saw_files_field = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("files") {
            continue;
        }
        saw_files_field = true;

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            results.push(UploadResult::no_file_selected());
            continue;
        }

        let Some(kind) = MediaKind::from_filename(&filename) else {
            info!(filename = %filename, "Rejected upload with disallowed extension");
            results.push(UploadResult::invalid_file_type(&filename));
            continue;
        };

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(filename = %filename, error = %e, "Failed to read upload body");
                results.push(UploadResult::errored(&filename, e));
                continue;
            }
        };

        let start = Instant::now();
        let outcome = state.pipeline.process_upload(kind, &bytes).await;
        metrics::record_processing_duration(kind_label(kind), start.elapsed().as_secs_f64());

        let result = match outcome {
            Ok(artifact) => {
                info!(filename = %filename, artifact = %artifact, "Upload analysed");
                UploadResult::analysed(&filename, format!("/assets/processed/{}", artifact))
            }
            Err(e) => {
                warn!(filename = %filename, error = %e, "Upload processing failed");
                failure_result(&filename, e)
            }
        };
        metrics::record_upload(kind_label(kind), &result.status);
        results.push(result);
    }

    if !saw_files_field {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(UploadRejection::no_file_uploaded()),
        )
            .into_response());
    }

    Ok(Json(PredictResponse { results }).into_response())
}

/// Map a pipeline error to the per-file report entry.
///
/// Failures of the media itself report "Processing failed"; environmental
/// failures (FFmpeg missing, IO) surface their message in an "Error: " status.
fn failure_result(filename: &str, error: MediaError) -> UploadResult {
    match error {
        MediaError::ImageDecode(_)
        | MediaError::InvalidVideo(_)
        | MediaError::DetectionFailed(_)
        | MediaError::ClassificationFailed(_)
        | MediaError::Internal(_) => UploadResult::processing_failed(filename),
        other => UploadResult::errored(filename, other),
    }
}

fn kind_label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
    }
}
