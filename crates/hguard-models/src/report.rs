use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-file outcome of an upload batch. Exactly one of these is produced for
/// every file submitted, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UploadResult {
    pub filename: String,
    pub status: String,
    /// URL of the annotated artifact, or null when processing did not produce one.
    pub processed_file: Option<String>,
}

impl UploadResult {
    /// A multipart part arrived with an empty filename.
    pub fn no_file_selected() -> Self {
        Self {
            filename: "empty".to_string(),
            status: "No file selected".to_string(),
            processed_file: None,
        }
    }

    /// The extension is not in the allowed set; no model was invoked.
    pub fn invalid_file_type(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: "Invalid file type".to_string(),
            processed_file: None,
        }
    }

    /// Processing completed and produced an artifact.
    pub fn analysed(filename: impl Into<String>, processed_url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: "Successfully Analysed".to_string(),
            processed_file: Some(processed_url.into()),
        }
    }

    /// The pipeline ran but produced no artifact.
    pub fn processing_failed(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: "Processing failed".to_string(),
            processed_file: None,
        }
    }

    /// An unexpected error surfaced while handling this file.
    pub fn errored(filename: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            filename: filename.into(),
            status: format!("Error: {}", error),
            processed_file: None,
        }
    }
}

/// Body of a successful `/predict` response (HTTP 200, even when individual
/// files failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PredictResponse {
    pub results: Vec<UploadResult>,
}

/// Body of the HTTP 400 response when the `files` field is entirely absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UploadRejection {
    pub error: String,
    pub results: Vec<UploadResult>,
}

impl UploadRejection {
    pub fn no_file_uploaded() -> Self {
        Self {
            error: "No file uploaded".to_string(),
            results: Vec::new(),
        }
    }
}
