//! Shared data models for the HerdGuard backend.
//!
//! This crate provides Serde-serializable types for:
//! - Pixel-space detection rectangles and clamping
//! - Disease classification results and the fixed decision rule
//! - Upload media kinds and processed-artifact naming
//! - Per-file upload reports returned by the API

pub mod classification;
pub mod media_kind;
pub mod rect;
pub mod report;

// Re-export common types
pub use classification::{Classification, HealthLabel, CLASSIFIER_THRESHOLD};
pub use media_kind::{is_allowed_filename, processed_artifact_name, MediaKind, ALLOWED_EXTENSIONS};
pub use rect::{Detection, PixelRect};
pub use report::{PredictResponse, UploadRejection, UploadResult};
