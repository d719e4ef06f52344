#![deny(unreachable_patterns)]
//! Media-annotation pipeline for HerdGuard.
//!
//! This crate provides:
//! - ONNX Runtime adapters for the cattle detector and the lumpy-skin-disease
//!   classifier (loaded once at startup, shared read-only)
//! - Crop/resize normalization to the classifier's fixed input shape
//! - In-place frame annotation (boxes + labels)
//! - Image and video processing paths; video re-encoding goes through the
//!   FFmpeg CLI over rawvideo pipes

pub mod annotate;
pub mod classify;
pub mod crop;
pub mod detect;
pub mod error;
pub mod font;
pub mod pipeline;
pub mod probe;

pub use annotate::FrameAnnotator;
pub use classify::{DiseaseClassifier, OnnxDiseaseClassifier};
pub use crop::{normalize_crop, NormalizedCrop, CLASSIFIER_INPUT_SIZE};
pub use detect::{CattleDetector, DetectorConfig, OnnxCattleDetector};
pub use error::{MediaError, MediaResult};
pub use font::load_label_font;
pub use pipeline::MediaPipeline;
pub use probe::{probe_video, VideoInfo};
