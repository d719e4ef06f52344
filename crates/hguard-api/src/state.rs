//! Application state.

use std::sync::Arc;

use tracing::info;

use hguard_media::{
    load_label_font, DetectorConfig, FrameAnnotator, MediaPipeline, OnnxCattleDetector,
    OnnxDiseaseClassifier,
};

use crate::config::ApiConfig;

/// Shared application state.
///
/// The inference handles live inside the pipeline and are loaded exactly once
/// at startup; serving never begins with a missing model or font.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: MediaPipeline,
}

impl AppState {
    /// Create new application state, loading models and fonts from disk.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&config.processed_dir)?;

        let detector = OnnxCattleDetector::new(DetectorConfig {
            model_path: config.detector_model_path.clone(),
            ..DetectorConfig::default()
        })?;
        let classifier = OnnxDiseaseClassifier::new(&config.classifier_model_path)?;
        let font = load_label_font()?;

        let annotator = FrameAnnotator::new(Arc::new(detector), Arc::new(classifier), font);
        let pipeline = MediaPipeline::new(annotator, &config.processed_dir);

        info!(
            processed_dir = %config.processed_dir,
            "Application state initialized"
        );

        Ok(Self { config, pipeline })
    }

    /// Build state around an already-constructed pipeline. Used by tests to
    /// inject stub inference handles.
    pub fn with_pipeline(config: ApiConfig, pipeline: MediaPipeline) -> Self {
        Self { config, pipeline }
    }
}
