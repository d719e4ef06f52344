//! Lumpy-skin-disease classification using a binary ONNX classifier.
//!
//! The classifier takes a normalized 224x224 crop (batch of one) and returns
//! a scalar probability. The Healthy/Diseased decision rule lives in
//! `hguard_models::Classification`, not here.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::info;

use crate::crop::NormalizedCrop;
use crate::detect::create_session;
use crate::error::{MediaError, MediaResult};

/// Scores a normalized crop with a disease probability in [0, 1].
pub trait DiseaseClassifier: Send + Sync {
    fn classify(&self, crop: &NormalizedCrop) -> MediaResult<f32>;
}

/// Disease classifier backed by ONNX Runtime.
pub struct OnnxDiseaseClassifier {
    session: Mutex<Session>,
    /// Name of the model's single output, captured at load time because
    /// Keras-exported graphs do not use a stable output name.
    output_name: String,
}

impl OnnxDiseaseClassifier {
    /// Load the classifier model. Fails if the model file is missing or invalid.
    pub fn new(model_path: impl AsRef<Path>) -> MediaResult<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(MediaError::model_not_found(model_path.display().to_string()));
        }

        let session = create_session(model_path)?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                MediaError::classification_failed("Classifier model declares no outputs")
            })?;

        info!(
            model_path = %model_path.display(),
            output = %output_name,
            "Disease classifier initialized"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl DiseaseClassifier for OnnxDiseaseClassifier {
    fn classify(&self, crop: &NormalizedCrop) -> MediaResult<f32> {
        let input: Value = Tensor::from_array((
            NormalizedCrop::tensor_shape(),
            crop.data().to_vec().into_boxed_slice(),
        ))
        .map(Value::from)
        .map_err(|e| MediaError::classification_failed(format!("Failed to create tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::classification_failed("Session lock poisoned"))?;

        let outputs = session.run(ort::inputs![input]).map_err(|e| {
            MediaError::classification_failed(format!("ONNX inference failed: {}", e))
        })?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            MediaError::classification_failed(format!("Missing output tensor {}", self.output_name))
        })?;

        let (_, data) = output.try_extract_tensor::<f32>().map_err(|e| {
            MediaError::classification_failed(format!("Failed to extract tensor: {}", e))
        })?;

        let p = *data.first().ok_or_else(|| {
            MediaError::classification_failed("Classifier returned an empty tensor")
        })?;

        // Sigmoid head; clamp defends against tiny float excursions only.
        Ok(p.clamp(0.0, 1.0))
    }
}
