//! Cattle detection using a YOLO-style ONNX model.
//!
//! The pretrained detector is treated as an opaque artifact: this adapter
//! converts a frame into a list of pixel-space rectangles, applying the usual
//! YOLO postprocessing (score threshold + NMS) to the raw model output.
//! Downstream code classifies every returned detection and never consults
//! the confidence again.

use std::path::Path;
use std::sync::Mutex;

use image::{DynamicImage, RgbImage};
use ndarray::Array;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use hguard_models::{Detection, PixelRect};

use crate::error::{MediaError, MediaResult};

/// Configuration for the cattle detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Score threshold applied inside the adapter
    pub confidence_threshold: f32,
    /// IoU threshold for NMS
    pub nms_threshold: f32,
    /// Input image size (model expects square input)
    pub input_size: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "models/cattle_detector.onnx".to_string(),
            confidence_threshold: 0.25,
            nms_threshold: 0.45,
            input_size: 640,
        }
    }
}

/// Locates cattle in a frame as axis-aligned rectangles.
///
/// Implementations must be shareable across requests; the loaded model is a
/// process-wide read-only inference handle.
pub trait CattleDetector: Send + Sync {
    /// Detect cattle in an RGB frame. Rectangles are in frame pixel
    /// coordinates and may extend past the frame edges; callers clamp.
    fn detect(&self, frame: &RgbImage) -> MediaResult<Vec<Detection>>;
}

/// Cattle detector backed by ONNX Runtime.
pub struct OnnxCattleDetector {
    session: Mutex<Session>,
    config: DetectorConfig,
}

impl OnnxCattleDetector {
    /// Load the detector model. Fails if the model file is missing or invalid.
    pub fn new(config: DetectorConfig) -> MediaResult<Self> {
        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(MediaError::model_not_found(&config.model_path));
        }

        let session = Mutex::new(create_session(model_path)?);
        info!(
            model_path = %config.model_path,
            input_size = config.input_size,
            "Cattle detector initialized"
        );

        Ok(Self { session, config })
    }

    /// Preprocess frame for inference: resize to the square input size,
    /// normalize to [0, 1], convert HWC to NCHW.
    fn preprocess(&self, frame: &RgbImage) -> MediaResult<Value> {
        let input_size = self.config.input_size;

        let resized = DynamicImage::ImageRgb8(frame.clone())
            .resize_exact(input_size, input_size, image::imageops::FilterType::Triangle)
            .to_rgb8();

        let (w, h) = (input_size as usize, input_size as usize);
        let mut chw_data: Vec<f32> = Vec::with_capacity(3 * h * w);
        for c in 0..3 {
            for y in 0..h {
                for x in 0..w {
                    let pixel = resized.get_pixel(x as u32, y as u32);
                    chw_data.push(pixel[c] as f32 / 255.0);
                }
            }
        }

        let shape = vec![1usize, 3, h, w];
        Tensor::from_array((shape, chw_data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| MediaError::detection_failed(format!("Failed to create tensor: {}", e)))
    }

    /// Run ONNX inference, returning the output shape and flat data.
    fn run_inference(&self, input: Value) -> MediaResult<(Vec<usize>, Vec<f32>)> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::detection_failed("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| MediaError::detection_failed(format!("ONNX inference failed: {}", e)))?;

        let output = outputs
            .get("output0")
            .ok_or_else(|| MediaError::detection_failed("Missing output0 tensor"))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::detection_failed(format!("Failed to extract tensor: {}", e)))?;

        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        Ok((dims, data.to_vec()))
    }

    /// Postprocess YOLO output into pixel-space detections.
    ///
    /// Output layout is [1, 4 + num_classes, num_boxes]: a center-format bbox
    /// followed by per-class scores. The cattle model carries a single class,
    /// but the parse tolerates any class count and takes the best score.
    fn postprocess(
        &self,
        dims: &[usize],
        data: &[f32],
        orig_width: u32,
        orig_height: u32,
    ) -> MediaResult<Vec<Detection>> {
        let (num_features, num_boxes) = match dims {
            [1, f, n] if *f >= 5 => (*f, *n),
            _ => {
                return Err(MediaError::detection_failed(format!(
                    "Unexpected detector output shape: {:?}",
                    dims
                )))
            }
        };
        if data.len() != num_features * num_boxes {
            return Err(MediaError::detection_failed(format!(
                "Detector output size mismatch: expected {}, got {}",
                num_features * num_boxes,
                data.len()
            )));
        }

        let output = Array::from_shape_vec((num_features, num_boxes), data.to_vec())
            .map_err(|e| MediaError::detection_failed(format!("Failed to reshape output: {}", e)))?;
        let boxes = output.t();

        let input_size = self.config.input_size as f32;
        let scale_w = orig_width as f32 / input_size;
        let scale_h = orig_height as f32 / input_size;

        let mut candidates: Vec<Detection> = Vec::new();
        for i in 0..num_boxes {
            let score = (4..num_features)
                .map(|c| boxes[[i, c]])
                .fold(0.0f32, f32::max);
            if score < self.config.confidence_threshold {
                continue;
            }

            // Center format to corners, scaled back to the original frame
            let cx = boxes[[i, 0]];
            let cy = boxes[[i, 1]];
            let w = boxes[[i, 2]];
            let h = boxes[[i, 3]];

            let rect = PixelRect::new(
                (cx - w / 2.0) * scale_w,
                (cy - h / 2.0) * scale_h,
                (cx + w / 2.0) * scale_w,
                (cy + h / 2.0) * scale_h,
            );
            candidates.push(Detection::new(rect, score));
        }

        Ok(non_maximum_suppression(candidates, self.config.nms_threshold))
    }

    /// Get the configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl CattleDetector for OnnxCattleDetector {
    fn detect(&self, frame: &RgbImage) -> MediaResult<Vec<Detection>> {
        let (width, height) = frame.dimensions();
        let input = self.preprocess(frame)?;
        let (dims, data) = self.run_inference(input)?;
        let detections = self.postprocess(&dims, &data, width, height)?;

        debug!(count = detections.len(), "Cattle detection completed");
        Ok(detections)
    }
}

/// Remove overlapping detections, keeping the highest-confidence box per
/// overlap group.
fn non_maximum_suppression(mut detections: Vec<Detection>, nms_threshold: f32) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i]);

        for j in (i + 1)..detections.len() {
            if !suppressed[j] && iou(&detections[i].rect, &detections[j].rect) > nms_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Intersection over Union between two rectangles.
fn iou(a: &PixelRect, b: &PixelRect) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.area() + b.area() - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Create an ONNX Runtime session for a model on disk.
pub(crate) fn create_session(model_path: &Path) -> MediaResult<Session> {
    let model_bytes = std::fs::read(model_path)
        .map_err(|e| MediaError::internal(format!("Failed to read model file: {}", e)))?;

    Session::builder()
        .map_err(|e| MediaError::internal(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| MediaError::internal(format!("Failed to set optimization level: {}", e)))?
        .commit_from_memory(&model_bytes)
        .map_err(|e| MediaError::internal(format!("Failed to load ONNX model: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Detection {
        Detection::new(PixelRect::new(x1, y1, x2, y2), confidence)
    }

    #[test]
    fn test_config_default() {
        let config = DetectorConfig::default();
        assert_eq!(config.input_size, 640);
        assert!((config.confidence_threshold - 0.25).abs() < 0.001);
        assert!((config.nms_threshold - 0.45).abs() < 0.001);
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = PixelRect::new(10.0, 10.0, 50.0, 50.0);
        assert!((iou(&a, &a) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = PixelRect::new(0.0, 0.0, 10.0, 10.0);
        let b = PixelRect::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn test_nms_suppresses_overlap() {
        let dets = vec![
            det(0.0, 0.0, 100.0, 100.0, 0.9),
            det(5.0, 5.0, 105.0, 105.0, 0.8),
            det(200.0, 200.0, 300.0, 300.0, 0.7),
        ];
        let kept = non_maximum_suppression(dets, 0.45);
        assert_eq!(kept.len(), 2);
        assert!((kept[0].confidence - 0.9).abs() < 0.001);
        assert!((kept[1].confidence - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_nms_keeps_highest_confidence_first() {
        let dets = vec![
            det(0.0, 0.0, 50.0, 50.0, 0.5),
            det(1.0, 1.0, 51.0, 51.0, 0.95),
        ];
        let kept = non_maximum_suppression(dets, 0.45);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].confidence - 0.95).abs() < 0.001);
    }

    #[test]
    fn missing_model_file_is_an_error() {
        let config = DetectorConfig {
            model_path: "/nonexistent/model.onnx".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            OnnxCattleDetector::new(config),
            Err(MediaError::ModelNotFound(_))
        ));
    }
}
