//! Crop/resize normalization to the classifier's fixed input shape.

use image::{imageops, DynamicImage, RgbImage};

use hguard_models::PixelRect;

use crate::error::{MediaError, MediaResult};

/// The classifier expects square crops of this edge length.
pub const CLASSIFIER_INPUT_SIZE: u32 = 224;

/// A 224x224 RGB crop with channel values scaled to [0, 1], laid out NHWC.
#[derive(Debug, Clone)]
pub struct NormalizedCrop {
    data: Vec<f32>,
}

impl NormalizedCrop {
    /// Flat pixel data, length 224 * 224 * 3, row-major HWC.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Tensor shape for a batch of one: [1, 224, 224, 3].
    pub fn tensor_shape() -> Vec<usize> {
        let s = CLASSIFIER_INPUT_SIZE as usize;
        vec![1, s, s, 3]
    }
}

/// Extract the region bounded by `rect` and normalize it for classification.
///
/// The rect must be non-degenerate and lie within the frame; callers are
/// expected to clamp first, so an out-of-bounds rect here is an internal
/// error rather than a skippable outcome.
pub fn normalize_crop(frame: &RgbImage, rect: &PixelRect) -> MediaResult<NormalizedCrop> {
    let (frame_w, frame_h) = frame.dimensions();

    // Truncate to integer pixel coordinates, the same rounding the detector
    // boxes get before cropping.
    let x1 = rect.x1 as u32;
    let y1 = rect.y1 as u32;
    let x2 = rect.x2 as u32;
    let y2 = rect.y2 as u32;

    if x1 >= x2 || y1 >= y2 {
        return Err(MediaError::internal(format!(
            "Degenerate crop rect ({},{})-({},{})",
            x1, y1, x2, y2
        )));
    }
    if x2 > frame_w || y2 > frame_h {
        return Err(MediaError::internal(format!(
            "Crop rect ({},{})-({},{}) exceeds frame {}x{}",
            x1, y1, x2, y2, frame_w, frame_h
        )));
    }

    let crop = imageops::crop_imm(frame, x1, y1, x2 - x1, y2 - y1).to_image();
    let resized = DynamicImage::ImageRgb8(crop)
        .resize_exact(
            CLASSIFIER_INPUT_SIZE,
            CLASSIFIER_INPUT_SIZE,
            imageops::FilterType::Triangle,
        )
        .to_rgb8();

    let data: Vec<f32> = resized.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
    Ok(NormalizedCrop { data })
}
