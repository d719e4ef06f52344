//! In-place frame annotation.
//!
//! For every detection: clamp to the frame, skip degenerate boxes, normalize
//! the crop, classify it, and draw a 2px rectangle with a text label. Green
//! means healthy, red means lumpy skin disease.

use std::sync::Arc;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::debug;

use hguard_models::{Classification, HealthLabel};

use crate::classify::DiseaseClassifier;
use crate::crop::normalize_crop;
use crate::detect::CattleDetector;
use crate::error::MediaResult;

const BOX_THICKNESS: i32 = 2;
const LABEL_SCALE: f32 = 16.0;
/// Label sits this far above the box top edge.
const LABEL_OFFSET: i32 = 24;
/// Floor for the label position when the box touches the top of the frame.
const LABEL_MIN_Y: i32 = 10;

const HEALTHY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const DISEASED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Draws classified detections onto frames.
///
/// Holds the process-wide inference handles; cheap to clone into the pipeline.
#[derive(Clone)]
pub struct FrameAnnotator {
    detector: Arc<dyn CattleDetector>,
    classifier: Arc<dyn DiseaseClassifier>,
    font: FontArc,
}

impl FrameAnnotator {
    pub fn new(
        detector: Arc<dyn CattleDetector>,
        classifier: Arc<dyn DiseaseClassifier>,
        font: FontArc,
    ) -> Self {
        Self {
            detector,
            classifier,
            font,
        }
    }

    /// Detect, classify and draw onto the frame in place.
    ///
    /// Returns the number of boxes drawn. Degenerate post-clamp rectangles
    /// are skipped without classification.
    pub fn annotate(&self, frame: &mut RgbImage) -> MediaResult<usize> {
        let (width, height) = frame.dimensions();
        let detections = self.detector.detect(frame)?;

        let mut drawn = 0;
        for detection in &detections {
            let rect = detection.rect.clamp_to(width, height);
            if rect.is_degenerate() {
                debug!(rect = ?detection.rect, "Skipping degenerate detection");
                continue;
            }

            let crop = normalize_crop(frame, &rect)?;
            let p = self.classifier.classify(&crop)?;
            let classification = Classification::from_probability(p);

            self.draw_box(frame, &rect, &classification);
            drawn += 1;
        }

        Ok(drawn)
    }

    fn draw_box(&self, frame: &mut RgbImage, rect: &hguard_models::PixelRect, c: &Classification) {
        let color = match c.label {
            HealthLabel::Healthy => HEALTHY_COLOR,
            HealthLabel::LumpySkinDisease => DISEASED_COLOR,
        };

        let x = rect.x1 as i32;
        let y = rect.y1 as i32;
        let w = (rect.width() as u32).max(1);
        let h = (rect.height() as u32).max(1);

        for t in 0..BOX_THICKNESS {
            let inner_w = w.saturating_sub(2 * t as u32);
            let inner_h = h.saturating_sub(2 * t as u32);
            if inner_w == 0 || inner_h == 0 {
                break;
            }
            draw_hollow_rect_mut(
                frame,
                Rect::at(x + t, y + t).of_size(inner_w, inner_h),
                color,
            );
        }

        let text_y = (y - LABEL_OFFSET).max(LABEL_MIN_Y);
        draw_text_mut(
            frame,
            color,
            x,
            text_y,
            PxScale::from(LABEL_SCALE),
            &self.font,
            &c.annotation_text(),
        );
    }
}
