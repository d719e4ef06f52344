//! Label font loading.
//!
//! The annotator needs a TrueType font to render box labels. Like the model
//! artifacts, the font is loaded once at process start and startup aborts if
//! none can be found.

use ab_glyph::FontArc;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Environment variable overriding the font path.
pub const FONT_PATH_ENV: &str = "HERDGUARD_FONT_PATH";

/// System font paths tried in priority order.
const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// Load the label font from `HERDGUARD_FONT_PATH` or a known system location.
pub fn load_label_font() -> MediaResult<FontArc> {
    if let Ok(path) = std::env::var(FONT_PATH_ENV) {
        return load_font_file(&path);
    }

    for path in FONT_PATHS {
        if std::path::Path::new(path).exists() {
            debug!(path, "Using system label font");
            return load_font_file(path);
        }
    }

    Err(MediaError::FontNotFound(format!(
        "no TrueType font found; set {}",
        FONT_PATH_ENV
    )))
}

fn load_font_file(path: &str) -> MediaResult<FontArc> {
    let bytes = std::fs::read(path)
        .map_err(|e| MediaError::FontNotFound(format!("{}: {}", path, e)))?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| MediaError::FontNotFound(format!("{}: invalid font: {}", path, e)))
}
