use chrono::Local;

/// Extensions accepted by the upload endpoint, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "mp4", "mov"];

/// Whether an uploaded file dispatches to the image or the video path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a filename by its extension, case-insensitively.
    ///
    /// Returns `None` for filenames without an allowed extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" => Some(MediaKind::Image),
            "mp4" | "mov" => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Extension of the processed artifact for this kind. Videos are always
    /// re-encoded to mp4 regardless of the source container.
    pub fn output_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// True when the filename carries one of the allowed extensions.
pub fn is_allowed_filename(filename: &str) -> bool {
    MediaKind::from_filename(filename).is_some()
}

/// Produce a timestamped artifact name: `processed_<YYYYMMDDHHMMSSffffff>.<ext>`.
///
/// Uniqueness rests on the microsecond clock alone; two requests landing in
/// the same microsecond would collide. Accepted for now, the naming format is
/// part of the public URL surface.
pub fn processed_artifact_name(kind: MediaKind) -> String {
    let timestamp = Local::now().format("%Y%m%d%H%M%S%6f");
    format!("processed_{}.{}", timestamp, kind.output_extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_images_and_videos() {
        assert_eq!(MediaKind::from_filename("cow.jpg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_filename("cow.jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_filename("cow.png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_filename("herd.mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_filename("herd.mov"), Some(MediaKind::Video));
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(MediaKind::from_filename("COW.JPG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_filename("Herd.MoV"), Some(MediaKind::Video));
    }

    #[test]
    fn rejects_disallowed_and_missing_extensions() {
        assert_eq!(MediaKind::from_filename("notes.txt"), None);
        assert_eq!(MediaKind::from_filename("archive.tar.gz"), None);
        assert_eq!(MediaKind::from_filename("noextension"), None);
        assert!(!is_allowed_filename("report.pdf"));
        assert!(is_allowed_filename("a.b.png"));
    }

    #[test]
    fn artifact_name_has_expected_shape() {
        let name = processed_artifact_name(MediaKind::Image);
        assert!(name.starts_with("processed_"));
        assert!(name.ends_with(".jpg"));
        // processed_ + 20 timestamp digits + .jpg
        assert_eq!(name.len(), "processed_".len() + 20 + ".jpg".len());
        assert!(name["processed_".len()..name.len() - 4]
            .chars()
            .all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn video_artifacts_are_always_mp4() {
        let name = processed_artifact_name(MediaKind::Video);
        assert!(name.ends_with(".mp4"));
    }
}
