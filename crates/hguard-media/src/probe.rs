//! FFprobe video information and encoder-constraint arithmetic.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Video file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels, as declared by the container
    pub width: u32,
    /// Height in pixels, as declared by the container
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
}

impl VideoInfo {
    /// Dimensions truncated to even values, as required by the H.264 encoder.
    pub fn encoder_dimensions(&self) -> (u32, u32) {
        (self.width & !1, self.height & !1)
    }

    /// Integer frame rate floored to a minimum of 1.
    pub fn encoder_fps(&self) -> u32 {
        (self.fps as u32).max(1)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a video file for information.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .or(video_stream.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(30.0);

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("n/a").is_none());
    }

    #[test]
    fn encoder_dimensions_are_truncated_to_even() {
        let info = VideoInfo {
            duration: 1.0,
            width: 1921,
            height: 1081,
            fps: 30.0,
        };
        assert_eq!(info.encoder_dimensions(), (1920, 1080));

        let even = VideoInfo {
            duration: 1.0,
            width: 1280,
            height: 720,
            fps: 30.0,
        };
        assert_eq!(even.encoder_dimensions(), (1280, 720));
    }

    #[test]
    fn encoder_fps_is_floored_to_one() {
        let slow = VideoInfo {
            duration: 1.0,
            width: 640,
            height: 480,
            fps: 0.4,
        };
        assert_eq!(slow.encoder_fps(), 1);

        let ntsc = VideoInfo {
            duration: 1.0,
            width: 640,
            height: 480,
            fps: 29.97,
        };
        // Integer truncation, matching the declared-rate handling
        assert_eq!(ntsc.encoder_fps(), 29);
    }
}
