//! Upload processing pipeline.
//!
//! Takes raw upload bytes plus the media kind and produces a processed
//! artifact in the output directory. Images are decoded, annotated and saved
//! as JPEG. Videos are decoded with FFmpeg to raw RGB frames, annotated frame
//! by frame and re-encoded to H.264 MP4.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use image::RgbImage;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};
use uuid::Uuid;

use hguard_models::{processed_artifact_name, MediaKind};

use crate::annotate::FrameAnnotator;
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Processes uploads end to end and owns the output directory.
#[derive(Clone)]
pub struct MediaPipeline {
    annotator: FrameAnnotator,
    processed_dir: PathBuf,
}

impl MediaPipeline {
    pub fn new(annotator: FrameAnnotator, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            annotator,
            processed_dir: processed_dir.into(),
        }
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Process an upload and return the artifact filename under the
    /// processed directory.
    pub async fn process_upload(&self, kind: MediaKind, bytes: &[u8]) -> MediaResult<String> {
        let artifact = processed_artifact_name(kind);
        let output_path = self.processed_dir.join(&artifact);

        match kind {
            MediaKind::Image => self.process_image(bytes, &output_path).await?,
            MediaKind::Video => self.process_video(bytes, &output_path).await?,
        }

        Ok(artifact)
    }

    async fn process_image(&self, bytes: &[u8], output_path: &Path) -> MediaResult<()> {
        let mut frame = image::load_from_memory(bytes)?.to_rgb8();

        let drawn = self.annotator.annotate(&mut frame)?;
        debug!(drawn, output = %output_path.display(), "Annotated image");

        frame
            .save(output_path)
            .map_err(MediaError::ImageDecode)?;
        Ok(())
    }

    /// Decode, annotate and re-encode a video.
    ///
    /// The upload is staged to a temp file so FFmpeg can seek the container.
    /// The temp file is removed whether processing succeeds or fails; a
    /// partially written artifact is left in place on failure so it can be
    /// inspected.
    async fn process_video(&self, bytes: &[u8], output_path: &Path) -> MediaResult<()> {
        let temp_path = std::env::temp_dir().join(format!("hguard_{}.bin", Uuid::new_v4()));
        tokio::fs::write(&temp_path, bytes).await?;

        let result = self.annotate_video(&temp_path, output_path).await;

        if let Err(e) = tokio::fs::remove_file(&temp_path).await {
            warn!(path = %temp_path.display(), error = %e, "Failed to remove temp upload");
        }

        result
    }

    async fn annotate_video(&self, input: &Path, output_path: &Path) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let info = probe_video(input).await?;
        let (width, height) = info.encoder_dimensions();
        let fps = info.encoder_fps();
        if width == 0 || height == 0 {
            return Err(MediaError::InvalidVideo(format!(
                "video has unusable dimensions {}x{}",
                info.width, info.height
            )));
        }

        debug!(width, height, fps, input = %input.display(), "Starting video annotation");

        let mut decoder = spawn_decoder(input, width, height)?;
        let mut encoder = spawn_encoder(output_path, width, height, fps)?;

        let stdout = decoder
            .stdout
            .take()
            .ok_or_else(|| MediaError::ffmpeg_failed("decoder stdout not captured", None, None))?;
        let stdin = encoder
            .stdin
            .take()
            .ok_or_else(|| MediaError::ffmpeg_failed("encoder stdin not captured", None, None))?;

        let mut reader = BufReader::new(stdout);
        let mut writer = BufWriter::new(stdin);

        let frame_len = (width * height * 3) as usize;
        let mut buf = vec![0u8; frame_len];
        let mut frames_in = 0u64;
        let mut frames_out = 0u64;

        loop {
            match reader.read_exact(&mut buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(MediaError::Io(e)),
            }
            frames_in += 1;

            let mut frame = RgbImage::from_raw(width, height, buf.clone())
                .ok_or_else(|| MediaError::internal("raw frame buffer size mismatch"))?;

            // A frame that fails inference is dropped, not fatal
            match self.annotator.annotate(&mut frame) {
                Ok(_) => {
                    writer.write_all(frame.as_raw()).await?;
                    frames_out += 1;
                }
                Err(e) => {
                    warn!(frame = frames_in, error = %e, "Skipping frame that failed annotation");
                }
            }
        }

        writer.flush().await?;
        drop(writer);

        wait_for("decoder", &mut decoder).await?;
        wait_for("encoder", &mut encoder).await?;

        info!(
            frames_in,
            frames_out,
            output = %output_path.display(),
            "Finished video annotation"
        );

        Ok(())
    }
}

fn spawn_decoder(input: &Path, width: u32, height: u32) -> MediaResult<Child> {
    Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(input)
        .args([
            "-vf",
            &format!("scale={}:{}", width, height),
            "-pix_fmt",
            "rgb24",
            "-f",
            "rawvideo",
            "-",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| MediaError::ffmpeg_failed(format!("failed to spawn decoder: {}", e), None, None))
}

fn spawn_encoder(output: &Path, width: u32, height: u32, fps: u32) -> MediaResult<Child> {
    Command::new("ffmpeg")
        .args([
            "-y",
            "-v",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", width, height),
            "-r",
            &fps.to_string(),
            "-i",
            "-",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-an",
        ])
        .arg(output)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| MediaError::ffmpeg_failed(format!("failed to spawn encoder: {}", e), None, None))
}

async fn wait_for(label: &str, child: &mut Child) -> MediaResult<()> {
    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(MediaError::ffmpeg_failed(
            format!("{} exited with non-zero status", label),
            None,
            status.code(),
        ))
    }
}
