// FFmpeg-backed frame extraction
//
// One ffmpeg invocation per timestamp, input-side seek (fast), PNG written
// into a private temp directory and read back. The directory is removed when
// the batch finishes, whether or not every frame succeeded.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use crate::constants::FRAME_ENCODING;
use crate::error::{Result, ThumbError};
use crate::extract::{png_dimensions, ExtractionRequest, FrameExtractor, FrameQuality, RawFrame};
use crate::metadata::{ffprobe, VideoWindow};

/// Extractor that shells out to ffmpeg/ffprobe.
#[derive(Debug, Clone, Default)]
pub struct FfmpegExtractor;

impl FfmpegExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn metadata(&self, video: &Path) -> Result<VideoWindow> {
        ffprobe::probe(video)
    }

    fn extract_frames(&self, video: &Path, request: &ExtractionRequest) -> Result<Vec<RawFrame>> {
        let temp_dir = tempfile::Builder::new().prefix("thumbpick-").tempdir()?;
        let mut frames = Vec::with_capacity(request.timestamps.len());

        for (index, &timestamp) in request.timestamps.iter().enumerate() {
            match extract_single_frame(video, &temp_dir, index, timestamp, request.quality)? {
                Some(frame) => frames.push(frame),
                None => log::warn!("No frame at {:.3}s in {}, skipping", timestamp, video.display()),
            }
        }

        log::debug!(
            "Extracted {} of {} requested frames from {}",
            frames.len(),
            request.timestamps.len(),
            video.display()
        );

        Ok(frames)
    }
}

/// Extract one frame. `Ok(None)` means this instant was unreachable;
/// `Err` means ffmpeg itself could not be run.
fn extract_single_frame(
    video: &Path,
    temp_dir: &TempDir,
    index: usize,
    timestamp: f64,
    quality: FrameQuality,
) -> Result<Option<RawFrame>> {
    let output_path = temp_dir.path().join(format!("frame_{}.{}", index, FRAME_ENCODING));
    let seek_time = format_duration(timestamp);

    let output = Command::new(crate::tools::ffmpeg_path())
        .args(["-y", "-v", "error", "-ss", &seek_time, "-i"])
        .arg(video)
        .args(["-frames:v", "1", "-q:v", &quality.ffmpeg_q().to_string()])
        .arg(&output_path)
        .output()
        .map_err(|e| ThumbError::FFmpeg(format!("Failed to run ffmpeg: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::warn!("Frame extraction failed at {:.3}s: {}", timestamp, stderr.trim());
        return Ok(None);
    }

    // Seeking past the last decodable frame exits cleanly but writes nothing
    let pixel_bytes = match std::fs::read(&output_path) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => return Ok(None),
    };

    let (width, height) = png_dimensions(&pixel_bytes).unwrap_or((0, 0));

    Ok(Some(RawFrame {
        timestamp,
        pixel_bytes,
        width,
        height,
        encoding: FRAME_ENCODING.to_string(),
    }))
}

/// Format seconds as HH:MM:SS.mmm for ffmpeg.
///
/// Rounds to whole milliseconds before splitting, so 59.9996 becomes
/// 00:01:00.000 rather than an out-of-range 00:00:60.000.
fn format_duration(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00.000");
        assert_eq!(format_duration(5.5), "00:00:05.500");
        assert_eq!(format_duration(65.25), "00:01:05.250");
        assert_eq!(format_duration(3661.0), "01:01:01.000");
    }

    #[test]
    fn test_format_duration_rounds_into_next_minute() {
        assert_eq!(format_duration(59.9996), "00:01:00.000");
        assert_eq!(format_duration(3599.9999), "01:00:00.000");
        assert_eq!(format_duration(59.9994), "00:00:59.999");
        assert_eq!(format_duration(12.3456), "00:00:12.346");
    }

    #[test]
    fn test_format_duration_clamps_negative() {
        assert_eq!(format_duration(-3.0), "00:00:00.000");
    }
}
