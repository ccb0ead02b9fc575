// FFprobe wrapper for container metadata

use std::path::Path;
use std::process::Command;
use serde::Deserialize;

use crate::constants::DEFAULT_FPS;
use crate::error::{ThumbError, Result};
use crate::metadata::VideoWindow;

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    streams: Option<Vec<FFprobeStream>>,
    format: Option<FFprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    duration: Option<String>,
    format_name: Option<String>,
}

/// Run ffprobe on a file and build its `VideoWindow`
pub fn probe(path: &Path) -> Result<VideoWindow> {
    let output = Command::new(crate::tools::ffprobe_path())
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| ThumbError::FFprobe(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ThumbError::FFprobe(format!(
            "Failed to get video metadata for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let size_bytes = std::fs::metadata(path)
        .map_err(|e| ThumbError::FFprobe(format!("Failed to stat {}: {}", path.display(), e)))?
        .len();

    parse_probe_output(&output.stdout, size_bytes)
}

/// Turn raw ffprobe JSON into a window. Split out so it can be tested without ffprobe.
fn parse_probe_output(stdout: &[u8], size_bytes: u64) -> Result<VideoWindow> {
    let probe_output: FFprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ThumbError::FFprobe(format!("Failed to parse ffprobe output: {}", e)))?;

    let video_stream = probe_output
        .streams
        .unwrap_or_default()
        .into_iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ThumbError::FFprobe("No video stream found".to_string()))?;

    let format_duration = probe_output
        .format
        .as_ref()
        .and_then(|f| parse_seconds(f.duration.as_deref()));
    let duration = format_duration
        .or_else(|| parse_seconds(video_stream.duration.as_deref()))
        .unwrap_or(0.0);

    let container_format = probe_output
        .format
        .and_then(|f| f.format_name)
        .unwrap_or_else(|| "unknown".to_string());

    Ok(VideoWindow {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        frame_rate: parse_frame_rate(video_stream.r_frame_rate.as_deref()).unwrap_or(DEFAULT_FPS),
        container_format,
        size_bytes,
    })
}

/// Parse frame rate string like "30000/1001" to f64
fn parse_frame_rate(rate_str: Option<&str>) -> Option<f64> {
    let rate_str = rate_str?;
    if let Some((num, den)) = rate_str.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 && num > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate_str.parse::<f64>().ok().filter(|r| *r > 0.0)
}

/// Parse a seconds string like "12.345000"
fn parse_seconds(duration_str: Option<&str>) -> Option<f64> {
    let seconds: f64 = duration_str?.parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(seconds)
    } else {
        None
    }
}

/// Check if ffprobe is available
pub fn is_available() -> bool {
    crate::tools::is_tool_available("ffprobe")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "audio", "duration": "61.0"},
            {"codec_type": "video", "width": 1920, "height": 1080,
             "r_frame_rate": "30000/1001", "duration": "60.5"}
        ],
        "format": {"duration": "60.062000", "format_name": "mov,mp4,m4a,3gp,3g2,mj2"}
    }"#;

    #[test]
    fn test_parse_probe_output() {
        let window = parse_probe_output(SAMPLE.as_bytes(), 4096).unwrap();
        assert!((window.duration - 60.062).abs() < 1e-9);
        assert_eq!(window.width, 1920);
        assert_eq!(window.height, 1080);
        assert!((window.frame_rate - 29.97).abs() < 0.01);
        assert_eq!(window.container_format, "mov,mp4,m4a,3gp,3g2,mj2");
        assert_eq!(window.size_bytes, 4096);
    }

    #[test]
    fn test_stream_duration_used_when_format_lacks_it() {
        let json = r#"{"streams": [{"codec_type": "video", "duration": "12.5"}], "format": {}}"#;
        let window = parse_probe_output(json.as_bytes(), 0).unwrap();
        assert!((window.duration - 12.5).abs() < 1e-9);
        assert_eq!(window.container_format, "unknown");
        assert_eq!(window.frame_rate, DEFAULT_FPS);
    }

    #[test]
    fn test_no_video_stream_is_an_error() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "3.0"}}"#;
        let err = parse_probe_output(json.as_bytes(), 0).unwrap_err();
        assert!(err.to_string().contains("No video stream found"));
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate(Some("25/1")), Some(25.0));
        assert_eq!(parse_frame_rate(Some("24")), Some(24.0));
        assert_eq!(parse_frame_rate(Some("0/0")), None);
        assert_eq!(parse_frame_rate(Some("abc")), None);
        assert_eq!(parse_frame_rate(None), None);
    }
}
