// Frame extraction capability
//
// The pipeline only needs "give me pixels at these instants" and "describe
// the container". Decoding backends plug in behind `FrameExtractor`.

pub mod ffmpeg;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use serde::{Serialize, Serializer};

use crate::constants::{QUALITY_Q_HIGH, QUALITY_Q_LOW, QUALITY_Q_MEDIUM};
use crate::error::{Result, ThumbError};
use crate::metadata::VideoWindow;

pub use ffmpeg::FfmpegExtractor;

/// A single decoded still. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFrame {
    /// Offset into the video, seconds
    pub timestamp: f64,
    #[serde(rename = "byteLength", serialize_with = "serialize_byte_len")]
    pub pixel_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Image encoding of `pixel_bytes`, e.g. "png"
    pub encoding: String,
}

#[allow(clippy::ptr_arg)]
fn serialize_byte_len<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(bytes.len() as u64)
}

/// Quality hint passed to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl FrameQuality {
    /// FFmpeg `-q:v` value for this hint (1 is best)
    pub fn ffmpeg_q(&self) -> u32 {
        match self {
            FrameQuality::Low => QUALITY_Q_LOW,
            FrameQuality::Medium => QUALITY_Q_MEDIUM,
            FrameQuality::High => QUALITY_Q_HIGH,
        }
    }
}

impl fmt::Display for FrameQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameQuality::Low => "low",
            FrameQuality::Medium => "medium",
            FrameQuality::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for FrameQuality {
    type Err = ThumbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(FrameQuality::Low),
            "medium" => Ok(FrameQuality::Medium),
            "high" => Ok(FrameQuality::High),
            other => Err(ThumbError::InvalidOptions(format!(
                "Unknown quality '{}', expected low, medium or high",
                other
            ))),
        }
    }
}

/// Batch request for frames at the given instants.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub timestamps: Vec<f64>,
    pub quality: FrameQuality,
}

/// Decoding backend. Implementations must be safe to share across pipeline runs.
pub trait FrameExtractor: Send + Sync {
    /// Describe the container. Fails if the file is unreadable or has no video stream.
    fn metadata(&self, video: &Path) -> Result<VideoWindow>;

    /// Extract frames in timestamp order. Unreachable instants may be skipped,
    /// so the result can be shorter than `request.timestamps`.
    fn extract_frames(&self, video: &Path, request: &ExtractionRequest) -> Result<Vec<RawFrame>>;
}

/// Read width/height from a PNG IHDR chunk.
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    if bytes.len() < 24 || bytes[..8] != SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }

    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
        bytes
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(png_dimensions(&png_header(1280, 720)), Some((1280, 720)));
    }

    #[test]
    fn test_png_dimensions_rejects_other_data() {
        assert_eq!(png_dimensions(b"\xff\xd8\xff\xe0 not a png at all...."), None);
        assert_eq!(png_dimensions(&[]), None);
    }

    #[test]
    fn test_quality_parse_and_q() {
        assert_eq!("HIGH".parse::<FrameQuality>().unwrap(), FrameQuality::High);
        assert_eq!(FrameQuality::default(), FrameQuality::Medium);
        assert_eq!(FrameQuality::Low.ffmpeg_q(), 10);
        assert_eq!(FrameQuality::Medium.ffmpeg_q(), 5);
        assert_eq!(FrameQuality::High.ffmpeg_q(), 1);
        assert!("ultra".parse::<FrameQuality>().is_err());
    }

    #[test]
    fn test_raw_frame_serializes_byte_length() {
        let frame = RawFrame {
            timestamp: 1.5,
            pixel_bytes: vec![0u8; 42],
            width: 2,
            height: 3,
            encoding: "png".to_string(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["byteLength"], 42);
        assert_eq!(json["timestamp"], 1.5);
        assert!(json.get("pixelBytes").is_none());
    }
}
