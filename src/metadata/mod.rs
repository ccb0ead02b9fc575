// Video metadata snapshot used to plan sampling

pub mod ffprobe;

use serde::{Deserialize, Serialize};

/// Immutable description of the video container, taken once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoWindow {
    /// Duration in seconds
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub container_format: String,
    pub size_bytes: u64,
}

impl VideoWindow {
    /// Window with only a duration known. Handy for planning and tests.
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration,
            width: 0,
            height: 0,
            frame_rate: crate::constants::DEFAULT_FPS,
            container_format: "unknown".to_string(),
            size_bytes: 0,
        }
    }
}
