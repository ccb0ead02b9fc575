// Vision oracle capability
//
// The oracle turns frame pixels into an `AnalysisRecord`. Its internals
// (model, prompt, vendor) are opaque to the pipeline; we only guarantee
// bounded post-processing of whatever it returns.

pub mod openai;
pub mod parse;

use serde::{Deserialize, Serialize};

use crate::constants::{METRIC_MAX, METRIC_MIDPOINT, METRIC_MIN, ORACLE_MAX_CONCURRENCY};
use crate::error::{Result, ThumbError};
use crate::extract::RawFrame;

pub use openai::{OpenAiConfig, OpenAiOracle};

/// Normalized per-frame quality signals.
///
/// Base metrics are on a 0-100 scale. Optional fields are `None` when the
/// matching analysis was not requested or not returned; `None` is "unknown",
/// which the scorer treats differently from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub colorfulness: f64,
    pub contrast: f64,
    pub brightness: f64,
    pub sharpness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl AnalysisRecord {
    /// Record with only the base metrics, each clamped into range.
    pub fn new(colorfulness: f64, contrast: f64, brightness: f64, sharpness: f64) -> Self {
        Self {
            colorfulness: clamp_metric(colorfulness),
            contrast: clamp_metric(contrast),
            brightness: clamp_metric(brightness),
            sharpness: clamp_metric(sharpness),
            object_count: None,
            face_count: None,
            text_detected: None,
            description: None,
            tags: None,
        }
    }

    /// Re-apply the base metric bounds. Oracles we don't control go through this.
    pub fn sanitized(mut self) -> Self {
        self.colorfulness = clamp_metric(self.colorfulness);
        self.contrast = clamp_metric(self.contrast);
        self.brightness = clamp_metric(self.brightness);
        self.sharpness = clamp_metric(self.sharpness);
        self
    }

    pub fn base_metrics(&self) -> [f64; 4] {
        [self.colorfulness, self.contrast, self.brightness, self.sharpness]
    }
}

/// Clamp a base metric into [0, 100]; NaN/infinite becomes the midpoint.
pub fn clamp_metric(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(METRIC_MIN, METRIC_MAX)
    } else {
        METRIC_MIDPOINT
    }
}

/// Which sub-analyses the oracle should run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    pub include_objects: bool,
    pub include_faces: bool,
    pub include_text: bool,
    pub include_description: bool,
    /// Replaces the built-in prompt entirely when set
    pub custom_prompt: Option<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_objects: true,
            include_faces: true,
            include_text: true,
            include_description: true,
            custom_prompt: None,
        }
    }
}

/// A visual-quality analysis provider.
pub trait VisionOracle: Send + Sync {
    /// Self-reported name, recorded in every recommendation
    fn name(&self) -> &str;

    fn analyze(&self, frame: &RawFrame, options: &AnalysisOptions) -> Result<AnalysisRecord>;

    /// Analyze a batch. Results are index-aligned with `frames`.
    ///
    /// The default runs up to `ORACLE_MAX_CONCURRENCY` requests at once and
    /// fails the whole batch on the first error.
    fn analyze_many(&self, frames: &[RawFrame], options: &AnalysisOptions) -> Result<Vec<AnalysisRecord>> {
        let mut records = Vec::with_capacity(frames.len());

        for chunk in frames.chunks(ORACLE_MAX_CONCURRENCY) {
            let results: Vec<Result<AnalysisRecord>> = std::thread::scope(|scope| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|frame| scope.spawn(move || self.analyze(frame, options)))
                    .collect();

                handles
                    .into_iter()
                    .map(|h| {
                        h.join()
                            .unwrap_or_else(|_| Err(ThumbError::Oracle("analysis worker panicked".to_string())))
                    })
                    .collect()
            });

            for result in results {
                records.push(result?);
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn frame(timestamp: f64) -> RawFrame {
        RawFrame {
            timestamp,
            pixel_bytes: vec![1, 2, 3],
            width: 4,
            height: 4,
            encoding: "png".to_string(),
        }
    }

    /// Echoes the timestamp into colorfulness so ordering is observable
    struct EchoOracle {
        calls: AtomicUsize,
        fail_at: Option<f64>,
    }

    impl VisionOracle for EchoOracle {
        fn name(&self) -> &str {
            "echo"
        }

        fn analyze(&self, frame: &RawFrame, _options: &AnalysisOptions) -> Result<AnalysisRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_at == Some(frame.timestamp) {
                return Err(ThumbError::Oracle("rate limited".to_string()));
            }
            // Later frames finish first to shake out ordering bugs
            std::thread::sleep(std::time::Duration::from_millis((20.0 - frame.timestamp) as u64));
            Ok(AnalysisRecord::new(frame.timestamp, 50.0, 50.0, 50.0))
        }
    }

    #[test]
    fn test_analyze_many_preserves_order() {
        let oracle = EchoOracle { calls: AtomicUsize::new(0), fail_at: None };
        let frames: Vec<RawFrame> = (0..9).map(|i| frame(i as f64)).collect();

        let records = oracle.analyze_many(&frames, &AnalysisOptions::default()).unwrap();

        assert_eq!(records.len(), 9);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.colorfulness, i as f64);
        }
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn test_analyze_many_fails_on_first_error() {
        let oracle = EchoOracle { calls: AtomicUsize::new(0), fail_at: Some(2.0) };
        let frames: Vec<RawFrame> = (0..3).map(|i| frame(i as f64)).collect();

        let err = oracle.analyze_many(&frames, &AnalysisOptions::default()).unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_clamp_metric() {
        assert_eq!(clamp_metric(-5.0), 0.0);
        assert_eq!(clamp_metric(140.0), 100.0);
        assert_eq!(clamp_metric(f64::NAN), 50.0);
        assert_eq!(clamp_metric(f64::INFINITY), 50.0);
        assert_eq!(clamp_metric(42.5), 42.5);
    }

    #[test]
    fn test_sanitized_keeps_optional_fields() {
        let mut record = AnalysisRecord::new(10.0, 10.0, 10.0, 10.0);
        record.sharpness = 250.0;
        record.face_count = Some(0);
        let clean = record.sanitized();
        assert_eq!(clean.sharpness, 100.0);
        assert_eq!(clean.face_count, Some(0));
    }

    #[test]
    fn test_record_serialization_omits_absent_fields() {
        let record = AnalysisRecord::new(80.0, 75.0, 60.0, 85.0);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("faceCount").is_none());
        assert!(json.get("textDetected").is_none());
        assert_eq!(json["colorfulness"], 80.0);
    }
}
