// Recommendation pipeline
//
// metadata -> sample timestamps -> extract frames -> analyze -> score -> select.
// All-or-nothing: a collaborator failure aborts the run, no partial result.

use std::path::Path;
use std::time::Instant;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{DEFAULT_TOP_N, MAX_FRAMES_LIMIT};
use crate::error::{Result, ThumbError};
use crate::extract::{ExtractionRequest, FrameExtractor, FrameQuality, RawFrame};
use crate::metadata::VideoWindow;
use crate::oracle::{AnalysisOptions, AnalysisRecord, VisionOracle};
use crate::sampler::{compute_timestamps, SamplingOptions};
use crate::scoring;
use crate::selector::select_top;

/// A sampled frame with its analysis and derived scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub frame: RawFrame,
    pub analysis: AnalysisRecord,
    /// Visual appeal, [0, 1]
    pub score: f64,
    /// Data quality of the analysis, [0, 1]
    pub confidence: f64,
    /// Reason tokens from the score breakdown
    pub reasons: Vec<String>,
}

impl Candidate {
    fn from_analysis(frame: RawFrame, analysis: AnalysisRecord) -> Self {
        let breakdown = scoring::score_breakdown(&analysis);
        let confidence = scoring::confidence(&analysis, breakdown.score);
        Self {
            frame,
            analysis,
            score: breakdown.score,
            confidence,
            reasons: breakdown.reasons,
        }
    }
}

/// Final output of a run. Best candidate first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub top_candidates: Vec<Candidate>,
    pub video_window: VideoWindow,
    pub processing_time_ms: u64,
    pub oracle_name: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendOptions {
    pub sampling: SamplingOptions,
    pub top_n: usize,
    pub quality: FrameQuality,
    pub analysis: AnalysisOptions,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            sampling: SamplingOptions::default(),
            top_n: DEFAULT_TOP_N,
            quality: FrameQuality::default(),
            analysis: AnalysisOptions::default(),
        }
    }
}

impl RecommendOptions {
    /// Reject options the sampler would silently turn into an empty plan.
    pub fn validate(&self) -> Result<()> {
        let s = &self.sampling;

        if s.max_frames == 0 {
            return Err(ThumbError::InvalidOptions("maxFrames must be at least 1".to_string()));
        }
        if s.max_frames > MAX_FRAMES_LIMIT {
            return Err(ThumbError::InvalidOptions(format!(
                "maxFrames must be at most {}, got {}",
                MAX_FRAMES_LIMIT, s.max_frames
            )));
        }
        if self.top_n == 0 {
            return Err(ThumbError::InvalidOptions("topN must be at least 1".to_string()));
        }
        if let Some(interval) = s.interval_seconds {
            if !interval.is_finite() || interval <= 0.0 {
                return Err(ThumbError::InvalidOptions(format!(
                    "intervalSeconds must be positive, got {}",
                    interval
                )));
            }
        }
        if let Some(start) = s.start_time {
            if !start.is_finite() || start < 0.0 {
                return Err(ThumbError::InvalidOptions(format!(
                    "startTime must be non-negative, got {}",
                    start
                )));
            }
        }
        if let Some(end) = s.end_time {
            if !end.is_finite() || end <= s.start_time.unwrap_or(0.0) {
                return Err(ThumbError::InvalidOptions(format!(
                    "endTime must be after startTime, got {}",
                    end
                )));
            }
        }

        Ok(())
    }
}

/// Runs the pipeline against pluggable extraction and analysis backends.
pub struct Recommender {
    extractor: Box<dyn FrameExtractor>,
    oracle: Option<Box<dyn VisionOracle>>,
}

impl Recommender {
    /// Recommender without an oracle. `recommend` fails until one is set.
    pub fn new(extractor: Box<dyn FrameExtractor>) -> Self {
        Self { extractor, oracle: None }
    }

    pub fn with_oracle(extractor: Box<dyn FrameExtractor>, oracle: Box<dyn VisionOracle>) -> Self {
        Self {
            extractor,
            oracle: Some(oracle),
        }
    }

    pub fn set_oracle(&mut self, oracle: Box<dyn VisionOracle>) {
        self.oracle = Some(oracle);
    }

    pub fn oracle_name(&self) -> Option<&str> {
        self.oracle.as_deref().map(|o| o.name())
    }

    pub fn recommend(&self, video: &Path, options: &RecommendOptions) -> Result<Recommendation> {
        let oracle = self.oracle.as_deref().ok_or(ThumbError::OracleNotConfigured)?;
        options.validate()?;

        let started = Instant::now();
        log::info!("Recommending thumbnails for {} via {}", video.display(), oracle.name());

        let window = self.extractor.metadata(video).map_err(ThumbError::wrap)?;

        let timestamps = compute_timestamps(&window, &options.sampling);
        log::info!(
            "Sampling {} timestamps from {:.2}s of video",
            timestamps.len(),
            window.duration
        );

        let request = ExtractionRequest {
            timestamps,
            quality: options.quality,
        };
        let frames = self
            .extractor
            .extract_frames(video, &request)
            .map_err(ThumbError::wrap)?;

        if frames.is_empty() {
            return Err(ThumbError::NoFramesExtracted);
        }
        if frames.len() < request.timestamps.len() {
            log::warn!(
                "Extracted {} of {} requested frames",
                frames.len(),
                request.timestamps.len()
            );
        }

        let analyses = oracle
            .analyze_many(&frames, &options.analysis)
            .map_err(ThumbError::wrap)?;

        if analyses.len() != frames.len() {
            return Err(ThumbError::wrap(ThumbError::Oracle(format!(
                "expected {} analyses, got {}",
                frames.len(),
                analyses.len()
            ))));
        }

        let candidates: Vec<Candidate> = frames
            .into_iter()
            .zip(analyses)
            .map(|(frame, analysis)| Candidate::from_analysis(frame, analysis.sanitized()))
            .collect();

        for c in &candidates {
            log::debug!(
                "Frame {:.3}s: score {:.4}, confidence {:.4}",
                c.frame.timestamp,
                c.score,
                c.confidence
            );
        }

        let top_candidates = select_top(candidates, options.top_n);
        let processing_time_ms = started.elapsed().as_millis() as u64;

        log::info!(
            "Selected {} thumbnails in {}ms",
            top_candidates.len(),
            processing_time_ms
        );

        Ok(Recommendation {
            top_candidates,
            video_window: window,
            processing_time_ms,
            oracle_name: oracle.name().to_string(),
            generated_at: Utc::now(),
        })
    }
}
