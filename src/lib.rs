// Thumbpick - Library Entry Point
//
// Picks the most thumbnail-worthy frames of a video: sample timestamps,
// extract stills, have a vision oracle rate them, score and rank.

pub mod constants;
pub mod error;
pub mod tools;
pub mod metadata;
pub mod extract;
pub mod sampler;
pub mod oracle;
pub mod scoring;
pub mod selector;
pub mod recommender;
pub mod output;

pub use error::{Result, ThumbError};
pub use extract::{ExtractionRequest, FfmpegExtractor, FrameExtractor, FrameQuality, RawFrame};
pub use metadata::VideoWindow;
pub use oracle::{AnalysisOptions, AnalysisRecord, OpenAiConfig, OpenAiOracle, VisionOracle};
pub use output::{save_thumbnails, OutputFormat, OutputOptions, SavedThumbnails};
pub use recommender::{Candidate, RecommendOptions, Recommendation, Recommender};
pub use sampler::{compute_timestamps, SamplingOptions};
pub use scoring::{confidence, score, score_breakdown, ScoreBreakdown};
pub use selector::select_top;
