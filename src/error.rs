// Thumbpick Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error("Vision oracle not configured. Attach one before requesting a recommendation")]
    OracleNotConfigured,

    #[error("No frames extracted from video")]
    NoFramesExtracted,

    #[error("recommendation failed: {0}")]
    RecommendationFailed(String),

    #[error("FFprobe error: {0}")]
    FFprobe(String),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Malformed analysis: {0}")]
    MalformedAnalysis(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl ThumbError {
    /// Wrap a collaborator failure at the orchestrator boundary, keeping its message.
    pub fn wrap(cause: ThumbError) -> Self {
        match cause {
            // Already wrapped or distinct conditions pass through untouched
            ThumbError::RecommendationFailed(_)
            | ThumbError::NoFramesExtracted
            | ThumbError::OracleNotConfigured => cause,
            other => ThumbError::RecommendationFailed(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ThumbError {
    fn from(err: anyhow::Error) -> Self {
        ThumbError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThumbError>;
