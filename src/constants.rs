// Thumbpick Constants
// Scoring weights and bands are part of the ranking contract. Changing them
// changes which frames win, so bump SCORING_VERSION with them.

pub const SCORING_VERSION: u32 = 1;

// ----- Extraction / sampling defaults -----

pub const DEFAULT_MAX_FRAMES: usize = 10;
pub const DEFAULT_TOP_N: usize = 3;

// Upper bound on sampled frames per run; each one costs an ffmpeg call and an oracle request
pub const MAX_FRAMES_LIMIT: usize = 1000;

// FFmpeg -q:v values per quality hint (1 is best, 31 is worst)
pub const QUALITY_Q_LOW: u32 = 10;
pub const QUALITY_Q_MEDIUM: u32 = 5;
pub const QUALITY_Q_HIGH: u32 = 1;

// Fallback frame rate when ffprobe reports nothing usable
pub const DEFAULT_FPS: f64 = 30.0;

// Extracted frames are always PNG
pub const FRAME_ENCODING: &str = "png";

// ----- Scoring weights (sum to 1.0 when every metric is present) -----

pub const WEIGHT_COLORFULNESS: f64 = 0.25;
pub const WEIGHT_CONTRAST: f64 = 0.25;
pub const WEIGHT_BRIGHTNESS: f64 = 0.15;
pub const WEIGHT_SHARPNESS: f64 = 0.20;
pub const WEIGHT_OBJECT_COUNT: f64 = 0.10;
pub const WEIGHT_FACE_COUNT: f64 = 0.05;

// Base metrics arrive on a 0-100 scale
pub const METRIC_MIN: f64 = 0.0;
pub const METRIC_MAX: f64 = 100.0;
pub const METRIC_MIDPOINT: f64 = 50.0;

// Brightness bands: outside [20, 80] is extreme, [30, 70] is ideal
pub const BRIGHTNESS_EXTREME_LOW: f64 = 20.0;
pub const BRIGHTNESS_EXTREME_HIGH: f64 = 80.0;
pub const BRIGHTNESS_IDEAL_LOW: f64 = 30.0;
pub const BRIGHTNESS_IDEAL_HIGH: f64 = 70.0;
pub const BRIGHTNESS_SCORE_EXTREME: f64 = 0.3;
pub const BRIGHTNESS_SCORE_MARGINAL: f64 = 0.7;
pub const BRIGHTNESS_SCORE_IDEAL: f64 = 1.0;

// Object count curve: none, focused (1-3), busy (4-6), cluttered (>6)
pub const OBJECT_SCORE_NONE: f64 = 0.0;
pub const OBJECT_SCORE_FOCUSED: f64 = 1.0;
pub const OBJECT_SCORE_BUSY: f64 = 0.8;
pub const OBJECT_SCORE_CLUTTERED: f64 = 0.5;
pub const OBJECT_FOCUSED_MAX: u32 = 3;
pub const OBJECT_BUSY_MAX: u32 = 6;

// Face count curve: none is neutral, not penalized
pub const FACE_SCORE_NONE: f64 = 0.5;
pub const FACE_SCORE_FEW: f64 = 1.0;
pub const FACE_SCORE_GROUP: f64 = 0.8;
pub const FACE_SCORE_CROWD: f64 = 0.6;
pub const FACE_FEW_MAX: u32 = 2;
pub const FACE_GROUP_MAX: u32 = 4;

// Multiplicative bonuses, applied in this order
pub const BONUS_FACE_PRESENT: f64 = 1.1;
pub const BONUS_NO_TEXT: f64 = 1.05;
pub const BONUS_ENGAGEMENT_TAG: f64 = 1.15;

pub const ENGAGEMENT_KEYWORDS: [&str; 6] = [
    "action", "emotion", "smile", "eye contact", "gesture", "peak moment",
];

// Confidence heuristic multipliers
pub const CONFIDENCE_ALL_METRICS: f64 = 1.1;
pub const CONFIDENCE_HAS_COUNTS: f64 = 1.05;

// ----- Vision oracle -----

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const OPENAI_ORACLE_NAME: &str = "OpenAI GPT-4 Vision";
pub const OPENAI_MAX_TOKENS: u32 = 500;
pub const OPENAI_TEMPERATURE: f64 = 0.1;
pub const OPENAI_TIMEOUT_SECS: u64 = 120;

// Per-frame oracle requests in flight at once
pub const ORACLE_MAX_CONCURRENCY: usize = 4;

// Degraded text parse keeps this many chars of the raw reply as description
pub const FALLBACK_DESCRIPTION_CHARS: usize = 200;

// ----- Environment overrides -----

pub const ENV_FFMPEG_PATH: &str = "THUMBPICK_FFMPEG_PATH";
pub const ENV_FFPROBE_PATH: &str = "THUMBPICK_FFPROBE_PATH";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "THUMBPICK_OPENAI_MODEL";
pub const ENV_OPENAI_ENDPOINT: &str = "THUMBPICK_OPENAI_ENDPOINT";

// ----- Output -----

pub const DEFAULT_OUTPUT_FORMAT: &str = "jpg";
pub const DEFAULT_JPEG_QUALITY: u32 = 85;
pub const DEFAULT_FILE_PREFIX: &str = "thumbnail";

// ----- Stable Reason Tokens -----
// Machine-parseable explanations attached to a score breakdown.

pub const R_BRIGHT_EXTREME: &str = "R_BRIGHT_EXTREME";
pub const R_BRIGHT_MARGINAL: &str = "R_BRIGHT_MARGINAL";
pub const R_BRIGHT_GOOD: &str = "R_BRIGHT_GOOD";
pub const R_OBJECTS_NONE: &str = "R_OBJECTS_NONE";
pub const R_OBJECTS_FOCUSED: &str = "R_OBJECTS_FOCUSED";
pub const R_OBJECTS_CLUTTERED: &str = "R_OBJECTS_CLUTTERED";
pub const R_FACE_BONUS: &str = "R_FACE_BONUS";
pub const R_NO_TEXT_BONUS: &str = "R_NO_TEXT_BONUS";
pub const R_ENGAGEMENT_BONUS: &str = "R_ENGAGEMENT_BONUS";
pub const R_SCORE_CAPPED: &str = "R_SCORE_CAPPED";
