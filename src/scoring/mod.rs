// Scoring Engine
// Converts an oracle's analysis into one comparable thumbnail score.
//
// Pure and deterministic: the same record always yields the same bits.


use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::oracle::{clamp_metric, AnalysisRecord};

/// Every intermediate value behind a score, for reporting and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub colorfulness: f64,
    pub contrast: f64,
    pub brightness: f64,
    pub sharpness: f64,
    pub object_count: Option<f64>,
    pub face_count: Option<f64>,
    /// Weighted average over the metrics that were present
    pub base_score: f64,
    /// Product of the bonuses that fired
    pub multiplier: f64,
    /// Final score in [0, 1]
    pub score: f64,
    pub reasons: Vec<String>,
    pub scoring_version: u32,
}

impl ScoreBreakdown {
    fn add_reason(&mut self, reason: &str) {
        self.reasons.push(reason.to_string());
    }
}

/// Score an analysis. Always in [0, 1].
pub fn score(analysis: &AnalysisRecord) -> f64 {
    score_breakdown(analysis).score
}

/// Score an analysis and keep the working.
pub fn score_breakdown(analysis: &AnalysisRecord) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown {
        colorfulness: normalize(analysis.colorfulness),
        contrast: normalize(analysis.contrast),
        brightness: score_brightness(analysis.brightness),
        sharpness: normalize(analysis.sharpness),
        object_count: analysis.object_count.map(score_object_count),
        face_count: analysis.face_count.map(score_face_count),
        base_score: 0.0,
        multiplier: 1.0,
        score: 0.0,
        reasons: Vec::new(),
        scoring_version: SCORING_VERSION,
    };

    let brightness = clamp_metric(analysis.brightness);
    if brightness < BRIGHTNESS_EXTREME_LOW || brightness > BRIGHTNESS_EXTREME_HIGH {
        breakdown.add_reason(R_BRIGHT_EXTREME);
    } else if brightness < BRIGHTNESS_IDEAL_LOW || brightness > BRIGHTNESS_IDEAL_HIGH {
        breakdown.add_reason(R_BRIGHT_MARGINAL);
    } else {
        breakdown.add_reason(R_BRIGHT_GOOD);
    }

    match analysis.object_count {
        Some(0) => breakdown.add_reason(R_OBJECTS_NONE),
        Some(n) if n <= OBJECT_FOCUSED_MAX => breakdown.add_reason(R_OBJECTS_FOCUSED),
        Some(n) if n > OBJECT_BUSY_MAX => breakdown.add_reason(R_OBJECTS_CLUTTERED),
        _ => {}
    }

    breakdown.base_score = weighted_average(&[
        (Some(breakdown.colorfulness), WEIGHT_COLORFULNESS),
        (Some(breakdown.contrast), WEIGHT_CONTRAST),
        (Some(breakdown.brightness), WEIGHT_BRIGHTNESS),
        (Some(breakdown.sharpness), WEIGHT_SHARPNESS),
        (breakdown.object_count, WEIGHT_OBJECT_COUNT),
        (breakdown.face_count, WEIGHT_FACE_COUNT),
    ]);

    let mut score = breakdown.base_score;

    if analysis.face_count.is_some_and(|n| n > 0) {
        score *= BONUS_FACE_PRESENT;
        breakdown.multiplier *= BONUS_FACE_PRESENT;
        breakdown.add_reason(R_FACE_BONUS);
    }

    // Only an explicit "no text" counts; unknown is not rewarded
    if analysis.text_detected == Some(false) {
        score *= BONUS_NO_TEXT;
        breakdown.multiplier *= BONUS_NO_TEXT;
        breakdown.add_reason(R_NO_TEXT_BONUS);
    }

    if has_engagement_tag(analysis.tags.as_deref()) {
        score *= BONUS_ENGAGEMENT_TAG;
        breakdown.multiplier *= BONUS_ENGAGEMENT_TAG;
        breakdown.add_reason(R_ENGAGEMENT_BONUS);
    }

    if score > 1.0 {
        breakdown.add_reason(R_SCORE_CAPPED);
    }

    breakdown.score = score.clamp(0.0, 1.0);
    breakdown
}

/// Data-quality signal, distinct from visual appeal.
///
/// Starts at the score and is nudged up when the oracle clearly looked at the
/// image (all base metrics non-zero) and when it returned any count.
pub fn confidence(analysis: &AnalysisRecord, score: f64) -> f64 {
    let mut confidence = score;

    if analysis.base_metrics().iter().all(|m| m.is_finite() && *m > 0.0) {
        confidence *= CONFIDENCE_ALL_METRICS;
    }

    if analysis.object_count.is_some() || analysis.face_count.is_some() {
        confidence *= CONFIDENCE_HAS_COUNTS;
    }

    if confidence.is_nan() {
        return 0.0;
    }
    confidence.clamp(0.0, 1.0)
}

/// Linear 0-100 -> 0-1
fn normalize(value: f64) -> f64 {
    ((clamp_metric(value) - METRIC_MIN) / (METRIC_MAX - METRIC_MIN)).clamp(0.0, 1.0)
}

/// Mid-range exposure wins; extremes are penalized symmetrically.
fn score_brightness(brightness: f64) -> f64 {
    let b = clamp_metric(brightness);
    if b < BRIGHTNESS_EXTREME_LOW || b > BRIGHTNESS_EXTREME_HIGH {
        BRIGHTNESS_SCORE_EXTREME
    } else if b < BRIGHTNESS_IDEAL_LOW || b > BRIGHTNESS_IDEAL_HIGH {
        BRIGHTNESS_SCORE_MARGINAL
    } else {
        BRIGHTNESS_SCORE_IDEAL
    }
}

/// A few subjects is ideal; too many dilutes focus.
fn score_object_count(count: u32) -> f64 {
    match count {
        0 => OBJECT_SCORE_NONE,
        n if n <= OBJECT_FOCUSED_MAX => OBJECT_SCORE_FOCUSED,
        n if n <= OBJECT_BUSY_MAX => OBJECT_SCORE_BUSY,
        _ => OBJECT_SCORE_CLUTTERED,
    }
}

fn score_face_count(count: u32) -> f64 {
    match count {
        0 => FACE_SCORE_NONE,
        n if n <= FACE_FEW_MAX => FACE_SCORE_FEW,
        n if n <= FACE_GROUP_MAX => FACE_SCORE_GROUP,
        _ => FACE_SCORE_CROWD,
    }
}

/// Weighted mean over present metrics only, so a missing optional metric
/// doesn't drag the result toward zero.
fn weighted_average(metrics: &[(Option<f64>, f64)]) -> f64 {
    let (total, weight) = metrics
        .iter()
        .filter_map(|(value, weight)| value.map(|v| (v * weight, *weight)))
        .fold((0.0, 0.0), |(t, w), (vw, wt)| (t + vw, w + wt));

    if weight > 0.0 {
        total / weight
    } else {
        0.0
    }
}

fn has_engagement_tag(tags: Option<&[String]>) -> bool {
    tags.unwrap_or_default().iter().any(|tag| {
        let tag = tag.to_lowercase();
        ENGAGEMENT_KEYWORDS.iter().any(|keyword| tag.contains(keyword))
    })
}
