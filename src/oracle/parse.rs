// Oracle reply parsing
//
// Vision models are asked for JSON but don't always comply. We take JSON when
// we can find it, fall back to a best-effort labeled-text scan when we can't,
// and only fail when there is no usable signal at all.

use std::sync::LazyLock;
use regex::Regex;
use serde_json::{Map, Value};

use crate::constants::{FALLBACK_DESCRIPTION_CHARS, METRIC_MIDPOINT};
use crate::error::{Result, ThumbError};
use crate::oracle::{clamp_metric, AnalysisOptions, AnalysisRecord};

static FENCED_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").unwrap()
});

static COLORFULNESS_RE: LazyLock<Regex> = LazyLock::new(|| metric_regex("colou?rfulness"));
static CONTRAST_RE: LazyLock<Regex> = LazyLock::new(|| metric_regex("contrast"));
static BRIGHTNESS_RE: LazyLock<Regex> = LazyLock::new(|| metric_regex("brightness"));
static SHARPNESS_RE: LazyLock<Regex> = LazyLock::new(|| metric_regex("sharpness"));

static OBJECTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)objects?(?:[\s_-]*count)?[\s:="']*(\d+)"#).unwrap()
});
static FACES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)faces?(?:[\s_-]*count)?[\s:="']*(\d+)"#).unwrap()
});
static TEXT_YES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)text(?:[\s_-]*detected)?[\s:="']*(?:true|yes)\b"#).unwrap()
});
static TEXT_NO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)text(?:[\s_-]*detected)?[\s:="']*(?:false|no|none)\b"#).unwrap()
});

fn metric_regex(label: &str) -> Regex {
    Regex::new(&format!(r#"(?i){}[\s:="'-]*(\d+(?:\.\d+)?)"#, label)).unwrap()
}

/// Parse an oracle reply into a record, keeping only the requested optional fields.
pub fn parse_analysis_response(content: &str, options: &AnalysisOptions) -> Result<AnalysisRecord> {
    if content.trim().is_empty() {
        return Err(ThumbError::MalformedAnalysis("empty oracle reply".to_string()));
    }

    match find_json_object(content) {
        Some(object) => Ok(record_from_json(&object, options)),
        None => {
            log::warn!("No JSON found in oracle reply, attempting to parse text manually");
            parse_text_response(content, options)
        }
    }
}

/// Locate and parse the JSON object in a reply. Fenced blocks win over bare braces.
fn find_json_object(content: &str) -> Option<Map<String, Value>> {
    let fenced = FENCED_JSON_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    let braces = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&content[start..=end]),
        _ => None,
    };

    [fenced, braces]
        .into_iter()
        .flatten()
        .find_map(|candidate| match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                log::debug!("Candidate JSON did not parse: {}", e);
                None
            }
        })
}

const METRIC_KEYS: [&str; 4] = ["colorfulness", "contrast", "brightness", "sharpness"];

fn has_any_metric(object: &Map<String, Value>) -> bool {
    METRIC_KEYS.iter().any(|key| object.contains_key(*key))
}

fn record_from_json(object: &Map<String, Value>, options: &AnalysisOptions) -> AnalysisRecord {
    if !has_any_metric(object) {
        log::warn!("Oracle JSON has no metric fields, defaulting all metrics to midpoint");
    }

    let mut record = AnalysisRecord::new(
        metric_value(object.get("colorfulness")),
        metric_value(object.get("contrast")),
        metric_value(object.get("brightness")),
        metric_value(object.get("sharpness")),
    );

    if options.include_objects {
        record.object_count = count_value(object.get("objectCount"));
    }

    if options.include_faces {
        record.face_count = count_value(object.get("faceCount"));
    }

    if options.include_text {
        record.text_detected = object.get("textDetected").and_then(Value::as_bool);
    }

    if options.include_description {
        record.description = object
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        record.tags = object.get("tags").and_then(Value::as_array).map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });
    }

    record
}

/// Base metric from JSON: numbers and numeric strings are clamped, anything else is the midpoint.
fn metric_value(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.map(clamp_metric).unwrap_or(METRIC_MIDPOINT)
}

/// Count from JSON: must be a number; negative values floor at zero.
fn count_value(value: Option<&Value>) -> Option<u32> {
    let n = value?.as_f64()?;
    if !n.is_finite() {
        return None;
    }
    Some(n.max(0.0).round().min(u32::MAX as f64) as u32)
}

/// Degraded parse: pull labeled numbers out of free text.
fn parse_text_response(content: &str, options: &AnalysisOptions) -> Result<AnalysisRecord> {
    let metrics = [
        capture_number(&COLORFULNESS_RE, content),
        capture_number(&CONTRAST_RE, content),
        capture_number(&BRIGHTNESS_RE, content),
        capture_number(&SHARPNESS_RE, content),
    ];

    if metrics.iter().all(Option::is_none) {
        return Err(ThumbError::MalformedAnalysis(
            "no JSON object or labeled metrics in oracle reply".to_string(),
        ));
    }

    let [colorfulness, contrast, brightness, sharpness] =
        metrics.map(|m| m.unwrap_or(METRIC_MIDPOINT));
    let mut record = AnalysisRecord::new(colorfulness, contrast, brightness, sharpness);

    if options.include_objects {
        record.object_count = capture_number(&OBJECTS_RE, content).map(|n| n as u32);
    }

    if options.include_faces {
        record.face_count = capture_number(&FACES_RE, content).map(|n| n as u32);
    }

    if options.include_text {
        record.text_detected = if TEXT_YES_RE.is_match(content) {
            Some(true)
        } else if TEXT_NO_RE.is_match(content) {
            Some(false)
        } else {
            None
        };
    }

    if options.include_description {
        record.description = Some(truncate_description(content.trim()));
    }

    Ok(record)
}

fn capture_number(re: &Regex, content: &str) -> Option<f64> {
    re.captures(content)?.get(1)?.as_str().parse::<f64>().ok()
}

fn truncate_description(text: &str) -> String {
    if text.chars().count() > FALLBACK_DESCRIPTION_CHARS {
        let head: String = text.chars().take(FALLBACK_DESCRIPTION_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
