// Timestamp sampling policy
//
// Decides which instants of the video get examined. Pure: no I/O, no state.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_FRAMES_LIMIT;
use crate::metadata::VideoWindow;

/// How many frames to sample and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingOptions {
    pub max_frames: usize,
    /// Window start in seconds (default 0)
    pub start_time: Option<f64>,
    /// Window end in seconds (default: video duration, never past it)
    pub end_time: Option<f64>,
    /// Fixed step between samples. When unset, samples are spread evenly.
    pub interval_seconds: Option<f64>,
}

impl SamplingOptions {
    pub fn new(max_frames: usize) -> Self {
        Self {
            max_frames,
            start_time: None,
            end_time: None,
            interval_seconds: None,
        }
    }
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_MAX_FRAMES)
    }
}

/// Compute the ordered list of timestamps (seconds) to examine.
///
/// Fixed-interval mode starts at the window start and steps by the interval
/// until `max_frames` is reached or the window end is passed. Even-spread mode
/// splits the window into `max_frames + 1` segments and returns the internal
/// boundaries, so the first and last instants (often black or mid-transition)
/// are never picked. Degenerate input yields an empty list, not an error.
/// `max_frames` is capped at `MAX_FRAMES_LIMIT`.
pub fn compute_timestamps(window: &VideoWindow, opts: &SamplingOptions) -> Vec<f64> {
    if opts.max_frames == 0 {
        return Vec::new();
    }

    let start = opts.start_time.unwrap_or(0.0).max(0.0);
    let end = opts
        .end_time
        .map(|e| e.min(window.duration))
        .unwrap_or(window.duration);

    if !start.is_finite() || !end.is_finite() || start >= end {
        return Vec::new();
    }

    let max_frames = opts.max_frames.min(MAX_FRAMES_LIMIT);

    match opts.interval_seconds {
        Some(interval) => fixed_interval(start, end, interval, max_frames),
        None => even_spread(start, end, max_frames),
    }
}

fn fixed_interval(start: f64, end: f64, interval: f64, max_frames: usize) -> Vec<f64> {
    if !interval.is_finite() || interval <= 0.0 {
        return Vec::new();
    }

    // Multiply rather than accumulate so long runs don't drift
    (0..max_frames)
        .map(|i| start + interval * i as f64)
        .take_while(|t| *t <= end)
        .collect()
}

fn even_spread(start: f64, end: f64, max_frames: usize) -> Vec<f64> {
    let step = (end - start) / (max_frames as f64 + 1.0);
    (1..=max_frames).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(duration: f64) -> VideoWindow {
        VideoWindow::with_duration(duration)
    }

    #[test]
    fn test_even_spread() {
        let ts = compute_timestamps(&window(100.0), &SamplingOptions::new(3));
        assert_eq!(ts, vec![25.0, 50.0, 75.0]);
    }

    #[test]
    fn test_even_spread_skips_endpoints() {
        let ts = compute_timestamps(&window(10.0), &SamplingOptions::new(1));
        assert_eq!(ts, vec![5.0]);
    }

    #[test]
    fn test_even_spread_within_subwindow() {
        let opts = SamplingOptions {
            start_time: Some(10.0),
            end_time: Some(40.0),
            ..SamplingOptions::new(2)
        };
        let ts = compute_timestamps(&window(100.0), &opts);
        assert_eq!(ts, vec![20.0, 30.0]);
    }

    #[test]
    fn test_fixed_interval() {
        let opts = SamplingOptions {
            start_time: Some(30.0),
            interval_seconds: Some(20.0),
            ..SamplingOptions::new(4)
        };
        let ts = compute_timestamps(&window(100.0), &opts);
        assert_eq!(ts, vec![30.0, 50.0, 70.0, 90.0]);
    }

    #[test]
    fn test_fixed_interval_stops_at_window_end() {
        let opts = SamplingOptions {
            interval_seconds: Some(4.0),
            ..SamplingOptions::new(10)
        };
        let ts = compute_timestamps(&window(10.0), &opts);
        assert_eq!(ts, vec![0.0, 4.0, 8.0]);
    }

    #[test]
    fn test_fixed_interval_includes_exact_end() {
        let opts = SamplingOptions {
            interval_seconds: Some(5.0),
            ..SamplingOptions::new(10)
        };
        let ts = compute_timestamps(&window(10.0), &opts);
        assert_eq!(ts, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_zero_frames_is_empty() {
        assert!(compute_timestamps(&window(100.0), &SamplingOptions::new(0)).is_empty());
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let opts = SamplingOptions {
            start_time: Some(50.0),
            end_time: Some(20.0),
            ..SamplingOptions::new(3)
        };
        assert!(compute_timestamps(&window(100.0), &opts).is_empty());

        let opts = SamplingOptions {
            start_time: Some(100.0),
            ..SamplingOptions::new(3)
        };
        assert!(compute_timestamps(&window(100.0), &opts).is_empty());
    }

    #[test]
    fn test_end_is_clamped_to_duration() {
        let opts = SamplingOptions {
            end_time: Some(500.0),
            ..SamplingOptions::new(1)
        };
        assert_eq!(compute_timestamps(&window(100.0), &opts), vec![50.0]);
    }

    #[test]
    fn test_non_positive_interval_is_empty() {
        let opts = SamplingOptions {
            interval_seconds: Some(0.0),
            ..SamplingOptions::new(3)
        };
        assert!(compute_timestamps(&window(100.0), &opts).is_empty());
    }

    #[test]
    fn test_huge_max_frames_is_capped() {
        let ts = compute_timestamps(&window(100.0), &SamplingOptions::new(usize::MAX));
        assert_eq!(ts.len(), MAX_FRAMES_LIMIT);
        assert!(ts.iter().all(|t| *t > 0.0 && *t < 100.0));
        assert!(ts.windows(2).all(|w| w[0] < w[1]));

        let opts = SamplingOptions {
            interval_seconds: Some(0.001),
            ..SamplingOptions::new(usize::MAX)
        };
        assert_eq!(compute_timestamps(&window(100.0), &opts).len(), MAX_FRAMES_LIMIT);
    }

    #[test]
    fn test_zero_duration_is_empty() {
        assert!(compute_timestamps(&window(0.0), &SamplingOptions::new(5)).is_empty());
    }
}
