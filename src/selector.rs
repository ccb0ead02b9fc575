// Top-N selection
//
// Stable sort by descending score, then truncate. Equal scores keep their
// sampling order, so the earlier frame wins a tie.

use std::cmp::Ordering;

use crate::recommender::Candidate;

/// Pick the best `count` candidates, best first.
pub fn select_top(mut candidates: Vec<Candidate>, count: usize) -> Vec<Candidate> {
    // sort_by is stable
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates.truncate(count);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RawFrame;
    use crate::oracle::AnalysisRecord;

    fn candidate(timestamp: f64, score: f64) -> Candidate {
        Candidate {
            frame: RawFrame {
                timestamp,
                pixel_bytes: Vec::new(),
                width: 0,
                height: 0,
                encoding: "png".to_string(),
            },
            analysis: AnalysisRecord::new(50.0, 50.0, 50.0, 50.0),
            score,
            confidence: score,
            reasons: Vec::new(),
        }
    }

    fn timestamps(candidates: &[Candidate]) -> Vec<f64> {
        candidates.iter().map(|c| c.frame.timestamp).collect()
    }

    #[test]
    fn test_select_orders_by_score() {
        let picked = select_top(
            vec![candidate(1.0, 0.2), candidate(2.0, 0.9), candidate(3.0, 0.5)],
            3,
        );
        assert_eq!(timestamps(&picked), vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_select_truncates() {
        let picked = select_top(
            vec![candidate(1.0, 0.2), candidate(2.0, 0.9), candidate(3.0, 0.5)],
            2,
        );
        assert_eq!(timestamps(&picked), vec![2.0, 3.0]);
    }

    #[test]
    fn test_select_count_larger_than_input() {
        let picked = select_top(vec![candidate(1.0, 0.4)], 5);
        assert_eq!(picked.len(), 1);
        assert!(select_top(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_ties_keep_sampling_order() {
        let picked = select_top(
            vec![
                candidate(1.0, 0.5),
                candidate(2.0, 0.7),
                candidate(3.0, 0.5),
                candidate(4.0, 0.7),
                candidate(5.0, 0.5),
            ],
            4,
        );
        assert_eq!(timestamps(&picked), vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn test_scores_non_increasing() {
        let input: Vec<Candidate> = (0..20)
            .map(|i| candidate(i as f64, ((i * 7) % 11) as f64 / 10.0))
            .collect();
        let picked = select_top(input, 10);
        assert_eq!(picked.len(), 10);
        assert!(picked.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
