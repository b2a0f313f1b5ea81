// Decision logic
// Picks the predicted class from a model score vector

use serde::{Deserialize, Serialize};

use crate::classify::types::{BeatClass, ScoreVector};

/// Outcome of a single classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Predicted class
    pub class: BeatClass,

    /// Index of the winning score
    pub index: usize,

    /// Score of the winning class
    pub confidence: f32,
}

/// Argmax over the score vector
///
/// Scans left to right and only moves on a strictly greater score, so ties go
/// to the lowest index. NaN never compares greater and therefore never wins
/// against an earlier score.
pub fn decide(scores: &ScoreVector) -> Decision {
    let values = scores.as_slice();
    let mut best = 0;
    for (i, &score) in values.iter().enumerate().skip(1) {
        if score > values[best] {
            best = i;
        }
    }

    Decision {
        // Score vectors always hold one entry per class
        class: BeatClass::ALL[best],
        index: best,
        confidence: values[best],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_maximum() {
        let decision = decide(&ScoreVector([0.05, 0.1, 0.7, 0.1, 0.05]));
        assert_eq!(decision.index, 2);
        assert_eq!(decision.class, BeatClass::Supraventricular);
        assert_eq!(decision.confidence, 0.7);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let decision = decide(&ScoreVector([0.2, 0.9, 0.9, 0.1, 0.0]));
        assert_eq!(decision.index, 1);
        assert_eq!(decision.class, BeatClass::Ventricular);
    }

    #[test]
    fn test_all_equal_selects_first() {
        let decision = decide(&ScoreVector([0.2; 5]));
        assert_eq!(decision.class, BeatClass::Normal);
    }

    #[test]
    fn test_last_class_reachable() {
        let decision = decide(&ScoreVector([0.0, 0.0, 0.0, 0.0, 1.0]));
        assert_eq!(decision.class, BeatClass::Other);
    }

    #[test]
    fn test_nan_does_not_win() {
        let decision = decide(&ScoreVector([0.1, f32::NAN, 0.05, 0.0, 0.0]));
        assert_eq!(decision.class, BeatClass::Normal);
    }

    #[test]
    fn test_decide_is_pure() {
        let scores = ScoreVector([0.1, 0.3, 0.3, 0.25, 0.05]);
        let first = decide(&scores);
        for _ in 0..10 {
            assert_eq!(decide(&scores), first);
        }
    }
}
