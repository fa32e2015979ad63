//! Move accuracy scoring and quality classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Quality classification of one move, derived from its accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveClassification {
    Excellent,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl MoveClassification {
    /// Maps an accuracy in [0, 100] to its class.
    ///
    /// Thresholds: >= 90 excellent, >= 75 good, >= 50 inaccuracy,
    /// >= 25 mistake, else blunder. Boundary values belong to the higher
    /// class.
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 90.0 {
            MoveClassification::Excellent
        } else if accuracy >= 75.0 {
            MoveClassification::Good
        } else if accuracy >= 50.0 {
            MoveClassification::Inaccuracy
        } else if accuracy >= 25.0 {
            MoveClassification::Mistake
        } else {
            MoveClassification::Blunder
        }
    }
}

impl fmt::Display for MoveClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveClassification::Excellent => "excellent",
            MoveClassification::Good => "good",
            MoveClassification::Inaccuracy => "inaccuracy",
            MoveClassification::Mistake => "mistake",
            MoveClassification::Blunder => "blunder",
        };
        f.write_str(name)
    }
}

/// Whether two UCI moves share their origin or destination square.
///
/// Moves that touch the same square as the best move count as "close" and
/// are penalized more gently than unrelated moves.
pub fn moves_similar(a: &str, b: &str) -> bool {
    let squares = |m: &str| -> Option<(String, String)> {
        Some((m.get(0..2)?.to_string(), m.get(2..4)?.to_string()))
    };
    match (squares(a), squares(b)) {
        (Some((a_from, a_to)), Some((b_from, b_to))) => a_from == b_from || a_to == b_to,
        _ => false,
    }
}

/// Accuracy in [0, 100] for a played move against the engine's best move.
///
/// 100 for the best move itself. A "close" move (shared origin or
/// destination) floors at 70 and degrades with a tenth of the absolute
/// evaluation; an unrelated move floors at 0 and degrades with a fifth of
/// it.
pub fn move_accuracy(played: &str, best: &str, evaluation_cp: i32) -> f64 {
    if played == best {
        return 100.0;
    }
    let magnitude = f64::from(evaluation_cp.abs());
    if moves_similar(played, best) {
        (100.0 - magnitude / 10.0).max(70.0)
    } else {
        (100.0 - magnitude / 5.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_move_is_always_100() {
        for eval in [-10_000, -300, 0, 42, 10_000] {
            assert_eq!(move_accuracy("e2e4", "e2e4", eval), 100.0);
        }
    }

    #[test]
    fn test_similar_move_shares_origin_or_destination() {
        assert!(moves_similar("e2e4", "e2e3")); // same origin
        assert!(moves_similar("d2e4", "e2e4")); // same destination
        assert!(!moves_similar("a7a6", "e2e4"));
        assert!(!moves_similar("e2", "e2e4")); // malformed
    }

    #[test]
    fn test_similar_move_floors_at_70() {
        // Same origin square, enormous disadvantage.
        assert_eq!(move_accuracy("e2e3", "e2e4", 2000), 70.0);
        // Mild disadvantage degrades from 100.
        assert_eq!(move_accuracy("e2e3", "e2e4", 100), 90.0);
    }

    #[test]
    fn test_unrelated_move_floors_at_0() {
        assert_eq!(move_accuracy("a7a6", "e2e4", 2000), 0.0);
        assert_eq!(move_accuracy("a7a6", "e2e4", 100), 80.0);
        // Evaluation sign does not matter, only magnitude.
        assert_eq!(move_accuracy("a7a6", "e2e4", -100), 80.0);
    }

    #[test]
    fn test_classification_boundaries_belong_to_higher_class() {
        assert_eq!(
            MoveClassification::from_accuracy(90.0),
            MoveClassification::Excellent
        );
        assert_eq!(
            MoveClassification::from_accuracy(89.9),
            MoveClassification::Good
        );
        assert_eq!(
            MoveClassification::from_accuracy(75.0),
            MoveClassification::Good
        );
        assert_eq!(
            MoveClassification::from_accuracy(50.0),
            MoveClassification::Inaccuracy
        );
        assert_eq!(
            MoveClassification::from_accuracy(25.0),
            MoveClassification::Mistake
        );
        assert_eq!(
            MoveClassification::from_accuracy(24.9),
            MoveClassification::Blunder
        );
        assert_eq!(
            MoveClassification::from_accuracy(0.0),
            MoveClassification::Blunder
        );
    }

    proptest! {
        #[test]
        fn prop_accuracy_stays_in_range(eval in -20_000i32..20_000) {
            let close = move_accuracy("e2e3", "e2e4", eval);
            prop_assert!((0.0..=100.0).contains(&close));
            prop_assert!(close >= 70.0);

            let unrelated = move_accuracy("a7a6", "e2e4", eval);
            prop_assert!((0.0..=100.0).contains(&unrelated));
        }

        #[test]
        fn prop_every_accuracy_maps_to_exactly_one_class(acc in 0.0f64..=100.0) {
            // from_accuracy is total over the range; spot-check ordering too.
            let class = MoveClassification::from_accuracy(acc);
            let expected = if acc >= 90.0 {
                MoveClassification::Excellent
            } else if acc >= 75.0 {
                MoveClassification::Good
            } else if acc >= 50.0 {
                MoveClassification::Inaccuracy
            } else if acc >= 25.0 {
                MoveClassification::Mistake
            } else {
                MoveClassification::Blunder
            };
            prop_assert_eq!(class, expected);
        }
    }
}
