//! End-of-round result calculation and personal-best comparison.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::FINAL_STAR_BANDS;
use crate::numbers::percent;
use crate::round::RoundState;
use crate::storage::ScoreRecord;

/// Feedback band shown on the result screen, aligned with the star tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encouragement {
    /// 90% or better
    Master,
    /// 70% or better
    Great,
    /// 50% or better
    GoodStart,
    KeepPracticing,
}

impl Encouragement {
    #[must_use]
    pub const fn from_stars(stars: u8) -> Self {
        match stars {
            3.. => Self::Master,
            2 => Self::Great,
            1 => Self::GoodStart,
            0 => Self::KeepPracticing,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Great => "great",
            Self::GoodStart => "good_start",
            Self::KeepPracticing => "keep_practicing",
        }
    }
}

impl fmt::Display for Encouragement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Final round figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    pub final_score: u32,
    pub accuracy_percent: u8,
    pub max_streak: u32,
    pub correct_count: usize,
    pub total_questions: usize,
    pub star_tier: u8,
    pub encouragement: Encouragement,
}

/// How this round compares with the player's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersonalBest {
    /// No earlier record for this player.
    First,
    /// Beat the earlier best.
    NewRecord { previous: u32 },
    /// Earlier best still stands (ties included).
    Standing { best: u32 },
}

impl PersonalBest {
    #[must_use]
    pub fn evaluate(previous_best: Option<u32>, score: u32) -> Self {
        match previous_best {
            None => Self::First,
            Some(previous) if score > previous => Self::NewRecord { previous },
            Some(best) => Self::Standing { best },
        }
    }

    #[must_use]
    pub const fn is_new_best(self) -> bool {
        matches!(self, Self::First | Self::NewRecord { .. })
    }
}

/// Star tier for a rounded accuracy percentage.
#[must_use]
pub fn star_tier(accuracy_percent: u8) -> u8 {
    let lit = FINAL_STAR_BANDS
        .iter()
        .filter(|band| accuracy_percent >= **band)
        .count();
    u8::try_from(lit).unwrap_or(u8::MAX)
}

/// Compute final figures from a round.
#[must_use]
pub fn finalize(round: &RoundState) -> Results {
    let accuracy_percent = percent(round.correct_count(), round.total_questions());
    let star_tier = star_tier(accuracy_percent);
    Results {
        final_score: round.score(),
        accuracy_percent,
        max_streak: round.max_streak(),
        correct_count: round.correct_count(),
        total_questions: round.total_questions(),
        star_tier,
        encouragement: Encouragement::from_stars(star_tier),
    }
}

/// Highest score recorded under `player_name`, if any.
#[must_use]
pub fn personal_best(records: &[ScoreRecord], player_name: &str) -> Option<u32> {
    records
        .iter()
        .filter(|record| record.player_name == player_name)
        .map(|record| record.score)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::Question;
    use chrono::Utc;

    fn round_with(correct: usize, total: usize) -> RoundState {
        let questions: Vec<Question> = (0..total)
            .map(|_| Question {
                operand_a: 3,
                operand_b: 4,
                correct_answer: 12,
                options: [12, 11, 13, 14],
            })
            .collect();
        let mut round = RoundState::start(questions).unwrap();
        for i in 0..total {
            if i < correct {
                round.submit_answer(12);
            } else {
                round.submit_answer(11);
            }
            round.advance();
        }
        round
    }

    #[test]
    fn star_bands() {
        assert_eq!(star_tier(100), 3);
        assert_eq!(star_tier(90), 3);
        assert_eq!(star_tier(89), 2);
        assert_eq!(star_tier(70), 2);
        assert_eq!(star_tier(69), 1);
        assert_eq!(star_tier(50), 1);
        assert_eq!(star_tier(49), 0);
        assert_eq!(star_tier(0), 0);
    }

    #[test]
    fn finalize_perfect_round() {
        let results = finalize(&round_with(10, 10));
        assert_eq!(results.final_score, 208);
        assert_eq!(results.accuracy_percent, 100);
        assert_eq!(results.star_tier, 3);
        assert_eq!(results.max_streak, 10);
        assert_eq!(results.encouragement, Encouragement::Master);
    }

    #[test]
    fn finalize_partial_round() {
        let results = finalize(&round_with(7, 10));
        assert_eq!(results.accuracy_percent, 70);
        assert_eq!(results.star_tier, 2);
        assert_eq!(results.encouragement, Encouragement::Great);

        let results = finalize(&round_with(2, 3));
        assert_eq!(results.accuracy_percent, 67);
        assert_eq!(results.encouragement, Encouragement::GoodStart);

        let results = finalize(&round_with(0, 10));
        assert_eq!(results.final_score, 0);
        assert_eq!(results.encouragement, Encouragement::KeepPracticing);
    }

    #[test]
    fn personal_best_filters_by_name() {
        let now = Utc::now();
        let records = vec![
            ScoreRecord::new("Alice", 80, 70, now),
            ScoreRecord::new("Bob", 150, 90, now),
            ScoreRecord::new("Alice", 120, 80, now),
        ];
        assert_eq!(personal_best(&records, "Alice"), Some(120));
        assert_eq!(personal_best(&records, "Carol"), None);
    }

    #[test]
    fn personal_best_evaluation() {
        assert_eq!(PersonalBest::evaluate(None, 50), PersonalBest::First);
        assert_eq!(
            PersonalBest::evaluate(Some(40), 50),
            PersonalBest::NewRecord { previous: 40 }
        );
        assert_eq!(
            PersonalBest::evaluate(Some(50), 50),
            PersonalBest::Standing { best: 50 }
        );
        assert!(PersonalBest::First.is_new_best());
        assert!(!PersonalBest::Standing { best: 1 }.is_new_best());
    }
}
