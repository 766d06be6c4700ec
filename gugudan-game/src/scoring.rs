//! Scoring policy: score deltas, streak updates, and live star rating.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    CORRECT_BASE_POINTS, LIVE_STAR_THRESHOLDS, STREAK_BONUS_MIN, STREAK_BONUS_PER_STEP,
    TIMEOUT_PENALTY, WRONG_PENALTY,
};
use crate::numbers::ratio;

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Wrong,
    TimedOut,
}

impl Outcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Wrong => "wrong",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringEvent {
    pub outcome: Outcome,
    pub score_delta: i32,
    pub streak_after: u32,
}

/// Map an outcome and the streak before it to `(score_delta, new_streak)`.
#[must_use]
pub fn score(outcome: Outcome, current_streak: u32) -> (i32, u32) {
    match outcome {
        Outcome::Correct => {
            let streak = current_streak.saturating_add(1);
            let mut delta = CORRECT_BASE_POINTS;
            if streak >= STREAK_BONUS_MIN {
                let bonus = i32::try_from(streak)
                    .unwrap_or(i32::MAX)
                    .saturating_mul(STREAK_BONUS_PER_STEP);
                delta = delta.saturating_add(bonus);
            }
            (delta, streak)
        }
        Outcome::Wrong => (WRONG_PENALTY, 0),
        Outcome::TimedOut => (TIMEOUT_PENALTY, 0),
    }
}

/// Apply a delta to a score, clamping at zero.
#[must_use]
pub fn apply_delta(score: u32, delta: i32) -> u32 {
    if delta >= 0 {
        score.saturating_add(delta.unsigned_abs())
    } else {
        score.saturating_sub(delta.unsigned_abs())
    }
}

/// Build the event for an outcome given the streak before it.
#[must_use]
pub fn scoring_event(outcome: Outcome, current_streak: u32) -> ScoringEvent {
    let (score_delta, streak_after) = score(outcome, current_streak);
    ScoringEvent {
        outcome,
        score_delta,
        streak_after,
    }
}

/// In-progress star count (0..=3) for `correct` answers out of `answered` questions.
#[must_use]
pub fn live_stars(correct: usize, answered: usize) -> u8 {
    let accuracy = ratio(correct, answered);
    let lit = LIVE_STAR_THRESHOLDS
        .iter()
        .filter(|threshold| accuracy >= **threshold)
        .count();
    u8::try_from(lit).unwrap_or(u8::MAX)
}
