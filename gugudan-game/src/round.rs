//! Round state machine: question progression, scoring, and streak tracking.
//!
//! ```text
//! AwaitingAnswer -(submit | expire)-> Resolved -(advance)-> AwaitingAnswer | Finished
//! ```
//!
//! Only the first resolution of a question counts; later submissions or
//! expiries for the same question are ignored.

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, QuizResult};
use crate::question::Question;
use crate::scoring::{Outcome, ScoringEvent, apply_delta, live_stars, scoring_event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingAnswer,
    Resolved,
    Finished,
}

/// Mutable progress of one round. Fields are only changed through the methods below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    correct_count: usize,
    current_streak: u32,
    max_streak: u32,
    /// Refreshed on correct answers only; misses leave the lit stars alone.
    #[serde(default)]
    live_stars: u8,
    phase: Phase,
    last_submitted: Option<u32>,
    last_event: Option<ScoringEvent>,
}

/// Serializable view of a round for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub question: Option<Question>,
    /// One-based number of the current question.
    pub question_number: usize,
    pub total_questions: usize,
    pub score: u32,
    pub correct_count: usize,
    pub current_streak: u32,
    pub max_streak: u32,
    pub live_stars: u8,
    pub phase: Phase,
    pub last_submitted: Option<u32>,
    pub last_event: Option<ScoringEvent>,
}

impl RoundState {
    /// Begin a round on question 0 with all counters at zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `questions` is empty.
    pub fn start(questions: Vec<Question>) -> QuizResult<Self> {
        if questions.is_empty() {
            return Err(QuizError::InvalidInput(
                "a round needs at least one question".to_string(),
            ));
        }
        Ok(Self {
            questions,
            current_index: 0,
            score: 0,
            correct_count: 0,
            current_streak: 0,
            max_streak: 0,
            live_stars: 0,
            phase: Phase::AwaitingAnswer,
            last_submitted: None,
            last_event: None,
        })
    }

    /// Resolve the current question with a submitted value.
    ///
    /// Returns `None` without touching state unless the round is awaiting an answer.
    pub fn submit_answer(&mut self, value: u32) -> Option<ScoringEvent> {
        let outcome = if self.current_question()?.is_correct(value) {
            Outcome::Correct
        } else {
            Outcome::Wrong
        };
        let event = self.resolve(outcome)?;
        self.last_submitted = Some(value);
        Some(event)
    }

    /// Resolve the current question as timed out.
    pub fn on_timer_expired(&mut self) -> Option<ScoringEvent> {
        self.resolve(Outcome::TimedOut)
    }

    fn resolve(&mut self, outcome: Outcome) -> Option<ScoringEvent> {
        if self.phase != Phase::AwaitingAnswer {
            return None;
        }
        let event = scoring_event(outcome, self.current_streak);
        self.score = apply_delta(self.score, event.score_delta);
        self.current_streak = event.streak_after;
        self.max_streak = self.max_streak.max(self.current_streak);
        if outcome == Outcome::Correct {
            self.correct_count += 1;
            self.live_stars = live_stars(self.correct_count, self.question_number());
        }
        self.phase = Phase::Resolved;
        self.last_event = Some(event);
        Some(event)
    }

    /// Move past a resolved question. Returns the new phase, or `None` if not resolved.
    pub fn advance(&mut self) -> Option<Phase> {
        if self.phase != Phase::Resolved {
            return None;
        }
        if self.current_index + 1 >= self.questions.len() {
            self.phase = Phase::Finished;
        } else {
            self.current_index += 1;
            self.phase = Phase::AwaitingAnswer;
            self.last_submitted = None;
            self.last_event = None;
        }
        Some(self.phase)
    }

    /// The question currently on screen; `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == Phase::Finished {
            return None;
        }
        self.questions.get(self.current_index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub const fn question_number(&self) -> usize {
        self.current_index + 1
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub const fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub const fn max_streak(&self) -> u32 {
        self.max_streak
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn last_submitted(&self) -> Option<u32> {
        self.last_submitted
    }

    #[must_use]
    pub const fn last_event(&self) -> Option<ScoringEvent> {
        self.last_event
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Stars lit as of the latest correct answer, measured against its
    /// one-based question number.
    #[must_use]
    pub const fn live_stars(&self) -> u8 {
        self.live_stars
    }

    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            question: self.current_question().cloned(),
            question_number: self.question_number(),
            total_questions: self.total_questions(),
            score: self.score,
            correct_count: self.correct_count,
            current_streak: self.current_streak,
            max_streak: self.max_streak,
            live_stars: self.live_stars(),
            phase: self.phase,
            last_submitted: self.last_submitted,
            last_event: self.last_event,
        }
    }
}
