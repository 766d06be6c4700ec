//! Round configuration with defaults and JSON loading.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    ANSWER_PAUSE_MS, DEFAULT_OPERAND_MAX, DEFAULT_OPERAND_MIN, DEFAULT_RANKING_SIZE,
    DEFAULT_TIMER_SECS, DEFAULT_TOTAL_QUESTIONS, INCLUSIVE_OPERAND_MIN, TIMEOUT_PAUSE_MS,
};
use crate::error::{QuizError, QuizResult};

/// Tunable parameters for a quiz round.
///
/// All fields default when missing from JSON, so partial overrides such as
/// `{"exclude_ones": false}` are valid configuration documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub total_questions: usize,
    pub operand_min: u32,
    pub operand_max: u32,
    /// Reject operand draws equal to 1 (the trivial times-one table).
    pub exclude_ones: bool,
    pub timer_secs: u64,
    /// Pause after an answered question before the next one appears.
    pub answer_pause_ms: u64,
    /// Pause after a timed-out question before the next one appears.
    pub timeout_pause_ms: u64,
    pub ranking_size: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            operand_min: DEFAULT_OPERAND_MIN,
            operand_max: DEFAULT_OPERAND_MAX,
            exclude_ones: true,
            timer_secs: DEFAULT_TIMER_SECS,
            answer_pause_ms: ANSWER_PAUSE_MS,
            timeout_pause_ms: TIMEOUT_PAUSE_MS,
            ranking_size: DEFAULT_RANKING_SIZE,
        }
    }
}

impl QuizConfig {
    /// Configuration matching the variant that keeps the times-one table:
    /// operands are drawn from `1..=9` with no rejection.
    #[must_use]
    pub fn including_ones() -> Self {
        Self {
            operand_min: INCLUSIVE_OPERAND_MIN,
            exclude_ones: false,
            ..Self::default()
        }
    }

    /// Parse configuration from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the JSON is malformed or describes an unplayable round.
    pub fn from_json(json: &str) -> QuizResult<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| QuizError::InvalidConfig(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that the configuration can produce a playable round.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first violated constraint.
    pub fn validate(&self) -> QuizResult<()> {
        if self.total_questions == 0 {
            return Err(QuizError::InvalidConfig(
                "total_questions must be at least 1".to_string(),
            ));
        }
        if self.operand_min == 0 || self.operand_min > self.operand_max {
            return Err(QuizError::InvalidConfig(format!(
                "operand range {}..={} is empty or includes zero",
                self.operand_min, self.operand_max
            )));
        }
        if self.operand_max.checked_mul(self.operand_max).is_none() {
            return Err(QuizError::InvalidConfig(format!(
                "operand_max {} overflows the answer range",
                self.operand_max
            )));
        }
        if self.exclude_ones && self.operand_max < 2 {
            return Err(QuizError::InvalidConfig(
                "operand range holds only 1 while ones are excluded".to_string(),
            ));
        }
        if self.timer_secs == 0 {
            return Err(QuizError::InvalidConfig(
                "timer_secs must be at least 1".to_string(),
            ));
        }
        if self.ranking_size == 0 {
            return Err(QuizError::InvalidConfig(
                "ranking_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn timer_duration(&self) -> Duration {
        Duration::from_secs(self.timer_secs)
    }

    #[must_use]
    pub const fn answer_pause(&self) -> Duration {
        Duration::from_millis(self.answer_pause_ms)
    }

    #[must_use]
    pub const fn timeout_pause(&self) -> Duration {
        Duration::from_millis(self.timeout_pause_ms)
    }
}
