//! Question generation: operands, distractors, and fair option ordering.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::QuizConfig;
use crate::constants::{
    DISTRACTOR_OFFSET_MAX, DISTRACTOR_OFFSET_MIN, MAX_DRAW_ATTEMPTS, OPTION_COUNT,
    WRONG_OPTION_COUNT,
};
use crate::error::{QuizError, QuizResult};

/// A single multiplication problem with its four answer options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    pub operand_a: u32,
    pub operand_b: u32,
    pub correct_answer: u32,
    /// Display order of the options; exactly one equals `correct_answer`.
    pub options: [u32; OPTION_COUNT],
}

impl Question {
    #[must_use]
    pub const fn is_correct(&self, value: u32) -> bool {
        value == self.correct_answer
    }

    /// Position of the correct answer within `options`.
    #[must_use]
    pub fn correct_position(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|option| *option == self.correct_answer)
    }

    /// Prompt text as shown to the player, e.g. `7 × 8 = ?`.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{} × {} = ?", self.operand_a, self.operand_b)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prompt())
    }
}

/// Generate `count` questions using the operand policy in `cfg`.
///
/// # Errors
///
/// Returns `InvalidConfig` for an unusable operand range or zero count, and
/// `GenerationStarvation` if a rejection loop exceeds its draw cap.
pub fn generate<R: Rng>(
    count: usize,
    cfg: &QuizConfig,
    rng: &mut R,
) -> QuizResult<Vec<Question>> {
    if count == 0 {
        return Err(QuizError::InvalidConfig(
            "question count must be at least 1".to_string(),
        ));
    }
    if cfg.operand_min == 0 || cfg.operand_min > cfg.operand_max {
        return Err(QuizError::InvalidConfig(format!(
            "operand range {}..={} is empty or includes zero",
            cfg.operand_min, cfg.operand_max
        )));
    }
    (0..count).map(|_| generate_one(cfg, rng)).collect()
}

/// Generate a single question.
///
/// # Errors
///
/// Returns `GenerationStarvation` if operands or distractors cannot be drawn.
pub fn generate_one<R: Rng>(cfg: &QuizConfig, rng: &mut R) -> QuizResult<Question> {
    let (operand_a, operand_b) = draw_operands(cfg, rng)?;
    let correct_answer = operand_a.checked_mul(operand_b).ok_or_else(|| {
        QuizError::InvalidConfig(format!("{operand_a} × {operand_b} overflows the answer range"))
    })?;
    let wrong = draw_distractors(correct_answer, rng)?;

    let mut options = [correct_answer; OPTION_COUNT];
    options[1..].copy_from_slice(&wrong);
    options.shuffle(rng);

    Ok(Question {
        operand_a,
        operand_b,
        correct_answer,
        options,
    })
}

fn draw_operands<R: Rng>(cfg: &QuizConfig, rng: &mut R) -> QuizResult<(u32, u32)> {
    for _ in 0..MAX_DRAW_ATTEMPTS {
        let a = rng.gen_range(cfg.operand_min..=cfg.operand_max);
        let b = rng.gen_range(cfg.operand_min..=cfg.operand_max);
        if cfg.exclude_ones && (a == 1 || b == 1) {
            continue;
        }
        return Ok((a, b));
    }
    Err(QuizError::GenerationStarvation {
        attempts: MAX_DRAW_ATTEMPTS,
    })
}

fn draw_distractors<R: Rng>(
    correct: u32,
    rng: &mut R,
) -> QuizResult<[u32; WRONG_OPTION_COUNT]> {
    let mut picked = [0u32; WRONG_OPTION_COUNT];
    let mut filled = 0;
    let correct_wide = i64::from(correct);

    for _ in 0..MAX_DRAW_ATTEMPTS {
        if filled == WRONG_OPTION_COUNT {
            break;
        }
        let candidate =
            correct_wide + rng.gen_range(DISTRACTOR_OFFSET_MIN..=DISTRACTOR_OFFSET_MAX);
        let Ok(candidate) = u32::try_from(candidate) else {
            continue;
        };
        if candidate == 0 || candidate == correct || picked[..filled].contains(&candidate) {
            continue;
        }
        picked[filled] = candidate;
        filled += 1;
    }

    if filled < WRONG_OPTION_COUNT {
        return Err(QuizError::GenerationStarvation {
            attempts: MAX_DRAW_ATTEMPTS,
        });
    }
    Ok(picked)
}
