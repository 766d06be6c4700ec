use std::fmt;
use std::time::Duration;

use gugudan_game::Question;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const QUICK_THINK: Duration = Duration::from_millis(800);
const SLOW_THINK: Duration = Duration::from_millis(3_200);
/// Longer than any default countdown, so the timer always wins.
const TOO_SLOW: Duration = Duration::from_secs(6);

/// What a scripted player does with one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerDecision {
    /// `None` means the player never answers and waits out the timer.
    pub value: Option<u32>,
    /// Time spent before the answer is submitted.
    pub delay: Duration,
}

impl AnswerDecision {
    #[must_use]
    pub const fn answer(value: u32, delay: Duration) -> Self {
        Self {
            value: Some(value),
            delay,
        }
    }

    #[must_use]
    pub const fn idle() -> Self {
        Self {
            value: None,
            delay: Duration::ZERO,
        }
    }
}

/// Policy interface for automated players.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Decide how to answer the question at `index` (0-based).
    fn decide(&mut self, question: &Question, index: usize) -> AnswerDecision;
}

/// Built-in player strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Perfect,
    Sloppy,
    Idle,
    Late,
    Streaky,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 6] = [
        Self::Perfect,
        Self::Sloppy,
        Self::Idle,
        Self::Late,
        Self::Streaky,
        Self::Random,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Sloppy => "Sloppy",
            Self::Idle => "Idle",
            Self::Late => "Late",
            Self::Streaky => "Streaky",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Perfect => Box::new(PerfectPolicy),
            Self::Sloppy => Box::new(SloppyPolicy),
            Self::Idle => Box::new(IdlePolicy),
            Self::Late => Box::new(LatePolicy),
            Self::Streaky => Box::new(StreakyPolicy { miss_every: 4 }),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct PerfectPolicy;
struct SloppyPolicy;
struct IdlePolicy;
struct LatePolicy;

struct StreakyPolicy {
    miss_every: usize,
}

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn wrong_option(question: &Question) -> u32 {
    question
        .options
        .iter()
        .copied()
        .find(|option| !question.is_correct(*option))
        .unwrap_or_else(|| question.correct_answer.wrapping_add(1))
}

impl PlayerPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn decide(&mut self, question: &Question, _index: usize) -> AnswerDecision {
        AnswerDecision::answer(question.correct_answer, QUICK_THINK)
    }
}

impl PlayerPolicy for SloppyPolicy {
    fn name(&self) -> &'static str {
        "Sloppy"
    }

    fn decide(&mut self, question: &Question, _index: usize) -> AnswerDecision {
        AnswerDecision::answer(wrong_option(question), QUICK_THINK)
    }
}

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn decide(&mut self, _question: &Question, _index: usize) -> AnswerDecision {
        AnswerDecision::idle()
    }
}

impl PlayerPolicy for LatePolicy {
    fn name(&self) -> &'static str {
        "Late"
    }

    fn decide(&mut self, question: &Question, _index: usize) -> AnswerDecision {
        AnswerDecision::answer(question.correct_answer, TOO_SLOW)
    }
}

impl PlayerPolicy for StreakyPolicy {
    fn name(&self) -> &'static str {
        "Streaky"
    }

    fn decide(&mut self, question: &Question, index: usize) -> AnswerDecision {
        if (index + 1) % self.miss_every == 0 {
            AnswerDecision::answer(wrong_option(question), QUICK_THINK)
        } else {
            AnswerDecision::answer(question.correct_answer, QUICK_THINK)
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn decide(&mut self, question: &Question, _index: usize) -> AnswerDecision {
        match self.rng.gen_range(0..4) {
            0 => AnswerDecision::idle(),
            1 => AnswerDecision::answer(wrong_option(question), SLOW_THINK),
            2 => AnswerDecision::answer(question.correct_answer, TOO_SLOW),
            _ => {
                let idx = self.rng.gen_range(0..question.options.len());
                AnswerDecision::answer(question.options[idx], QUICK_THINK)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            operand_a: 7,
            operand_b: 8,
            correct_answer: 56,
            options: [49, 56, 60, 52],
        }
    }

    #[test]
    fn perfect_answers_correctly_and_quickly() {
        let mut policy = GameplayStrategy::Perfect.create_policy(1);
        let decision = policy.decide(&question(), 0);
        assert_eq!(decision.value, Some(56));
        assert!(decision.delay < Duration::from_secs(5));
    }

    #[test]
    fn sloppy_never_picks_the_answer() {
        let mut policy = GameplayStrategy::Sloppy.create_policy(1);
        let value = policy.decide(&question(), 3).value.unwrap();
        assert_ne!(value, 56);
        assert!(question().options.contains(&value));
    }

    #[test]
    fn idle_and_late_lose_to_the_timer() {
        let mut idle = GameplayStrategy::Idle.create_policy(1);
        assert_eq!(idle.decide(&question(), 0), AnswerDecision::idle());
        let mut late = GameplayStrategy::Late.create_policy(1);
        assert!(late.decide(&question(), 0).delay > Duration::from_secs(5));
    }

    #[test]
    fn streaky_misses_every_fourth() {
        let mut policy = GameplayStrategy::Streaky.create_policy(1);
        let picks: Vec<bool> = (0..8)
            .map(|idx| policy.decide(&question(), idx).value == Some(56))
            .collect();
        assert_eq!(picks, vec![true, true, true, false, true, true, true, false]);
    }

    #[test]
    fn random_is_seeded() {
        let mut a = GameplayStrategy::Random.create_policy(9);
        let mut b = GameplayStrategy::Random.create_policy(9);
        for idx in 0..20 {
            assert_eq!(a.decide(&question(), idx), b.decide(&question(), idx));
        }
    }

    #[test]
    fn labels_match_display() {
        for strategy in GameplayStrategy::ALL {
            assert_eq!(strategy.to_string(), strategy.label());
        }
    }
}
