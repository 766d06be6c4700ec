//! Centralized tuning constants for Gugudan game logic.
//!
//! These values define the scoring math and pacing of a round. `QuizConfig`
//! defaults are built from them so the numbers live in one reviewed place.

// Round shape --------------------------------------------------------------
pub const DEFAULT_TOTAL_QUESTIONS: usize = 10;
pub const DEFAULT_OPERAND_MIN: u32 = 2;
pub const DEFAULT_OPERAND_MAX: u32 = 9;
/// Lower bound used when the times-one exclusion is switched off.
pub const INCLUSIVE_OPERAND_MIN: u32 = 1;
pub const OPTION_COUNT: usize = 4;
pub const WRONG_OPTION_COUNT: usize = OPTION_COUNT - 1;
/// Distractors are drawn from `correct + DISTRACTOR_OFFSET_MIN..=DISTRACTOR_OFFSET_MAX`.
pub const DISTRACTOR_OFFSET_MIN: i64 = -10;
pub const DISTRACTOR_OFFSET_MAX: i64 = 9;
/// Upper bound on rejection-sampling draws before giving up.
pub const MAX_DRAW_ATTEMPTS: u32 = 10_000;

// Scoring ------------------------------------------------------------------
pub const CORRECT_BASE_POINTS: i32 = 10;
pub const STREAK_BONUS_MIN: u32 = 2;
pub const STREAK_BONUS_PER_STEP: i32 = 2;
pub const WRONG_PENALTY: i32 = -5;
pub const TIMEOUT_PENALTY: i32 = -10;
/// Live star thresholds on the running accuracy ratio.
pub const LIVE_STAR_THRESHOLDS: [f64; 3] = [0.33, 0.66, 0.99];
/// Final star bands on the rounded accuracy percentage (3, 2, 1 stars).
pub const FINAL_STAR_BANDS: [u8; 3] = [90, 70, 50];

// Timing -------------------------------------------------------------------
pub const DEFAULT_TIMER_SECS: u64 = 5;
pub const ANSWER_PAUSE_MS: u64 = 2_000;
pub const TIMEOUT_PAUSE_MS: u64 = 1_500;

// Persistence --------------------------------------------------------------
pub const SCORES_KEY: &str = "gugudan-scores";
pub const RANKING_KEY: &str = "gugudan-ranking";
pub const DEFAULT_RANKING_SIZE: usize = 5;

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_SESSION: &str = "gugudan::session";
pub(crate) const LOG_TARGET_STORAGE: &str = "gugudan::storage";
#[cfg(feature = "async")]
pub(crate) const LOG_TARGET_TIMER: &str = "gugudan::timer";
