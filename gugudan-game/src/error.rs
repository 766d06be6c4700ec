//! Error taxonomy for the quiz engine.
use thiserror::Error;

/// Errors surfaced by the quiz engine.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Caller supplied input the engine refuses (blank player name, empty question set).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Configuration values cannot produce a playable round.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Backing store could not be read, parsed, or written.
    #[error("persistence failure: {0}")]
    Persistence(String),
    /// A rejection-sampling loop gave up. Never expected for valid operand ranges.
    #[error("question generation starved after {attempts} draws")]
    GenerationStarvation { attempts: u32 },
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub type QuizResult<T> = Result<T, QuizError>;
