//! Gugudan Quiz Engine
//!
//! Platform-agnostic core of a timed multiplication-table quiz.
//! This crate provides question generation, scoring, the per-question countdown,
//! round state, results, and persistence seams without any UI dependencies.

pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod numbers;
pub mod question;
pub mod results;
pub mod round;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod timer;

// Re-export commonly used types
pub use config::QuizConfig;
pub use error::{QuizError, QuizResult};
pub use messages::Messages;
pub use question::{Question, generate, generate_one};
pub use results::{Encouragement, PersonalBest, Results, finalize, personal_best, star_tier};
pub use round::{Phase, RoundSnapshot, RoundState};
pub use scoring::{Outcome, ScoringEvent, apply_delta, live_stars, score, scoring_event};
pub use session::{FinalReport, QuizSession, SessionEvent, SessionInput};
pub use storage::{
    JsonGateway, KeyValueStore, MemoryStore, PersistenceGateway, RankingEntry, RankingRow,
    ScoreRecord, insert_ranking, ranking_rows,
};
pub use timer::{Clock, Countdown, ManualClock, SystemClock, TimerAlarm, TimerHandle};

#[cfg(feature = "async")]
pub use timer::driver::{AsyncAlarm, TokioClock, spawn_ticker};

/// Entry point for shells: binds a persistence gateway and configuration and
/// hands out sessions that share the same backing store.
#[derive(Debug, Clone)]
pub struct QuizEngine<G>
where
    G: PersistenceGateway + Clone,
{
    config: QuizConfig,
    gateway: G,
    messages: Messages,
}

impl<G> QuizEngine<G>
where
    G: PersistenceGateway + Clone,
{
    /// Create an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration cannot produce a round.
    pub fn new(gateway: G, config: QuizConfig) -> QuizResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            gateway,
            messages: Messages::default(),
        })
    }

    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub const fn messages(&self) -> &Messages {
        &self.messages
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Create an idle session on the wall clock.
    #[must_use]
    pub fn create_session(&self, seed: u64) -> QuizSession<G, SystemClock> {
        self.create_session_with_clock(seed, SystemClock::new())
    }

    /// Create an idle session driven by a caller-supplied clock.
    #[must_use]
    pub fn create_session_with_clock<C: Clock>(&self, seed: u64, clock: C) -> QuizSession<G, C> {
        QuizSession::new(self.config.clone(), self.gateway.clone(), clock, seed)
    }

    /// Best recorded score for `player_name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the score history cannot be read.
    pub fn personal_best(&self, player_name: &str) -> QuizResult<Option<u32>> {
        let scores = self.gateway.load_scores()?;
        Ok(personal_best(&scores, player_name))
    }

    /// Current leaderboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the ranking cannot be read.
    pub fn ranking(&self) -> QuizResult<Vec<RankingEntry>> {
        self.gateway.load_ranking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct TestStore {
        entries: Rc<RefCell<HashMap<String, String>>>,
    }

    impl KeyValueStore for TestStore {
        type Error = Infallible;

        fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn list(&self) -> Result<Vec<String>, Self::Error> {
            let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
            keys.sort();
            Ok(keys)
        }
    }

    fn engine() -> QuizEngine<JsonGateway<TestStore>> {
        QuizEngine::new(JsonGateway::new(TestStore::default()), QuizConfig::default()).unwrap()
    }

    fn play_through<C: Clock>(session: &mut QuizSession<JsonGateway<TestStore>, C>, correct: bool) {
        while let Some(question) = session.round().and_then(RoundState::current_question) {
            let answer = if correct {
                question.correct_answer
            } else {
                question.correct_answer + 1
            };
            session.submit_answer(answer);
            session.advance();
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let config = QuizConfig {
            total_questions: 0,
            ..QuizConfig::default()
        };
        assert!(matches!(
            QuizEngine::new(JsonGateway::new(TestStore::default()), config),
            Err(QuizError::InvalidConfig(_))
        ));
    }

    #[test]
    fn sessions_share_the_backing_store() {
        let engine = engine();
        let mut first = engine.create_session_with_clock(1, ManualClock::new());
        first.start_session("Alice").unwrap();
        play_through(&mut first, true);

        let mut second = engine.create_session_with_clock(2, ManualClock::new());
        second.start_session("Alice").unwrap();
        play_through(&mut second, false);

        assert_eq!(engine.personal_best("Alice").unwrap(), Some(208));
        assert_eq!(engine.personal_best("Bob").unwrap(), None);
        let report = second.report().unwrap();
        assert_eq!(report.personal_best, PersonalBest::Standing { best: 208 });

        let ranking = engine.ranking().unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].score, 208);
        assert_eq!(ranking[1].score, 0);
        assert_eq!(
            engine.gateway().store().list().unwrap(),
            vec!["gugudan-ranking".to_string(), "gugudan-scores".to_string()]
        );
    }

    #[test]
    fn same_seed_same_questions() {
        let engine = engine();
        let mut a = engine.create_session_with_clock(99, ManualClock::new());
        let mut b = engine.create_session_with_clock(99, ManualClock::new());
        a.start_session("A").unwrap();
        b.start_session("B").unwrap();
        assert_eq!(
            a.round().map(RoundState::questions),
            b.round().map(RoundState::questions)
        );
    }
}
