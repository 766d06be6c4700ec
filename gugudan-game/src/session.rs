//! Per-game session binding the round, countdown, clock, and persistence.
//!
//! A session is an explicit object owned by the shell. Every input goes
//! through `&mut self`, so submissions and timer expiries are processed one
//! at a time and whichever reaches the session first resolves the question.

use chrono::Utc;
use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::QuizConfig;
use crate::constants::{LOG_TARGET_SESSION, STREAK_BONUS_MIN};
use crate::error::{QuizError, QuizResult};
use crate::question::{Question, generate};
use crate::results::{PersonalBest, Results, finalize, personal_best};
use crate::round::{Phase, RoundSnapshot, RoundState};
use crate::scoring::{Outcome, ScoringEvent};
use crate::storage::{PersistenceGateway, RankingEntry, ScoreRecord, insert_ranking};
use crate::timer::{Clock, Countdown, SystemClock, TimerAlarm, TimerHandle};

/// Serialized input accepted by [`QuizSession::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionInput {
    Start { player_name: String },
    Submit { value: u32 },
    TimerExpired { handle: TimerHandle },
    Tick,
    Reset,
}

/// Everything the result screen needs once a round is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub player_name: String,
    pub results: Results,
    pub personal_best: PersonalBest,
    pub ranking: Vec<RankingEntry>,
}

/// Notifications for the rendering shell, drained with [`QuizSession::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    QuestionChanged {
        question: Question,
        index: usize,
        total: usize,
    },
    ScoreChanged {
        score: u32,
        delta: i32,
    },
    StreakAchieved {
        streak: u32,
    },
    AnswerResolved {
        outcome: Outcome,
    },
    SessionFinished {
        report: FinalReport,
    },
}

pub struct QuizSession<G, C = SystemClock> {
    config: QuizConfig,
    gateway: G,
    clock: C,
    rng: ChaCha20Rng,
    countdown: Countdown,
    alarm: Option<Box<dyn TimerAlarm>>,
    player_name: Option<String>,
    round: Option<RoundState>,
    advance_at: Option<Duration>,
    report: Option<FinalReport>,
    events: Vec<SessionEvent>,
}

impl<G, C> QuizSession<G, C>
where
    G: PersistenceGateway,
    C: Clock,
{
    /// Construct an idle session. Question sets are drawn from `seed`.
    #[must_use]
    pub fn new(config: QuizConfig, gateway: G, clock: C, seed: u64) -> Self {
        Self {
            config,
            gateway,
            clock,
            rng: ChaCha20Rng::seed_from_u64(seed),
            countdown: Countdown::new(),
            alarm: None,
            player_name: None,
            round: None,
            advance_at: None,
            report: None,
            events: Vec::new(),
        }
    }

    /// Attach a push-style alarm that is armed alongside every countdown.
    #[must_use]
    pub fn with_alarm(mut self, alarm: Box<dyn TimerAlarm>) -> Self {
        self.alarm = Some(alarm);
        self
    }

    /// Start a round with a freshly generated question set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank name (the session is left untouched)
    /// and propagates generation failures.
    pub fn start_session(&mut self, player_name: &str) -> QuizResult<()> {
        let name = validate_name(player_name)?;
        let questions = generate(self.config.total_questions, &self.config, &mut self.rng)?;
        self.begin(name, questions)
    }

    /// Start a round with a caller-supplied question set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank name or an empty question set.
    pub fn start_session_with(
        &mut self,
        player_name: &str,
        questions: Vec<Question>,
    ) -> QuizResult<()> {
        let name = validate_name(player_name)?;
        self.begin(name, questions)
    }

    fn begin(&mut self, name: String, questions: Vec<Question>) -> QuizResult<()> {
        let round = RoundState::start(questions)?;
        self.cancel_timer();
        debug!(
            target: LOG_TARGET_SESSION,
            "starting round for {name} with {} questions",
            round.total_questions()
        );
        self.player_name = Some(name);
        self.round = Some(round);
        self.advance_at = None;
        self.report = None;
        self.events.clear();
        self.present_current_question();
        Ok(())
    }

    /// Return to the idle start state, cancelling any pending countdown.
    pub fn reset_session(&mut self) {
        self.cancel_timer();
        self.player_name = None;
        self.round = None;
        self.advance_at = None;
        self.report = None;
        self.events.clear();
        debug!(target: LOG_TARGET_SESSION, "session reset");
    }

    /// Submit an answer for the current question. Ignored unless awaiting an answer.
    pub fn submit_answer(&mut self, value: u32) -> Option<ScoringEvent> {
        let event = self.round.as_mut()?.submit_answer(value)?;
        self.after_resolution(event, self.config.answer_pause());
        Some(event)
    }

    /// Resolve the current question as timed out. Ignored unless awaiting an answer.
    pub fn on_timer_expired(&mut self) -> Option<ScoringEvent> {
        let event = self.round.as_mut()?.on_timer_expired()?;
        self.after_resolution(event, self.config.timeout_pause());
        Some(event)
    }

    /// Expiry from a specific countdown. Stale handles are ignored.
    pub fn expire(&mut self, handle: TimerHandle) -> Option<ScoringEvent> {
        if !self.countdown.is_armed(handle) {
            debug!(target: LOG_TARGET_SESSION, "ignoring stale timer {}", handle.id());
            return None;
        }
        self.on_timer_expired()
    }

    /// Move on from a resolved question, finishing the round after the last one.
    pub fn advance(&mut self) -> Option<Phase> {
        let phase = self.round.as_mut()?.advance()?;
        self.advance_at = None;
        match phase {
            Phase::AwaitingAnswer => self.present_current_question(),
            Phase::Finished => self.finish(),
            Phase::Resolved => {}
        }
        Some(phase)
    }

    /// Process time-based transitions: countdown expiry, then a due advance.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(handle) = self.countdown.poll(now) {
            if let Some(alarm) = self.alarm.as_mut() {
                alarm.disarm(handle);
            }
            self.on_timer_expired();
        }
        let now = self.clock.now();
        if self.advance_at.is_some_and(|at| now >= at) {
            self.advance();
        }
    }

    /// Apply one queued input.
    ///
    /// # Errors
    ///
    /// Propagates failures from starting a session.
    pub fn dispatch(&mut self, input: SessionInput) -> QuizResult<()> {
        match input {
            SessionInput::Start { player_name } => self.start_session(&player_name)?,
            SessionInput::Submit { value } => {
                self.submit_answer(value);
            }
            SessionInput::TimerExpired { handle } => {
                self.expire(handle);
            }
            SessionInput::Tick => self.tick(),
            SessionInput::Reset => self.reset_session(),
        }
        Ok(())
    }

    /// Take all pending notifications.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<RoundSnapshot> {
        self.round.as_ref().map(RoundState::snapshot)
    }

    #[must_use]
    pub const fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.round.as_ref().map(RoundState::phase)
    }

    #[must_use]
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    #[must_use]
    pub const fn report(&self) -> Option<&FinalReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Handle of the armed countdown, if a question is awaiting an answer.
    #[must_use]
    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.countdown.current()
    }

    /// Whole seconds left on the countdown, for display.
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs(self.clock.now())
    }

    /// When the next question is due after the resolution pause.
    #[must_use]
    pub const fn advance_due(&self) -> Option<Duration> {
        self.advance_at
    }

    fn present_current_question(&mut self) {
        let Some(round) = self.round.as_ref() else {
            return;
        };
        let Some(question) = round.current_question().cloned() else {
            return;
        };
        let index = round.current_index();
        let total = round.total_questions();
        self.events.push(SessionEvent::QuestionChanged {
            question,
            index,
            total,
        });
        self.arm_timer();
    }

    fn after_resolution(&mut self, event: ScoringEvent, pause: Duration) {
        self.cancel_timer();
        let score = self.round.as_ref().map_or(0, RoundState::score);
        debug!(
            target: LOG_TARGET_SESSION,
            "question resolved: {} ({:+}) score={score} streak={}",
            event.outcome,
            event.score_delta,
            event.streak_after
        );
        self.events.push(SessionEvent::AnswerResolved {
            outcome: event.outcome,
        });
        self.events.push(SessionEvent::ScoreChanged {
            score,
            delta: event.score_delta,
        });
        if event.outcome == Outcome::Correct && event.streak_after >= STREAK_BONUS_MIN {
            self.events.push(SessionEvent::StreakAchieved {
                streak: event.streak_after,
            });
        }
        self.advance_at = Some(self.clock.now().saturating_add(pause));
    }

    fn arm_timer(&mut self) {
        let duration = self.config.timer_duration();
        let handle = self.countdown.start(duration, self.clock.now());
        if let Some(alarm) = self.alarm.as_mut() {
            alarm.arm(handle, duration);
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.countdown.cancel_any()
            && let Some(alarm) = self.alarm.as_mut()
        {
            alarm.disarm(handle);
        }
    }

    fn finish(&mut self) {
        self.cancel_timer();
        let (Some(round), Some(name)) = (self.round.as_ref(), self.player_name.clone()) else {
            return;
        };
        let results = finalize(round);
        let report = self.record_results(name, results);
        debug!(
            target: LOG_TARGET_SESSION,
            "round finished: score={} accuracy={}%",
            report.results.final_score,
            report.results.accuracy_percent
        );
        self.events.push(SessionEvent::SessionFinished {
            report: report.clone(),
        });
        self.report = Some(report);
    }

    /// Persist the round and assemble the report. Storage failures are logged
    /// and replaced by empty collections; they never stop the round from finishing.
    fn record_results(&self, name: String, results: Results) -> FinalReport {
        let previous_best = match self.gateway.load_scores() {
            Ok(scores) => personal_best(&scores, &name),
            Err(err) => {
                warn!(target: LOG_TARGET_SESSION, "score history unavailable: {err}");
                None
            }
        };
        let personal_best = PersonalBest::evaluate(previous_best, results.final_score);
        let recorded_at = Utc::now();

        let record = ScoreRecord::new(
            name.clone(),
            results.final_score,
            results.accuracy_percent,
            recorded_at,
        );
        if let Err(err) = self.gateway.append_score(record) {
            warn!(target: LOG_TARGET_SESSION, "failed to save score: {err}");
        }

        let mut ranking = self.gateway.load_ranking().unwrap_or_else(|err| {
            warn!(target: LOG_TARGET_SESSION, "ranking unavailable: {err}");
            Vec::new()
        });
        insert_ranking(
            &mut ranking,
            RankingEntry::new(name.clone(), results.final_score, recorded_at),
            self.config.ranking_size,
        );
        if let Err(err) = self.gateway.save_ranking(&ranking) {
            warn!(target: LOG_TARGET_SESSION, "failed to save ranking: {err}");
        }

        FinalReport {
            player_name: name,
            results,
            personal_best,
            ranking,
        }
    }
}

fn validate_name(player_name: &str) -> QuizResult<String> {
    let trimmed = player_name.trim();
    if trimmed.is_empty() {
        return Err(QuizError::InvalidInput(
            "player name must not be blank".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
