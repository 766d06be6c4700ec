use std::sync::Arc;

use anyhow::{Context, Result};
use gugudan_game::{
    FinalReport, ManualClock, Outcome, PersistenceGateway, Phase, QuizConfig, QuizEngine,
    Question, SessionEvent,
};
use log::debug;

use crate::logic::policy::{AnswerDecision, GameplayStrategy};

pub const DEFAULT_PLAYER: &str = "Tester";

/// Declarative plan for one scripted session.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub config: QuizConfig,
    pub player_name: String,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            config: QuizConfig::default(),
            player_name: DEFAULT_PLAYER.to_string(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_player(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// One resolved question.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub index: usize,
    pub question: Question,
    pub decision: AnswerDecision,
    pub outcome: Outcome,
    pub score_delta: i32,
    pub score_after: u32,
    pub streak_after: u32,
    pub max_streak_after: u32,
    /// The player submitted after the timer had already resolved the question.
    pub submit_ignored: bool,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub config: QuizConfig,
    pub player_name: String,
    pub turns: Vec<TurnRecord>,
    pub events: Vec<SessionEvent>,
    pub report: Option<FinalReport>,
}

impl SimulationSummary {
    #[must_use]
    pub fn final_score(&self) -> Option<u32> {
        self.report.as_ref().map(|report| report.results.final_score)
    }

    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.turns
            .iter()
            .filter(|turn| turn.outcome == outcome)
            .count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GameTester {
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Play `plan` to completion on a manual clock against `gateway`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected, the session cannot
    /// start, or the round stops making progress.
    pub fn run_plan<G>(&self, plan: &SimulationPlan, seed: u64, gateway: G) -> Result<SimulationSummary>
    where
        G: PersistenceGateway + Clone,
    {
        let engine = QuizEngine::new(gateway, plan.config.clone())?;
        let clock = ManualClock::new();
        let mut session = engine.create_session_with_clock(seed, clock.clone());
        let mut policy = plan.strategy.create_policy(seed);
        let timer = plan.config.timer_duration();
        let pause = plan.config.answer_pause().max(plan.config.timeout_pause());

        session.start_session(&plan.player_name)?;

        let mut turns = Vec::with_capacity(plan.config.total_questions);
        let mut events = Vec::new();
        while session.phase() == Some(Phase::AwaitingAnswer) {
            let round = session.round().context("session lost its round")?;
            let index = round.current_index();
            let question = round
                .current_question()
                .cloned()
                .context("no question while awaiting an answer")?;
            let decision = policy.decide(&question, index);

            let mut submit_ignored = false;
            if let Some(value) = decision.value {
                clock.advance(decision.delay);
                session.tick();
                submit_ignored = session.submit_answer(value).is_none();
            } else {
                clock.advance(timer);
                session.tick();
            }

            let snapshot = session.snapshot().context("session lost its round")?;
            let event = snapshot
                .last_event
                .with_context(|| format!("question {} left unresolved", index + 1))?;
            if self.verbose {
                debug!(
                    "seed {seed} q{} {} -> {} ({:+}) score {}",
                    index + 1,
                    question.prompt(),
                    event.outcome,
                    event.score_delta,
                    snapshot.score
                );
            }
            turns.push(TurnRecord {
                index,
                question,
                decision,
                outcome: event.outcome,
                score_delta: event.score_delta,
                score_after: snapshot.score,
                streak_after: snapshot.current_streak,
                max_streak_after: snapshot.max_streak,
                submit_ignored,
            });

            clock.advance(pause);
            session.tick();
            events.extend(session.drain_events());
        }
        events.extend(session.drain_events());

        Ok(SimulationSummary {
            seed,
            strategy: plan.strategy,
            config: plan.config.clone(),
            player_name: plan.player_name.clone(),
            turns,
            events,
            report: session.report().cloned(),
        })
    }
}
