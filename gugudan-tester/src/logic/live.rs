//! Real-time session: tokio countdowns, a ticker, and the scripted player
//! submitting through the same queue the timers use.

use anyhow::{Result, bail};
use colored::Colorize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

use gugudan_game::{
    AsyncAlarm, FinalReport, Messages, Outcome, PersistenceGateway, Phase, QuizEngine,
    SessionEvent, SessionInput, TokioClock, ranking_rows, spawn_ticker,
};

use crate::logic::policy::PlayerPolicy;
use crate::logic::simulation::SimulationPlan;

const TICK_PERIOD: Duration = Duration::from_millis(100);
const MAX_STARS: u8 = 3;

/// Play one session in real time, rendering progress to `out`.
///
/// # Errors
///
/// Returns an error if the session cannot start, the queue closes early, or
/// writing to `out` fails.
pub async fn run_live_session<G>(
    plan: &SimulationPlan,
    seed: u64,
    gateway: G,
    messages: &Messages,
    out: &mut dyn Write,
) -> Result<FinalReport>
where
    G: PersistenceGateway + Clone,
{
    let engine = QuizEngine::new(gateway, plan.config.clone())?.with_messages(messages.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = engine
        .create_session_with_clock(seed, TokioClock::new())
        .with_alarm(Box::new(AsyncAlarm::new(tx.clone())));
    let mut policy = plan.strategy.create_policy(seed);
    let ticker = spawn_ticker(tx.clone(), TICK_PERIOD);
    let mut player: Option<JoinHandle<()>> = None;
    let mut shown_secs = None;

    session.dispatch(SessionInput::Start {
        player_name: plan.player_name.clone(),
    })?;

    let report = 'session: loop {
        for event in session.drain_events() {
            match event {
                SessionEvent::SessionFinished { report } => break 'session report,
                SessionEvent::QuestionChanged {
                    ref question,
                    index,
                    ..
                } => {
                    if let Some(task) = player.take() {
                        task.abort();
                    }
                    player = schedule_answer(policy.as_mut(), question, index, &tx);
                    shown_secs = None;
                    render_event(out, engine.messages(), &event)?;
                }
                other => render_event(out, engine.messages(), &other)?,
            }
        }

        if session.phase() == Some(Phase::AwaitingAnswer) {
            let secs = session.remaining_secs();
            if shown_secs != Some(secs) {
                writeln!(out, "   ⏱  {secs}s")?;
                shown_secs = Some(secs);
            }
        }

        let Some(input) = rx.recv().await else {
            bail!("session queue closed before the round finished");
        };
        session.dispatch(input)?;
    };

    ticker.abort();
    if let Some(task) = player.take() {
        task.abort();
    }
    render_final_report(out, engine.messages(), &report)?;
    Ok(report)
}

fn schedule_answer(
    policy: &mut (dyn PlayerPolicy + Send),
    question: &gugudan_game::Question,
    index: usize,
    tx: &UnboundedSender<SessionInput>,
) -> Option<JoinHandle<()>> {
    let decision = policy.decide(question, index);
    let value = decision.value?;
    let tx = tx.clone();
    Some(tokio::spawn(async move {
        tokio::time::sleep(decision.delay).await;
        // The session may already be gone once the round is over.
        let _ = tx.send(SessionInput::Submit { value });
    }))
}

fn render_event(out: &mut dyn Write, messages: &Messages, event: &SessionEvent) -> Result<()> {
    match event {
        SessionEvent::QuestionChanged {
            question,
            index,
            total,
        } => {
            writeln!(out)?;
            writeln!(
                out,
                "{} {}",
                format!("[{}/{total}]", index + 1).cyan(),
                question.prompt().bold()
            )?;
            let options: Vec<String> = question.options.iter().map(u32::to_string).collect();
            writeln!(out, "   options: {}", options.join("  "))?;
        }
        SessionEvent::AnswerResolved { outcome } => {
            let line = match outcome {
                Outcome::Correct => "   ✅ correct".green(),
                Outcome::Wrong => "   ❌ wrong".red(),
                Outcome::TimedOut => "   ⌛ time's up".yellow(),
            };
            writeln!(out, "{line}")?;
        }
        SessionEvent::ScoreChanged { score, delta } => {
            writeln!(out, "   {delta:+} → {}", messages.points(*score))?;
        }
        SessionEvent::StreakAchieved { streak } => {
            writeln!(out, "   🔥 {}", messages.streak_banner(*streak).bright_magenta())?;
        }
        SessionEvent::SessionFinished { .. } => {}
    }
    Ok(())
}

fn star_line(lit: u8) -> String {
    (0..MAX_STARS)
        .map(|i| if i < lit { '★' } else { '☆' })
        .collect()
}

pub fn render_final_report(
    out: &mut dyn Write,
    messages: &Messages,
    report: &FinalReport,
) -> Result<()> {
    let results = &report.results;
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        messages.encouragement(results.encouragement).bright_cyan().bold()
    )?;
    writeln!(out, "{}", star_line(results.star_tier).yellow())?;
    writeln!(
        out,
        "Score: {}   Accuracy: {}%   Best streak: {}",
        messages.points(results.final_score),
        results.accuracy_percent,
        results.max_streak
    )?;
    writeln!(
        out,
        "{}",
        messages.personal_best(&report.player_name, results.final_score, report.personal_best)
    )?;

    writeln!(out)?;
    if report.ranking.is_empty() {
        writeln!(out, "{}", messages.ranking_empty)?;
        return Ok(());
    }
    for row in ranking_rows(&report.ranking, &report.player_name, results.final_score) {
        let line = format!(
            "{:>5}  {:<16} {}",
            messages.rank_label(row.rank),
            row.entry.name,
            messages.points(row.entry.score)
        );
        if row.is_current_player {
            writeln!(out, "{}", line.bright_green().bold())?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}
