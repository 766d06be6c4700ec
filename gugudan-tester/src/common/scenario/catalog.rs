use std::collections::HashSet;

use anyhow::{Result, ensure};
use gugudan_game::numbers::percent;
use gugudan_game::{Encouragement, Outcome, QuizConfig, SessionEvent, apply_delta, score};

use crate::common::scenario::TestScenario;
use crate::logic::{GameplayStrategy, SimulationPlan, SimulationSummary};

pub fn catalog_scenarios() -> Vec<(&'static str, TestScenario)> {
    vec![
        (
            "smoke",
            TestScenario::simulation(
                "Perfect Round",
                SimulationPlan::new(GameplayStrategy::Perfect).with_expectation(perfect_expectation),
            ),
        ),
        (
            "questions",
            TestScenario::simulation(
                "Question Invariants",
                SimulationPlan::new(GameplayStrategy::Random)
                    .with_expectation(question_invariants_expectation),
            ),
        ),
        (
            "sloppy",
            TestScenario::simulation(
                "All Wrong Answers",
                SimulationPlan::new(GameplayStrategy::Sloppy)
                    .with_expectation(all_wrong_expectation),
            ),
        ),
        (
            "idle",
            TestScenario::simulation(
                "Every Question Times Out",
                SimulationPlan::new(GameplayStrategy::Idle).with_expectation(timeout_expectation),
            ),
        ),
        (
            "late",
            TestScenario::simulation(
                "Submissions After Expiry",
                SimulationPlan::new(GameplayStrategy::Late)
                    .with_expectation(timeout_expectation)
                    .with_expectation(late_submit_expectation),
            ),
        ),
        (
            "streaky",
            TestScenario::simulation(
                "Streak Bonus and Reset",
                SimulationPlan::new(GameplayStrategy::Streaky)
                    .with_expectation(streak_expectation)
                    .with_expectation(score_ledger_expectation),
            ),
        ),
        (
            "random",
            TestScenario::simulation(
                "Mixed Play Score Ledger",
                SimulationPlan::new(GameplayStrategy::Random)
                    .with_expectation(score_ledger_expectation)
                    .with_expectation(streak_expectation),
            ),
        ),
        (
            "ranking",
            TestScenario::simulation(
                "Leaderboard Ordering",
                SimulationPlan::new(GameplayStrategy::Random).with_expectation(ranking_expectation),
            ),
        ),
        (
            "events",
            TestScenario::simulation(
                "Session Event Stream",
                SimulationPlan::new(GameplayStrategy::Streaky).with_expectation(events_expectation),
            ),
        ),
        (
            "ones",
            TestScenario::simulation(
                "Times-One Variant",
                SimulationPlan::new(GameplayStrategy::Perfect)
                    .with_config(QuizConfig::including_ones())
                    .with_expectation(perfect_expectation)
                    .with_expectation(question_invariants_expectation),
            ),
        ),
    ]
}

/// Score for answering every question correctly under the default scoring policy.
fn perfect_total(questions: usize) -> u32 {
    let mut total = 0;
    let mut streak = 0;
    for _ in 0..questions {
        let (delta, next) = score(Outcome::Correct, streak);
        total = apply_delta(total, delta);
        streak = next;
    }
    total
}

fn perfect_expectation(summary: &SimulationSummary) -> Result<()> {
    let report = summary.report.as_ref().map(|r| &r.results);
    let Some(results) = report else {
        anyhow::bail!("no results");
    };
    let expected = perfect_total(summary.config.total_questions);
    ensure!(
        results.final_score == expected,
        "perfect round scored {} instead of {expected}",
        results.final_score
    );
    ensure!(results.accuracy_percent == 100, "accuracy below 100%");
    ensure!(results.star_tier == 3, "perfect round earned {} stars", results.star_tier);
    ensure!(results.encouragement == Encouragement::Master, "wrong encouragement tier");
    ensure!(
        usize::try_from(results.max_streak).ok() == Some(summary.config.total_questions),
        "max streak {} does not cover the round",
        results.max_streak
    );
    Ok(())
}

fn question_invariants_expectation(summary: &SimulationSummary) -> Result<()> {
    let cfg = &summary.config;
    for turn in &summary.turns {
        let q = &turn.question;
        ensure!(
            q.correct_answer == q.operand_a * q.operand_b,
            "{} has answer {}",
            q.prompt(),
            q.correct_answer
        );
        for operand in [q.operand_a, q.operand_b] {
            ensure!(
                (cfg.operand_min..=cfg.operand_max).contains(&operand),
                "operand {operand} outside {}..={}",
                cfg.operand_min,
                cfg.operand_max
            );
            ensure!(!(cfg.exclude_ones && operand == 1), "times-one drawn: {}", q.prompt());
        }
        let distinct: HashSet<u32> = q.options.iter().copied().collect();
        ensure!(distinct.len() == q.options.len(), "duplicate options in {:?}", q.options);
        ensure!(q.options.iter().all(|o| *o > 0), "non-positive option in {:?}", q.options);
        let hits = q.options.iter().filter(|o| **o == q.correct_answer).count();
        ensure!(hits == 1, "answer appears {hits} times in {:?}", q.options);
    }
    Ok(())
}

fn all_wrong_expectation(summary: &SimulationSummary) -> Result<()> {
    let total = summary.config.total_questions;
    ensure!(summary.count(Outcome::Wrong) == total, "expected {total} wrong answers");
    let Some(report) = summary.report.as_ref() else {
        anyhow::bail!("no results");
    };
    let results = &report.results;
    ensure!(results.final_score == 0, "score {} should clamp at 0", results.final_score);
    ensure!(results.star_tier == 0, "no stars expected");
    ensure!(results.max_streak == 0, "no streak expected");
    ensure!(results.encouragement == Encouragement::KeepPracticing, "wrong encouragement tier");
    Ok(())
}

fn timeout_expectation(summary: &SimulationSummary) -> Result<()> {
    let total = summary.config.total_questions;
    ensure!(
        summary.count(Outcome::TimedOut) == total,
        "expected {total} timeouts, saw {}",
        summary.count(Outcome::TimedOut)
    );
    ensure!(
        summary.turns.iter().all(|turn| turn.score_after == 0),
        "timeouts must never raise the score"
    );
    Ok(())
}

fn late_submit_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.turns.iter().all(|turn| turn.submit_ignored),
        "a submission after expiry changed the round"
    );
    Ok(())
}

fn streak_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut previous_max = 0;
    for turn in &summary.turns {
        match turn.outcome {
            Outcome::Correct => {
                let n = turn.streak_after;
                let bonus = if n >= 2 { 2 * n } else { 0 };
                ensure!(
                    u32::try_from(turn.score_delta).ok() == Some(10 + bonus),
                    "streak {n} paid {:+}",
                    turn.score_delta
                );
            }
            Outcome::Wrong | Outcome::TimedOut => {
                ensure!(turn.streak_after == 0, "streak survived a {}", turn.outcome);
                ensure!(
                    turn.max_streak_after == previous_max,
                    "max streak moved on a {}",
                    turn.outcome
                );
            }
        }
        ensure!(turn.max_streak_after >= previous_max, "max streak decreased");
        previous_max = turn.max_streak_after;
    }
    Ok(())
}

fn score_ledger_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut running = 0;
    for turn in &summary.turns {
        running = apply_delta(running, turn.score_delta);
        ensure!(
            turn.score_after == running,
            "score {} after q{} disagrees with ledger {running}",
            turn.score_after,
            turn.index + 1
        );
    }
    let Some(report) = summary.report.as_ref() else {
        anyhow::bail!("no results");
    };
    ensure!(report.results.final_score == running, "final score disagrees with ledger");
    let expected_accuracy = percent(summary.count(Outcome::Correct), summary.turns.len());
    ensure!(
        report.results.accuracy_percent == expected_accuracy,
        "accuracy {} != {expected_accuracy}",
        report.results.accuracy_percent
    );
    Ok(())
}

fn ranking_expectation(summary: &SimulationSummary) -> Result<()> {
    let Some(report) = summary.report.as_ref() else {
        anyhow::bail!("no results");
    };
    let ranking = &report.ranking;
    ensure!(!ranking.is_empty(), "ranking is empty after a finished round");
    ensure!(
        ranking.len() <= summary.config.ranking_size,
        "ranking holds {} entries",
        ranking.len()
    );
    ensure!(
        ranking.windows(2).all(|pair| pair[0].score >= pair[1].score),
        "ranking is not sorted"
    );
    let lowest = ranking.last().map_or(0, |entry| entry.score);
    if ranking.len() < summary.config.ranking_size || report.results.final_score > lowest {
        ensure!(
            ranking
                .iter()
                .any(|entry| entry.name == summary.player_name
                    && entry.score == report.results.final_score),
            "qualifying score missing from ranking"
        );
    }
    Ok(())
}

fn events_expectation(summary: &SimulationSummary) -> Result<()> {
    let total = summary.config.total_questions;
    let indices: Vec<usize> = summary
        .events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::QuestionChanged { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    ensure!(indices == (0..total).collect::<Vec<_>>(), "question order {indices:?}");

    let resolved = summary
        .events
        .iter()
        .filter(|event| matches!(event, SessionEvent::AnswerResolved { .. }))
        .count();
    ensure!(resolved == total, "{resolved} resolutions for {total} questions");

    let streak_events = summary
        .events
        .iter()
        .filter(|event| matches!(event, SessionEvent::StreakAchieved { .. }))
        .count();
    let streak_turns = summary
        .turns
        .iter()
        .filter(|turn| turn.outcome == Outcome::Correct && turn.streak_after >= 2)
        .count();
    ensure!(streak_events == streak_turns, "streak events {streak_events} != {streak_turns}");

    let finished: Vec<usize> = summary
        .events
        .iter()
        .enumerate()
        .filter(|(_, event)| matches!(event, SessionEvent::SessionFinished { .. }))
        .map(|(idx, _)| idx)
        .collect();
    ensure!(
        finished == vec![summary.events.len().saturating_sub(1)],
        "session-finished must be emitted once, last"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_total_matches_formula() {
        assert_eq!(perfect_total(10), 208);
        assert_eq!(perfect_total(1), 10);
        assert_eq!(perfect_total(0), 0);
    }

    #[test]
    fn scenario_keys_are_unique() {
        let keys: HashSet<&str> = catalog_scenarios().iter().map(|(key, _)| *key).collect();
        assert_eq!(keys.len(), catalog_scenarios().len());
    }
}
