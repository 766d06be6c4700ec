use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use gugudan_game::{JsonGateway, MemoryStore, Outcome};

use crate::common::FileStore;
use crate::common::scenario::TestScenario;
use crate::logic::simulation::{GameTester, SimulationPlan, SimulationSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub mean_score: f64,
    pub best_score: u32,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Where simulated sessions persist their scores and ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSelection {
    /// Fresh in-memory store per iteration.
    Memory,
    /// Shared directory store; rankings accumulate across iterations and runs.
    Directory(PathBuf),
}

pub struct LogicTester {
    tester: GameTester,
    store: StoreSelection,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(store: StoreSelection, verbose: bool) -> Self {
        Self {
            tester: GameTester::new(verbose),
            store,
            verbose,
        }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (strategy: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.strategy,
                    seed
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut scores = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = self.run_once(&scenario.plan, iteration_seed);
            performance_data.push(start_time.elapsed());

            let verdict = outcome.and_then(|summary| {
                if let Some(score) = summary.final_score() {
                    scores.push(score);
                }
                evaluate_expectations(&scenario.plan, &summary)
                    .map_err(|err| anyhow::anyhow!("{err:#} | {}", describe_turns(&summary)))
            });

            match verdict {
                Ok(()) => successes += 1,
                Err(err) => {
                    let message = format!(
                        "Iteration {} (strategy {}, seed {}): {err:#}",
                        i + 1,
                        scenario.plan.strategy,
                        iteration_seed
                    );
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            mean_score: mean(&scores),
            best_score: scores.iter().copied().max().unwrap_or(0),
            average_duration,
            performance_data,
        }
    }

    fn run_once(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        match &self.store {
            StoreSelection::Memory => {
                let gateway = JsonGateway::new(MemoryStore::new());
                self.tester.run_plan(plan, seed, gateway)
            }
            StoreSelection::Directory(dir) => {
                let gateway = JsonGateway::new(FileStore::open(dir)?);
                self.tester.run_plan(plan, seed, gateway)
            }
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(summary.report.is_some(), "session never finished");
    for expectation in &plan.expectations {
        expectation.evaluate(summary)?;
    }
    Ok(())
}

fn describe_turns(summary: &SimulationSummary) -> String {
    summary
        .turns
        .iter()
        .map(|turn| {
            let mark = match turn.outcome {
                Outcome::Correct => "O",
                Outcome::Wrong => "X",
                Outcome::TimedOut => "-",
            };
            format!("{}{mark}{:+}", turn.question.prompt(), turn.score_delta)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn mean(scores: &[u32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: f64 = scores.iter().map(|score| f64::from(*score)).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = scores.len() as f64;
    total / count
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
