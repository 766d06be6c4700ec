pub mod catalog;

use gugudan_game::QuizConfig;

use crate::logic::SimulationPlan;
use catalog::catalog_scenarios;

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }

    /// Swap in the times-one variant while keeping the rest of the plan's config.
    #[must_use]
    pub fn including_ones(mut self) -> Self {
        self.plan.config = QuizConfig {
            operand_min: QuizConfig::including_ones().operand_min,
            exclude_ones: false,
            ..self.plan.config
        };
        self
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "smoke" | "perfect" => "smoke",
        "questions" | "question-invariants" => "questions",
        "sloppy" | "all-wrong" => "sloppy",
        "idle" | "timeouts" => "idle",
        "late" | "late-submit" => "late",
        "streaky" | "streak-bonus" => "streaky",
        "random" | "mixed" => "random",
        "ranking" | "leaderboard" => "ranking",
        "events" => "events",
        "ones" | "include-ones" => "ones",
        _ => return None,
    };
    catalog_scenarios()
        .into_iter()
        .find(|(scenario_key, _)| *scenario_key == key)
        .map(|(_, scenario)| scenario)
}

pub fn list_scenarios() -> Vec<(&'static str, String)> {
    catalog_scenarios()
        .into_iter()
        .map(|(key, scenario)| (key, scenario.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_catalog_entries() {
        assert_eq!(get_scenario("Perfect").unwrap().name, get_scenario("smoke").unwrap().name);
        assert_eq!(get_scenario("timeouts").unwrap().name, get_scenario("idle").unwrap().name);
        assert!(get_scenario("boss-fight").is_none());
    }

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, name) in list_scenarios() {
            assert_eq!(get_scenario(key).map(|s| s.name), Some(name));
        }
    }

    #[test]
    fn including_ones_keeps_other_settings() {
        let scenario = get_scenario("smoke").unwrap().including_ones();
        assert_eq!(scenario.plan.config.operand_min, 1);
        assert!(!scenario.plan.config.exclude_ones);
        assert_eq!(scenario.plan.config.total_questions, 10);
    }
}
