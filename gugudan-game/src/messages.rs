//! Swappable player-facing strings.
//!
//! Templates use `{placeholder}` markers. The defaults are English; a shell
//! can load a full or partial replacement table from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, QuizResult};
use crate::results::{Encouragement, PersonalBest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub blank_name: String,
    pub encouragement_master: String,
    pub encouragement_great: String,
    pub encouragement_good_start: String,
    pub encouragement_keep_practicing: String,
    /// Placeholders: `{streak}`
    pub streak_banner: String,
    /// Placeholders: `{name}`, `{score}`
    pub first_record: String,
    /// Placeholders: `{name}`, `{score}`, `{previous}`
    pub new_record: String,
    /// Placeholders: `{name}`, `{score}`, `{best}`
    pub standing_best: String,
    /// Labels for the podium places; later places use `rank_other`.
    pub rank_podium: Vec<String>,
    /// Placeholders: `{rank}`
    pub rank_other: String,
    /// Placeholders: `{score}`
    pub points: String,
    pub ranking_empty: String,
    pub ranking_unavailable: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            blank_name: "Please enter your name!".to_string(),
            encouragement_master: "Perfect! Multiplication master!".to_string(),
            encouragement_great: "Well done! Keep practicing!".to_string(),
            encouragement_good_start: "Good start! Practice a little more!".to_string(),
            encouragement_keep_practicing: "Practice makes perfect. Don't give up!".to_string(),
            streak_banner: "{streak} in a row! PERFECT!".to_string(),
            first_record: "{name}'s first record: {score} points".to_string(),
            new_record: "New record for {name}! {score} points (previous: {previous})".to_string(),
            standing_best: "{name}'s best: {best} points (this round: {score})".to_string(),
            rank_podium: vec!["1st".to_string(), "2nd".to_string(), "3rd".to_string()],
            rank_other: "{rank}th".to_string(),
            points: "{score} pts".to_string(),
            ranking_empty: "No rankings yet.".to_string(),
            ranking_unavailable: "Rankings could not be loaded.".to_string(),
        }
    }
}

fn fill(template: &str, pairs: &[(&str, String)]) -> String {
    pairs.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}

impl Messages {
    /// Parse a message table; missing entries keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> QuizResult<Self> {
        serde_json::from_str(json).map_err(|err| QuizError::InvalidConfig(err.to_string()))
    }

    #[must_use]
    pub fn encouragement(&self, tier: Encouragement) -> &str {
        match tier {
            Encouragement::Master => &self.encouragement_master,
            Encouragement::Great => &self.encouragement_great,
            Encouragement::GoodStart => &self.encouragement_good_start,
            Encouragement::KeepPracticing => &self.encouragement_keep_practicing,
        }
    }

    #[must_use]
    pub fn streak_banner(&self, streak: u32) -> String {
        fill(&self.streak_banner, &[("streak", streak.to_string())])
    }

    #[must_use]
    pub fn personal_best(&self, name: &str, score: u32, best: PersonalBest) -> String {
        let mut pairs = vec![("name", name.to_string()), ("score", score.to_string())];
        let template = match best {
            PersonalBest::First => &self.first_record,
            PersonalBest::NewRecord { previous } => {
                pairs.push(("previous", previous.to_string()));
                &self.new_record
            }
            PersonalBest::Standing { best } => {
                pairs.push(("best", best.to_string()));
                &self.standing_best
            }
        };
        fill(template, &pairs)
    }

    /// Label for a one-based ranking position.
    #[must_use]
    pub fn rank_label(&self, rank: usize) -> String {
        rank.checked_sub(1)
            .and_then(|idx| self.rank_podium.get(idx))
            .cloned()
            .unwrap_or_else(|| fill(&self.rank_other, &[("rank", rank.to_string())]))
    }

    #[must_use]
    pub fn points(&self, score: u32) -> String {
        fill(&self.points, &[("score", score.to_string())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_best_lines() {
        let m = Messages::default();
        assert_eq!(
            m.personal_best("Alice", 90, PersonalBest::First),
            "Alice's first record: 90 points"
        );
        assert_eq!(
            m.personal_best("Alice", 90, PersonalBest::NewRecord { previous: 70 }),
            "New record for Alice! 90 points (previous: 70)"
        );
        assert_eq!(
            m.personal_best("Alice", 60, PersonalBest::Standing { best: 70 }),
            "Alice's best: 70 points (this round: 60)"
        );
    }

    #[test]
    fn rank_labels_cover_podium_and_rest() {
        let m = Messages::default();
        assert_eq!(m.rank_label(1), "1st");
        assert_eq!(m.rank_label(3), "3rd");
        assert_eq!(m.rank_label(4), "4th");
        assert_eq!(m.rank_label(0), "0th");
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let m = Messages::from_json(
            r#"{"streak_banner": "{streak} 연속 PERFECT!", "rank_other": "{rank}위"}"#,
        )
        .unwrap();
        assert_eq!(m.streak_banner(3), "3 연속 PERFECT!");
        assert_eq!(m.rank_label(5), "5위");
        assert_eq!(m.encouragement(Encouragement::Great), "Well done! Keep practicing!");
        assert_eq!(m.points(42), "42 pts");
    }
}
