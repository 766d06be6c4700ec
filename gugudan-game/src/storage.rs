//! Persistence gateway: score history and the top-N ranking.
//!
//! The engine never touches a concrete store. Platforms provide a
//! [`KeyValueStore`]; [`JsonGateway`] layers the two persisted collections on
//! top of it as JSON arrays under [`SCORES_KEY`] and [`RANKING_KEY`].

use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::constants::{LOG_TARGET_STORAGE, RANKING_KEY, SCORES_KEY};
use crate::error::{QuizError, QuizResult};

/// One finished round in the append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub player_name: String,
    pub score: u32,
    /// Rounded accuracy percentage.
    pub accuracy: u8,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl ScoreRecord {
    #[must_use]
    pub fn new(
        player_name: impl Into<String>,
        score: u32,
        accuracy: u8,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            accuracy,
            timestamp,
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: u32,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl RankingEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, score: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            score,
            timestamp,
        }
    }
}

/// Leaderboard row decorated for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRow {
    /// One-based position.
    pub rank: usize,
    pub entry: RankingEntry,
    /// Row matches the player and score of the round just finished.
    pub is_current_player: bool,
}

/// Insert `entry`, keep the list sorted by descending score, and cap it at `cap`.
///
/// The sort is stable, so an equal score never displaces an older entry.
pub fn insert_ranking(ranking: &mut Vec<RankingEntry>, entry: RankingEntry, cap: usize) {
    ranking.push(entry);
    ranking.sort_by(|a, b| b.score.cmp(&a.score));
    ranking.truncate(cap);
}

/// Number and highlight ranking rows for the result screen.
#[must_use]
pub fn ranking_rows(ranking: &[RankingEntry], player_name: &str, score: u32) -> Vec<RankingRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(idx, entry)| RankingRow {
            rank: idx + 1,
            is_current_player: entry.name == player_name && entry.score == score,
            entry: entry.clone(),
        })
        .collect()
}

/// Trait for abstracting a durable string key-value store.
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// List every key currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn list(&self) -> Result<Vec<String>, Self::Error>;
}

/// Score history and ranking access used by the session.
pub trait PersistenceGateway {
    /// # Errors
    ///
    /// Returns `Persistence` if the history exists but cannot be read or parsed.
    fn load_scores(&self) -> QuizResult<Vec<ScoreRecord>>;

    /// # Errors
    ///
    /// Returns `Persistence` if the history cannot be written.
    fn append_score(&self, record: ScoreRecord) -> QuizResult<()>;

    /// # Errors
    ///
    /// Returns `Persistence` if the ranking exists but cannot be read or parsed.
    fn load_ranking(&self) -> QuizResult<Vec<RankingEntry>>;

    /// # Errors
    ///
    /// Returns `Persistence` if the ranking cannot be written.
    fn save_ranking(&self, ranking: &[RankingEntry]) -> QuizResult<()>;
}

/// JSON-encoded gateway over any key-value store.
///
/// Rankings are stored exactly as given; the session caps them to
/// `QuizConfig::ranking_size` before saving.
#[derive(Debug, Clone)]
pub struct JsonGateway<S> {
    store: S,
}

impl<S: KeyValueStore> JsonGateway<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> QuizResult<Vec<T>> {
        let raw = self
            .store
            .get(key)
            .map_err(|err| QuizError::Persistence(format!("reading {key}: {err}")))?;
        match raw {
            None => Ok(Vec::new()),
            Some(text) if text.trim().is_empty() => Ok(Vec::new()),
            Some(text) => serde_json::from_str(&text)
                .map_err(|err| QuizError::Persistence(format!("parsing {key}: {err}"))),
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> QuizResult<()> {
        let text = serde_json::to_string(items)?;
        self.store
            .set(key, &text)
            .map_err(|err| QuizError::Persistence(format!("writing {key}: {err}")))
    }
}

impl<S: KeyValueStore> PersistenceGateway for JsonGateway<S> {
    fn load_scores(&self) -> QuizResult<Vec<ScoreRecord>> {
        self.read_list(SCORES_KEY)
    }

    fn append_score(&self, record: ScoreRecord) -> QuizResult<()> {
        // Unreadable history is replaced rather than blocking the new record.
        let mut scores = self.load_scores().unwrap_or_else(|err| {
            warn!(target: LOG_TARGET_STORAGE, "discarding unreadable score history: {err}");
            Vec::new()
        });
        scores.push(record);
        self.write_list(SCORES_KEY, &scores)
    }

    fn load_ranking(&self) -> QuizResult<Vec<RankingEntry>> {
        self.read_list(RANKING_KEY)
    }

    fn save_ranking(&self, ranking: &[RankingEntry]) -> QuizResult<()> {
        self.write_list(RANKING_KEY, ranking)
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
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
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct Broken;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        type Error = Broken;

        fn get(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(Broken)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(Broken)
        }

        fn list(&self) -> Result<Vec<String>, Self::Error> {
            Err(Broken)
        }
    }

    #[test]
    fn ranking_keeps_top_five_descending() {
        let mut ranking = Vec::new();
        for (i, score) in [50, 80, 30, 90, 70, 60].into_iter().enumerate() {
            let secs = i64::try_from(i).unwrap();
            insert_ranking(&mut ranking, RankingEntry::new("p", score, at(secs)), 5);
        }
        let scores: Vec<u32> = ranking.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90, 80, 70, 60, 50]);
    }

    #[test]
    fn ranking_ties_keep_insertion_order() {
        let mut ranking = Vec::new();
        insert_ranking(&mut ranking, RankingEntry::new("first", 40, at(0)), 5);
        insert_ranking(&mut ranking, RankingEntry::new("second", 40, at(1)), 5);
        insert_ranking(&mut ranking, RankingEntry::new("third", 40, at(2)), 2);
        let names: Vec<&str> = ranking.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn rows_flag_current_player() {
        let ranking = vec![
            RankingEntry::new("Bob", 120, at(0)),
            RankingEntry::new("Alice", 100, at(1)),
            RankingEntry::new("Alice", 90, at(2)),
        ];
        let rows = ranking_rows(&ranking, "Alice", 100);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].rank, 2);
        assert!(rows[1].is_current_player);
        assert!(!rows[0].is_current_player);
        assert!(!rows[2].is_current_player);
    }

    #[test]
    fn gateway_roundtrips_through_memory_store() {
        let gateway = JsonGateway::new(MemoryStore::new());
        assert!(gateway.load_scores().unwrap().is_empty());
        assert!(gateway.load_ranking().unwrap().is_empty());

        gateway
            .append_score(ScoreRecord::new("Alice", 120, 80, at(0)))
            .unwrap();
        gateway
            .append_score(ScoreRecord::new("Bob", 60, 50, at(1)))
            .unwrap();
        let scores = gateway.load_scores().unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].player_name, "Alice");

        let ranking = vec![RankingEntry::new("Alice", 120, at(0))];
        gateway.save_ranking(&ranking).unwrap();
        assert_eq!(gateway.load_ranking().unwrap(), ranking);

        let mut keys = gateway.store().list().unwrap();
        keys.sort();
        assert_eq!(keys, vec![RANKING_KEY.to_string(), SCORES_KEY.to_string()]);
    }

    #[test]
    fn stored_records_use_legacy_field_names() {
        let store = MemoryStore::new();
        let gateway = JsonGateway::new(store.clone());
        gateway
            .append_score(ScoreRecord::new("Alice", 10, 100, at(0)))
            .unwrap();
        let raw = store.get(SCORES_KEY).unwrap().unwrap();
        assert!(raw.contains("\"playerName\":\"Alice\""));
        assert!(raw.contains("\"date\":"));
        assert!(raw.contains("\"accuracy\":100"));
    }

    #[test]
    fn corrupt_data_is_a_typed_error() {
        let store = MemoryStore::new();
        store.set(SCORES_KEY, "{broken").unwrap();
        store.set(RANKING_KEY, "[{\"name\": 3}]").unwrap();
        let gateway = JsonGateway::new(store);
        assert!(matches!(
            gateway.load_scores(),
            Err(QuizError::Persistence(_))
        ));
        assert!(matches!(
            gateway.load_ranking(),
            Err(QuizError::Persistence(_))
        ));
    }

    #[test]
    fn append_replaces_corrupt_history() {
        let store = MemoryStore::new();
        store.set(SCORES_KEY, "not json").unwrap();
        let gateway = JsonGateway::new(store);
        gateway
            .append_score(ScoreRecord::new("Alice", 30, 40, at(0)))
            .unwrap();
        assert_eq!(gateway.load_scores().unwrap().len(), 1);
    }

    #[test]
    fn save_ranking_stores_the_list_as_given() {
        let gateway = JsonGateway::new(MemoryStore::new());
        let ranking: Vec<RankingEntry> = (0..7)
            .map(|i| RankingEntry::new("p", 100 - i, at(i64::from(i))))
            .collect();
        gateway.save_ranking(&ranking).unwrap();
        assert_eq!(gateway.load_ranking().unwrap(), ranking);
    }

    #[test]
    fn broken_store_surfaces_persistence_errors() {
        let gateway = JsonGateway::new(BrokenStore);
        assert!(matches!(
            gateway.load_scores(),
            Err(QuizError::Persistence(_))
        ));
        assert!(gateway.save_ranking(&[]).is_err());
        assert!(
            gateway
                .append_score(ScoreRecord::new("A", 1, 1, at(0)))
                .is_err()
        );
    }
}
