use std::collections::BTreeMap;
use std::hash::Hasher;

use gugudan_game::{Outcome, QuizConfig, score};
use serde_json::Value;
use twox_hash::XxHash64;

const SNAPSHOT_HASH: u64 = 0xf0f8_c776_ff0d_2d63;

#[test]
fn config_and_scoring_snapshot_stable() {
    let mut perfect_round = Vec::new();
    let mut streak = 0;
    for _ in 0..10 {
        let (delta, next) = score(Outcome::Correct, streak);
        perfect_round.push(delta);
        streak = next;
    }
    let penalties = vec![
        score(Outcome::Wrong, 3).0,
        score(Outcome::TimedOut, 3).0,
    ];

    let mut snapshot: BTreeMap<&str, Value> = BTreeMap::new();
    snapshot.insert("default", serde_json::to_value(QuizConfig::default()).unwrap());
    snapshot.insert(
        "including_ones",
        serde_json::to_value(QuizConfig::including_ones()).unwrap(),
    );
    snapshot.insert("perfect_round", serde_json::to_value(perfect_round).unwrap());
    snapshot.insert("penalties", serde_json::to_value(penalties).unwrap());

    let bytes = serde_json::to_vec(&snapshot).unwrap();
    assert_eq!(
        snapshot_hash(&bytes),
        SNAPSHOT_HASH,
        "snapshot changed: {}",
        String::from_utf8_lossy(&bytes)
    );
}

#[test]
fn storage_documents_keep_legacy_field_names() {
    let json = r#"[{"playerName":"Alice","score":208,"accuracy":100,"date":"2024-05-01T10:00:00Z"}]"#;
    let records: Vec<gugudan_game::ScoreRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(records[0].player_name, "Alice");
    let back = serde_json::to_value(&records).unwrap();
    assert_eq!(back[0]["playerName"], "Alice");
    assert!(back[0].get("date").is_some());

    let ranking = r#"[{"name":"Bob","score":90,"date":"2024-05-01T10:00:00Z"}]"#;
    let entries: Vec<gugudan_game::RankingEntry> = serde_json::from_str(ranking).unwrap();
    assert_eq!(entries[0].name, "Bob");
    assert_eq!(entries[0].score, 90);
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}
