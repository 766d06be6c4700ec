use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "gugudan-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_gugudan-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("smoke"));
}

#[test]
fn cli_runs_all_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_gugudan-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "all",
            "--iterations",
            "2",
            "--seeds",
            "1,0x2a",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Gugudan Automated Tester"));

    let report = std::fs::read_to_string(&output_path).expect("read report");
    let results: Vec<serde_json::Value> = serde_json::from_str(&report).expect("json report");
    assert_eq!(results.len(), 10 * 2);
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_persists_ranking_in_store_dir() {
    let exe = env!("CARGO_BIN_EXE_gugudan-tester");
    let store_dir = temp_path("store");
    let output_path = temp_path("store-report");
    let status = Command::new(exe)
        .args(["--scenarios", "smoke", "--iterations", "3", "--report", "markdown"])
        .arg("--store-dir")
        .arg(&store_dir)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());

    let ranking = std::fs::read_to_string(store_dir.join("gugudan-ranking.json"))
        .expect("ranking file");
    let entries: Vec<serde_json::Value> = serde_json::from_str(&ranking).expect("ranking json");
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e["score"] == 208));
    let scores = std::fs::read_to_string(store_dir.join("gugudan-scores.json")).expect("scores");
    assert!(scores.contains("\"playerName\":\"Tester\""));

    let report = std::fs::read_to_string(output_path).expect("report");
    assert!(report.contains("# Gugudan Logic Test Results"));
    std::fs::remove_dir_all(store_dir).ok();
}

#[test]
fn cli_rejects_bad_seed() {
    let exe = env!("CARGO_BIN_EXE_gugudan-tester");
    let output = Command::new(exe)
        .args(["--seeds", "banana"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unrecognized seed token"));
}
