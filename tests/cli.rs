use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use note_recall::config::IndexConfig;
use note_recall::index::VectorIndex;
use note_recall::metadata::{save_metadata, Corpus};
use note_recall::models::{ChunkRecord, SplitLabel};

fn recall_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("recall");
    path
}

fn record(path: &str, date: &str, note_type: &str, text: &str) -> ChunkRecord {
    ChunkRecord {
        file: path.rsplit('/').next().unwrap().to_string(),
        path: path.to_string(),
        date: Some(date.to_string()),
        day: None,
        chunk: 0,
        text: text.to_string(),
        note_type: Some(note_type.to_string()),
        split: None,
    }
}

fn fixture_records() -> Vec<ChunkRecord> {
    vec![
        record("Week 10/mon.md", "2025-11-03", "workouts", "Bench press 5x5"),
        record("Week 10/plan.md", "2025-11-03", "schedule", "Team meeting at 9am"),
        record("Week 12/mon.md", "2025-11-17", "workouts", "Squat 5x5"),
    ]
}

/// Writes a config with both services disabled and an index built from
/// `records` directly, so no embedding service is needed.
fn setup_test_env(records: Vec<ChunkRecord>) -> (TempDir, PathBuf, IndexConfig) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let vault = root.join("vault");
    fs::create_dir_all(&vault).unwrap();

    let index_cfg = IndexConfig {
        path: root.join("data/index.bin"),
        metadata_path: root.join("data/metadata.json"),
    };
    let mut index = VectorIndex::new(2);
    for i in 0..records.len() {
        index.add(&[i as f32, 1.0]).unwrap();
    }
    Corpus::new(index, records)
        .unwrap()
        .save(&index_cfg)
        .unwrap();

    let config_content = format!(
        r#"[vault]
root = "{root}/vault"

[index]
path = "{root}/data/index.bin"
metadata_path = "{root}/data/metadata.json"

[retrieval]
top_k = 3
"#,
        root = root.display()
    );

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_path = config_dir.join("recall.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path, index_cfg)
}

fn run_recall(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = recall_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run recall binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_ask_unmatched_date_not_found() {
    let (_tmp, config_path, _) = setup_test_env(fixture_records());

    let (stdout, stderr, success) =
        run_recall(&config_path, &["ask", "What did I do on 2030-01-01?"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Exact-date lookup: 2030-01-01"));
    assert!(stdout.contains("Not found in notes."));
}

#[test]
fn test_ask_with_context_needs_generator() {
    let (_tmp, config_path, _) = setup_test_env(fixture_records());

    let (stdout, stderr, success) =
        run_recall(&config_path, &["ask", "What did I do on 2025-11-03?"]);
    assert!(!success, "ask should fail without a generator: {}", stdout);
    assert!(stderr.contains("generation service unavailable"), "stderr={}", stderr);
}

#[test]
fn test_context_exact_date_filtered_by_type() {
    let (_tmp, config_path, _) = setup_test_env(fixture_records());

    let (stdout, stderr, success) = run_recall(
        &config_path,
        &["context", "2025-11-03", "--type", "workouts"],
    );
    assert!(success, "context failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("1. Week 10/mon.md"));
    assert!(stdout.contains("Bench press 5x5"));
    assert!(!stdout.contains("plan.md"));
}

#[test]
fn test_context_week_comparison() {
    let (_tmp, config_path, _) = setup_test_env(fixture_records());

    let (stdout, stderr, success) =
        run_recall(&config_path, &["context", "Compare", "week", "10", "and", "week", "12"]);
    assert!(success, "context failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Week lookup: 10, 12"));
    assert!(stdout.contains("Week 10 (2 entries)"));
    assert!(stdout.contains("Week 12 (1 entries)"));
}

#[test]
fn test_context_semantic_needs_embedder() {
    let (_tmp, config_path, _) = setup_test_env(fixture_records());

    let (_, stderr, success) = run_recall(&config_path, &["context", "how is my squat"]);
    assert!(!success);
    assert!(stderr.contains("embedding service unavailable"), "stderr={}", stderr);
}

#[test]
fn test_no_date_flag_falls_through() {
    let (_tmp, config_path, _) = setup_test_env(fixture_records());

    let (stdout, _, success) = run_recall(
        &config_path,
        &["context", "week 12 on 2025-11-03", "--no-date"],
    );
    assert!(success);
    assert!(stdout.contains("Week lookup: 12"));
    assert!(stdout.contains("Squat 5x5"));
}

#[test]
fn test_stats() {
    let (_tmp, config_path, _) = setup_test_env(fixture_records());

    let (stdout, stderr, success) = run_recall(&config_path, &["stats"]);
    assert!(success, "stats failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("chunks: 3"));
    assert!(stdout.contains("notes: 3"));
    assert!(stdout.contains("dimensions: 2"));
    assert!(stdout.contains("dates: 2025-11-03 .. 2025-11-17"));
    assert!(stdout.contains("splits labelled: 0 / 2"));
}

#[test]
fn test_mismatched_metadata_is_fatal() {
    let (_tmp, config_path, index_cfg) = setup_test_env(fixture_records());
    save_metadata(&index_cfg.metadata_path, &fixture_records()[..2]).unwrap();

    let (_, stderr, success) = run_recall(&config_path, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("rebuild the index"), "stderr={}", stderr);

    let (_, _, success) = run_recall(&config_path, &["ask", "2025-11-03"]);
    assert!(!success);
}

#[test]
fn test_classify_without_generator_fails_and_keeps_metadata() {
    let (_tmp, config_path, index_cfg) = setup_test_env(fixture_records());
    let before = fs::read(&index_cfg.metadata_path).unwrap();

    let (_, stderr, success) = run_recall(&config_path, &["classify", "--write"]);
    assert!(!success);
    assert!(stderr.contains("generation service unavailable"), "stderr={}", stderr);
    assert_eq!(fs::read(&index_cfg.metadata_path).unwrap(), before);
}

#[test]
fn test_classify_rejects_misaligned_store() {
    let (_tmp, config_path, index_cfg) = setup_test_env(fixture_records());
    save_metadata(&index_cfg.metadata_path, &fixture_records()[..2]).unwrap();
    let before = fs::read(&index_cfg.metadata_path).unwrap();

    let (_, stderr, success) = run_recall(&config_path, &["classify", "--write"]);
    assert!(!success);
    assert!(stderr.contains("rebuild the index"), "stderr={}", stderr);
    assert_eq!(fs::read(&index_cfg.metadata_path).unwrap(), before);
}

#[test]
fn test_classify_skips_labelled_records() {
    let mut records = fixture_records();
    records[0].split = Some(SplitLabel::Push);
    records[2].split = Some(SplitLabel::Legs);
    let (_tmp, config_path, _) = setup_test_env(records);

    let (stdout, stderr, success) = run_recall(&config_path, &["classify"]);
    assert!(success, "classify failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("would update: 0"));
    assert!(stdout.contains("already labeled: 2"));
}

#[test]
fn test_index_requires_embeddings() {
    let (_tmp, config_path, _) = setup_test_env(fixture_records());

    let (_, stderr, success) = run_recall(&config_path, &["index"]);
    assert!(!success);
    assert!(stderr.contains("requires embeddings"), "stderr={}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let (stdout, stderr, success) = run_recall(Path::new("/nonexistent/recall.toml"), &["stats"]);
    assert!(!success, "stdout={}", stdout);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_completions_without_config() {
    let (stdout, _, success) =
        run_recall(Path::new("/nonexistent/recall.toml"), &["completions", "bash"]);
    assert!(success);
    assert!(stdout.contains("recall"));
}
