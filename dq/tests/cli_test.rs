//! Binary smoke tests that need no generator

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `adq` isolated from the user's config, logs and API keys
fn adq(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("adq").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_MODEL");
    cmd
}

#[test]
fn test_schema_prints_json_schema() {
    let home = TempDir::new().unwrap();
    adq(&home)
        .args(["schema", "DecisionBrief"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"summary\""))
        .stdout(predicate::str::contains("\"hard_constraints\""));
}

#[test]
fn test_unknown_schema_fails() {
    let home = TempDir::new().unwrap();
    adq(&home)
        .args(["schema", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown schema: Nope"));
}

#[test]
fn test_run_without_api_key_fails() {
    let home = TempDir::new().unwrap();
    adq(&home)
        .args(["run", "-t", "Travel laptop", "-n", "Need a light laptop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_run_rejects_blank_title() {
    let home = TempDir::new().unwrap();
    adq(&home)
        .args(["run", "-t", "   ", "-n", "Need a light laptop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InputValidationError"));
}

#[test]
fn test_resume_rejects_tampered_pending_state() {
    let home = TempDir::new().unwrap();
    let pending = home.path().join("pending.json");
    let answers = home.path().join("answers.yml");
    std::fs::write(
        &pending,
        serde_json::json!({
            "request": {"title": "Travel laptop", "narrative": "Edited after the questions were asked"},
            "request_signature": "0".repeat(64),
            "questions": [{
                "id": "os",
                "category": "soft_preference",
                "question": "Which operating system?",
                "expected_answer_type": "free_text"
            }]
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(&answers, "- question_id: os\n  answer: macOS\n").unwrap();

    adq(&home)
        .args(["resume", pending.to_str().unwrap(), "--answers", answers.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("StaleClarificationError"));
}
