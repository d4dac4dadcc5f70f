//! Integration tests for the smoke-test binary.
//!
//! These use `assert_cmd` to verify CLI behavior:
//! - exit code 1 when the local environment file is absent
//! - the missing-topic validation check runs without network access

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn exits_with_code_1_when_env_file_is_absent() {
    let temp = TempDir::new().expect("create temp dir");
    let missing = temp.path().join(".env.agentcore");

    Command::cargo_bin("techresearch-cli")
        .expect("binary exists")
        .args(["--env-file", missing.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn missing_topic_check_passes_with_an_unreachable_crew() {
    let temp = TempDir::new().expect("create temp dir");
    let env_path = temp.path().join(".env.agentcore");
    let mut file = std::fs::File::create(&env_path).expect("create env file");
    // Port 9 is unreachable, so the research request itself fails; the
    // validation check never touches the network.
    writeln!(file, "TECHRESEARCH_CREW_ENDPOINT=http://127.0.0.1:9").unwrap();
    writeln!(file, "OPENAI_API_KEY=test-key").unwrap();
    writeln!(file, "SERPER_API_KEY=test-key").unwrap();

    Command::cargo_bin("techresearch-cli")
        .expect("binary exists")
        .args([
            "--env-file",
            env_path.to_str().unwrap(),
            "--topic",
            "Quantum Computing",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status Code: 500"))
        .stdout(predicate::str::contains(
            "PASS: correctly handled the missing parameter",
        ))
        .stdout(predicate::str::contains("Smoke test completed!"));
}
