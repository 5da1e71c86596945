//! End-to-end tests running the stack-trace binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use rethrow_lab_core::CONFIG_ENV;

fn run_binary(config: Option<&Path>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_stack-trace"));
    command.env_remove("RUST_LOG");
    match config {
        Some(path) => command.env(CONFIG_ENV, path),
        None => command.env_remove(CONFIG_ENV),
    };
    command.output().expect("failed to execute stack-trace")
}

fn headers(stdout: &str) -> Vec<&str> {
    stdout.lines().filter(|line| line.starts_with("== [")).collect()
}

#[test]
fn runs_without_arguments_and_exits_cleanly() {
    let output = run_binary(None);
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let headers = headers(&stdout);
    assert_eq!(headers.len(), 6, "unexpected output:\n{stdout}");
    let ids = [
        "inside-same",
        "inside-new",
        "outside-same",
        "outside-new",
        "conditional-rethrow",
        "stored-rethrow",
    ];
    for (header, id) in headers.iter().zip(ids) {
        assert!(header.contains(id), "{header} should name {id}");
    }
}

#[test]
fn every_block_prints_a_fault_and_never_the_swallow_note() {
    let output = run_binary(None);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let blocks: Vec<_> = stdout.split("== [").skip(1).collect();
    assert_eq!(blocks.len(), 6);
    for block in &blocks {
        assert!(block.contains("Fault: "), "block without a fault:\n{block}");
        assert!(block.contains("\tat "), "block without frames:\n{block}");
    }
    assert!(!stdout.lines().any(|line| line.trim() == "yay"));
}

#[test]
fn test_mode_writes_report_and_benchmark() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let report = dir.path().join("report.md");
    let benchmark = dir.path().join("benchmark.json");
    fs::write(
        &config,
        serde_json::json!({
            "mode": "test",
            "report": report,
            "benchmark": benchmark,
        })
        .to_string(),
    )
    .unwrap();

    let first = run_binary(Some(&config));
    assert!(
        first.status.success(),
        "first run failed: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    assert!(benchmark.exists());

    let notebook = fs::read_to_string(&report).unwrap();
    assert!(notebook.contains("| inside-new | Oh noes, I couldn't handle |"));
    assert!(notebook.contains("rethrown at in_thrower"));

    let second = run_binary(Some(&config));
    assert!(
        second.status.success(),
        "benchmark comparison failed: {}",
        String::from_utf8_lossy(&second.stderr)
    );
}

#[test]
fn tampered_benchmark_fails_test_mode() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let benchmark = dir.path().join("benchmark.json");
    fs::write(
        &config,
        serde_json::json!({ "mode": "test", "benchmark": benchmark }).to_string(),
    )
    .unwrap();
    fs::write(&benchmark, r#"{ "traces": [] }"#).unwrap();

    let output = run_binary(Some(&config));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("scenario count changed"));
}

#[test]
fn malformed_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{ not json").unwrap();

    let output = run_binary(Some(&config));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to parse config"));
}
