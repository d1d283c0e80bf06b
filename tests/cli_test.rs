#![cfg(feature = "cli")]

use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const ECHO_WORKFLOW: &str = r#"
name: echo-demo
agents:
  - name: EchoAgent
    config:
      prefix: "[Step 1]"
  - name: EchoAgent
    config:
      prefix: "[Step 2]"
"#;

// 沒有服務在 port 1 監聽，連線會立刻被拒絕
const UNREACHABLE_WORKFLOW: &str = r#"
name: unreachable
agents:
  - name: HttpAgent
    config:
      endpoint: "http://127.0.0.1:1/classify"
      timeout_seconds: 1
      retry_attempts: 0
"#;

fn write_workflow(dir: &TempDir, file_name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    std::fs::write(&path, content).expect("Failed to write workflow file");
    path
}

fn run_cli(workflow: &Path, extra_args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_agents-hub"))
        .arg(workflow)
        .args(extra_args)
        .env_remove("RUST_LOG")
        .output()?;
    Ok(output)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_runs_workflow_and_prints_payload() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "echo.yaml", ECHO_WORKFLOW);

    let output = run_cli(&path, &["--input", r#"{"input": "hi"}"#])?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let payload: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(payload["message"], "[Step 2] hi");
    assert_eq!(payload["input"], "hi");
    Ok(())
}

#[test]
fn test_invalid_input_json_exits_with_one() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "echo.yaml", ECHO_WORKFLOW);

    let output = run_cli(&path, &["--input", "{not json"])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid JSON for --input:"));
    assert!(stdout(&output).is_empty());
    Ok(())
}

#[test]
fn test_missing_workflow_file_exits_with_one() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("does-not-exist.yaml");

    let output = run_cli(&path, &[])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load workflow"));
    Ok(())
}

#[test]
fn test_malformed_workflow_exits_with_one() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "bad.yaml", "agents:\n  - config: {}\n");

    let output = run_cli(&path, &[])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load workflow"));
    Ok(())
}

#[test]
fn test_unknown_agent_exits_with_one() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(
        &temp_dir,
        "unknown.yaml",
        "agents:\n  - name: NonExistentAgent\n",
    );

    let output = run_cli(&path, &[])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("NonExistentAgent"));
    Ok(())
}

#[test]
fn test_http_failure_exits_with_two() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "unreachable.yaml", UNREACHABLE_WORKFLOW);

    let output = run_cli(&path, &["--input", r#"{"input": "hi"}"#])?;

    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Workflow execution failed"));
    assert!(stdout(&output).is_empty());
    Ok(())
}

#[test]
fn test_dry_run_does_not_run_agents() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "unreachable.yaml", UNREACHABLE_WORKFLOW);

    let output = run_cli(&path, &["--dry-run", "--on-agent-failure", "continue"])?;

    // 真的執行的話 HttpAgent 會失敗並以 2 結束
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Dry run complete, 1 step(s) would run."));
    assert!(out.contains("On agent failure: Continue"));
    assert!(!out.contains("\"message\""));
    Ok(())
}

#[test]
fn test_dry_run_shows_workflow_policy_by_default() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "echo.yaml", ECHO_WORKFLOW);

    let output = run_cli(&path, &["--dry-run"])?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("On agent failure: Stop"));
    Ok(())
}

#[test]
fn test_output_flag_writes_payload_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "echo.yaml", ECHO_WORKFLOW);
    let output_path = temp_dir.path().join("result.json");

    let output = run_cli(
        &path,
        &[
            "--input",
            r#"{"input": "hi"}"#,
            "--output",
            output_path.to_str().expect("utf-8 temp path"),
        ],
    )?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let payload: Value = serde_json::from_str(&std::fs::read_to_string(&output_path)?)?;
    assert_eq!(payload["message"], "[Step 2] hi");
    Ok(())
}

#[test]
fn test_metrics_file_shape() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "echo.yaml", ECHO_WORKFLOW);
    let metrics_path = temp_dir.path().join("metrics.json");

    let output = run_cli(
        &path,
        &[
            "--input",
            r#"{"input": "hi"}"#,
            "--execution-id",
            "run-42",
            "--metrics-file",
            metrics_path.to_str().expect("utf-8 temp path"),
        ],
    )?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let metrics: Value = serde_json::from_str(&std::fs::read_to_string(&metrics_path)?)?;

    assert_eq!(metrics["execution_id"], "run-42");
    let timestamp = metrics["timestamp"].as_str().expect("timestamp is a string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert_eq!(metrics["summary"]["total_steps"], 2);
    assert_eq!(metrics["summary"]["failed_steps"], 0);

    let steps = metrics["steps"].as_array().expect("steps is an array");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["position"], 1);
    assert_eq!(steps[1]["agent"], "EchoAgent");
    assert_eq!(steps[1]["status"], "succeeded");
    Ok(())
}

#[test]
fn test_metrics_failure_keeps_payload_and_exit_code() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_workflow(&temp_dir, "echo.yaml", ECHO_WORKFLOW);
    let metrics_path = temp_dir.path().join("missing").join("metrics.json");

    let output = run_cli(
        &path,
        &[
            "--input",
            r#"{"input": "hi"}"#,
            "--metrics-file",
            metrics_path.to_str().expect("utf-8 temp path"),
        ],
    )?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("[Step 2] hi"));
    assert!(stderr(&output).contains("Could not write metrics"));
    assert!(!metrics_path.exists());
    Ok(())
}
