// ABOUTME: Integration tests for the sandbox-deployer CLI commands.
// ABOUTME: Validates --help output, init, and status/watch against a stub operator.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn deployer_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("sandbox-deployer"))
}

fn write_config(dir: &Path, operator_api: &str) {
    let yaml = format!(
        r#"operator_api: {operator_api}
poll_interval: 50ms
provision_timeout: 5s
contracts:
  services: "0x0000000000000000000000000000000000000090"
blueprint_id: 1
sandbox_service_id: 3
"#
    );
    fs::write(dir.join("deployer.yml"), yaml).unwrap();
}

/// Run the command off the async runtime so the stub server keeps serving.
async fn run(cmd: Command) -> assert_cmd::assert::Assert {
    let mut cmd = cmd;
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

#[test]
fn help_shows_commands() {
    deployer_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("deployer.yml");

    deployer_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created deployer.yml"));

    assert!(config_path.exists(), "deployer.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("operator_api:"));
    assert!(content.contains("sandbox_service_id:"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("deployer.yml");

    fs::write(&config_path, "existing: config").unwrap();

    deployer_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    deployer_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn status_without_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    deployer_cmd()
        .current_dir(temp_dir.path())
        .args(["status", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn json_error_output_is_machine_readable() {
    let temp_dir = tempfile::tempdir().unwrap();

    deployer_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "status", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""event":"error""#));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_prints_the_current_phase() {
    let (base, _seen) = support::http::serve(vec![(
        200,
        r#"{"callId":7,"phase":"image_pull","progressPercent":35,"message":"pulling ubuntu"}"#,
    )])
    .await;
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), &base);

    let mut cmd = deployer_cmd();
    cmd.current_dir(temp_dir.path()).args(["status", "7"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("image_pull"))
        .stdout(predicate::str::contains("35%"))
        .stdout(predicate::str::contains("pulling ubuntu"));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_for_untracked_call_fails() {
    let (base, _seen) = support::http::serve(vec![(404, "")]).await;
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), &base);

    let mut cmd = deployer_cmd();
    cmd.current_dir(temp_dir.path()).args(["status", "7"]);
    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("no provision found for call 7"));
}

#[tokio::test(flavor = "multi_thread")]
async fn watch_follows_until_ready() {
    let (base, _seen) = support::http::serve(vec![
        (404, ""),
        (200, r#"{"callId":7,"phase":"queued","progressPercent":0}"#),
        (
            200,
            r#"{"callId":7,"sandboxId":"sb-7","phase":"ready","progressPercent":100}"#,
        ),
    ])
    .await;
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), &base);

    let mut cmd = deployer_cmd();
    cmd.current_dir(temp_dir.path()).args(["--json", "watch", "7"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains(r#""phase":"queued""#))
        .stdout(predicate::str::contains(r#""event":"success""#))
        .stdout(predicate::str::contains("sb-7"));
}

#[tokio::test(flavor = "multi_thread")]
async fn watch_reports_operator_failure() {
    let (base, _seen) = support::http::serve(vec![(
        200,
        r#"{"callId":7,"phase":"failed","message":"image not found"}"#,
    )])
    .await;
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), &base);

    let mut cmd = deployer_cmd();
    cmd.current_dir(temp_dir.path()).args(["watch", "7"]);
    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("image not found"));
}
