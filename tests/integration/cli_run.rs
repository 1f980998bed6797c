use std::{fs, process::Command};

use httpmock::prelude::*;
use serde_json::json;
use tempfile::tempdir;

use crate::common::BINARY_PATH;

fn cribl_session(dir: &std::path::Path) -> Command {
    let mut command = Command::new(BINARY_PATH);
    command.env_clear().current_dir(dir);
    command
}

#[test]
fn missing_credentials_exit_zero_by_default() {
    let dir = tempdir().expect("can create temporary directory");

    let output = cribl_session(dir.path())
        .arg("worker-groups")
        .output()
        .expect("binary runs");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stdout: {stdout}");
    assert!(stdout.contains("Missing credentials! Set these environment variables:"));
    assert!(stdout.contains("   CRIBL_ORG_ID\n"));
    assert!(stdout.contains("   CRIBL_CLIENT_ID\n"));
    assert!(stdout.contains("   CRIBL_CLIENT_SECRET\n"));
}

#[test]
fn strict_exit_reports_failure() {
    let dir = tempdir().expect("can create temporary directory");

    let output = cribl_session(dir.path())
        .args(["--strict-exit", "workspaces"])
        .output()
        .expect("binary runs");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Missing credentials!"));
}

#[test]
fn placeholder_values_from_dotenv_are_rejected() {
    let dir = tempdir().expect("can create temporary directory");
    fs::write(
        dir.path().join(".env"),
        "CRIBL_ORG_ID=your-org-id\nCRIBL_CLIENT_ID=your-client-id\nCRIBL_CLIENT_SECRET=real-secret\n",
    )
    .expect("can write .env");

    let output = cribl_session(dir.path())
        .arg("workspaces")
        .output()
        .expect("binary runs");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Placeholder credentials detected!"), "stdout: {stdout}");
    assert!(stdout.contains("   CRIBL_ORG_ID\n"));
    assert!(!stdout.contains("   CRIBL_CLIENT_SECRET\n"));
}

#[test]
fn onprem_run_from_env_file_lists_groups() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/api/v1/auth/login");
        then.status(200).json_body(json!({ "token": "tok" }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/products/stream/groups")
            .header("authorization", "Bearer tok");
        then.status(200)
            .json_body(json!({ "count": 1, "items": [{ "id": "default" }] }));
    });

    let dir = tempdir().expect("can create temporary directory");
    let env_file = dir.path().join("leader.env");
    fs::write(
        &env_file,
        format!("CRIBL_SERVER_URL={}\nCRIBL_USERNAME=admin\n", server.base_url()),
    )
    .expect("can write env file");

    let output = cribl_session(dir.path())
        .arg("--deployment")
        .arg("on-prem")
        .arg("--env-file")
        .arg(&env_file)
        .arg("worker-groups")
        .output()
        .expect("binary runs");

    let stdout = String::from_utf8_lossy(&output.stdout);
    login.assert_hits(1);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Worker Group: default"), "stdout: {stdout}");
    assert!(!stdout.contains("Bearer"));
}

#[test]
fn logs_stay_off_stdout() {
    let dir = tempdir().expect("can create temporary directory");

    let output = cribl_session(dir.path())
        .env("RUST_LOG", "debug")
        .arg("worker-groups")
        .output()
        .expect("binary runs");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stdout.contains("cribl_session::"), "stdout: {stdout}");
    assert!(stderr.contains("cribl_session::runtime"), "stderr: {stderr}");
}
