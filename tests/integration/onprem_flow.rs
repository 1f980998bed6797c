use httpmock::prelude::*;
use serde_json::json;

use crate::common::{closed_port, onprem_env, run_captured, worker_groups_profile};

#[tokio::test]
async fn token_is_exchanged_once_then_groups_are_listed() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(200).json_body(json!({
                "token": "tok",
                "forcePasswordChange": false
            }));
        })
        .await;
    let groups = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/products/stream/groups")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({
                "count": 1,
                "items": [{ "id": "default", "name": "Default", "workerCount": 2 }]
            }));
        })
        .await;

    let printed = run_captured(worker_groups_profile(), onprem_env(&server.base_url(), &[])).await;

    login.assert_hits_async(1).await;
    groups.assert_hits_async(1).await;
    assert!(printed.starts_with("Listing On-Premise Cribl Worker Groups\n"));
    assert!(printed.contains(&format!("Connecting to: {}/api/v1\n", server.base_url())));
    assert!(printed.contains("Authenticated with on-prem server\n"));
    assert!(printed.contains("Found 1 worker group(s):"));
    assert!(printed.contains("Worker Group: default\n"));
    assert!(printed.contains("   workerCount: 2\n"));
    assert!(!printed.contains("tok\n"), "token must never be printed: {printed}");
}

#[tokio::test]
async fn rejected_login_never_reaches_the_api() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(401).body("Unauthorized");
        })
        .await;
    let groups = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/products/stream/groups");
            then.status(200).json_body(json!({ "items": [] }));
        })
        .await;

    let printed = run_captured(
        worker_groups_profile(),
        onprem_env(&server.base_url(), &[("CRIBL_PASSWORD", "wrong")]),
    )
    .await;

    groups.assert_hits_async(0).await;
    assert!(printed.contains("Error: Authentication failed:"), "{printed}");
    assert!(!printed.contains("Fetching worker groups"));
}

#[tokio::test]
async fn unreachable_leader_reports_authentication_failure() {
    let url = format!("http://127.0.0.1:{}", closed_port());

    let printed = run_captured(worker_groups_profile(), onprem_env(&url, &[])).await;

    assert!(printed.contains("Authenticating with username/password...\n"));
    assert!(printed.contains("Error: Authentication failed:"), "{printed}");
    assert!(!printed.contains("CRIBL_INSECURE_TLS=true"));
    assert!(!printed.contains("Found"));
}

#[tokio::test]
async fn https_leader_defaults_to_accepting_self_signed() {
    let url = format!("https://127.0.0.1:{}", closed_port());

    let printed = run_captured(worker_groups_profile(), onprem_env(&url, &[])).await;

    assert!(printed.contains(&format!("Connecting to: {url}/api/v1\n")));
    assert!(printed.contains("Accepting self-signed certificates (insecure mode)\n"));
}

#[tokio::test]
async fn verification_stays_on_when_opted_out() {
    let url = format!("https://127.0.0.1:{}", closed_port());

    let printed = run_captured(
        worker_groups_profile(),
        onprem_env(&url, &[("CRIBL_INSECURE_TLS", "false")]),
    )
    .await;

    assert!(!printed.contains("insecure mode"));
}

#[tokio::test]
async fn server_errors_on_listing_are_network_failures() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(200).json_body(json!({ "token": "tok" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/products/stream/groups");
            then.status(500).body("leader unavailable");
        })
        .await;

    let printed = run_captured(worker_groups_profile(), onprem_env(&server.base_url(), &[])).await;

    assert!(printed.contains("Error: Network error:"), "{printed}");
    assert!(printed.contains("leader unavailable"));
}

#[tokio::test]
async fn null_items_print_no_groups() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(200).json_body(json!({ "token": "tok" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/products/stream/groups");
            then.status(200).json_body(json!({ "count": 0, "items": null }));
        })
        .await;

    let printed = run_captured(worker_groups_profile(), onprem_env(&server.base_url(), &[])).await;

    assert!(printed.ends_with("No worker groups found\n"), "{printed}");
}
