use cribl_session::{
    api::{list_worker_groups, list_workspaces, render_listing, Product},
    lib::errors::{ApiError, AuthError},
    session::{
        auth::{OAuthClientConfig, OAuthTokenSource},
        AuthHeaderProvider, Session, TlsPolicy,
    },
};
use httpmock::prelude::*;
use reqwest::Client;
use serde_json::json;
use url::Url;

fn oauth_session(server: &MockServer) -> Session {
    let http = Client::new();
    let token_url = Url::parse(&server.url("/oauth/token")).expect("mock url");
    let tokens = OAuthTokenSource::new(
        http.clone(),
        OAuthClientConfig::new(token_url, "https://api.cribl.cloud", "abc", "xyz"),
    );
    Session::new(
        Url::parse(&server.base_url()).expect("mock url"),
        http,
        AuthHeaderProvider::OAuth(tokens),
        TlsPolicy::Verify,
    )
}

#[tokio::test]
async fn workspaces_are_listed_with_a_cached_oauth_token() {
    let server = MockServer::start_async().await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(json!({
                "access_token": "cloud-token",
                "token_type": "Bearer",
                "expires_in": 86400
            }));
        })
        .await;
    let workspaces = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/organizations/acme/workspaces")
                .header("authorization", "Bearer cloud-token");
            then.status(200).json_body(json!({
                "count": 1,
                "items": [{
                    "workspaceId": "main",
                    "alias": "Production",
                    "region": "us-west-2",
                    "state": "Workspace_Ready"
                }]
            }));
        })
        .await;

    let session = oauth_session(&server);
    let first = list_workspaces(&session, "acme").await.expect("first listing");
    let second = list_workspaces(&session, "acme").await.expect("second listing");

    token.assert_hits_async(1).await;
    workspaces.assert_hits_async(2).await;
    assert_eq!(first.len(), 1);
    assert_eq!(second[0].workspace_id.as_deref(), Some("main"));

    let rendered = render_listing(&first);
    assert!(rendered.contains("Found 1 workspace(s):"));
    assert!(rendered.contains("Workspace: main\n---------------\n"));
    assert!(rendered.contains("   alias: Production\n"));
}

#[tokio::test]
async fn worker_groups_use_requested_product() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200)
                .json_body(json!({ "access_token": "cloud-token", "expires_in": 3600 }));
        })
        .await;
    let edge = server
        .mock_async(|when, then| {
            when.method(GET).path("/products/edge/groups");
            then.status(200).json_body(json!({
                "items": [{ "id": "default_fleet", "isFleet": true }]
            }));
        })
        .await;

    let groups = list_worker_groups(&oauth_session(&server), Product::Edge)
        .await
        .expect("edge groups listed");

    edge.assert_hits_async(1).await;
    assert_eq!(groups[0].is_fleet, Some(true));
}

#[tokio::test]
async fn rejected_client_credentials_surface_as_auth_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(401).json_body(json!({ "error": "access_denied" }));
        })
        .await;
    let groups = server
        .mock_async(|when, then| {
            when.method(GET).path("/products/stream/groups");
            then.status(200).json_body(json!({ "items": [] }));
        })
        .await;

    let result = list_worker_groups(&oauth_session(&server), Product::Stream).await;

    groups.assert_hits_async(0).await;
    assert!(
        matches!(result, Err(ApiError::Auth(AuthError::Rejected { .. }))),
        "{result:?}"
    );
}
