//! End-to-end tests of the `ds2admin` binary against a mock admin backend.

mod common;

use common::{mount_backend, run_cli, stderr, stdout};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_status() {
    let server = MockServer::start().await;
    mount_backend(&server, "secret", "tok-1").await;
    let data = TempDir::new().unwrap();

    let output = run_cli(&["login", "--key", "secret"], &server, data.path()).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Logged in successfully"));
    assert!(out.contains("Keys: 3"));
    assert!(data.path().join("session.json").exists());

    let output = run_cli(&["status"], &server, data.path()).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Phase: authenticated"));
    assert!(out.contains("Accounts: 2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_no_remember_is_forgotten_on_exit() {
    let server = MockServer::start().await;
    mount_backend(&server, "secret", "tok-1").await;
    let data = TempDir::new().unwrap();

    let output = run_cli(
        &["login", "--key", "secret", "--no-remember"],
        &server,
        data.path(),
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("this session only"));
    assert!(!data.path().join("session.json").exists());

    let output = run_cli(&["status"], &server, data.path()).await;
    assert!(stdout(&output).contains("Phase: unauthenticated"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_key_is_reported() {
    let server = MockServer::start().await;
    mount_backend(&server, "secret", "tok-1").await;
    let data = TempDir::new().unwrap();

    let output = run_cli(&["login", "--key", "guess"], &server, data.path()).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid admin key"));
    assert!(!data.path().join("session.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_forgets_session() {
    let server = MockServer::start().await;
    mount_backend(&server, "secret", "tok-1").await;
    let data = TempDir::new().unwrap();

    let output = run_cli(&["login", "--key", "secret"], &server, data.path()).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_cli(&["logout"], &server, data.path()).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!data.path().join("session.json").exists());

    let output = run_cli(&["config"], &server, data.path()).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_json() {
    let server = MockServer::start().await;
    mount_backend(&server, "secret", "tok-1").await;
    let data = TempDir::new().unwrap();

    run_cli(&["login", "--key", "secret"], &server, data.path()).await;
    let output = run_cli(&["config", "--json"], &server, data.path()).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let config: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(config["keys"].as_array().unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_sends_body_with_bearer() {
    let server = MockServer::start().await;
    mount_backend(&server, "secret", "tok-1").await;

    Mock::given(method("POST"))
        .and(path("/admin/keys"))
        .and(header("authorization", "Bearer tok-1"))
        .and(wiremock::matchers::body_json(json!({ "key": "sk-new" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let data = TempDir::new().unwrap();
    run_cli(&["login", "--key", "secret"], &server, data.path()).await;

    let output = run_cli(
        &[
            "request",
            "/admin/keys",
            "--method",
            "post",
            "--data",
            r#"{"key":"sk-new"}"#,
        ],
        &server,
        data.path(),
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Status: 200"));
    assert!(out.contains("\"success\": true"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_outside_admin_is_refused() {
    let server = MockServer::start().await;
    mount_backend(&server, "secret", "tok-1").await;
    let data = TempDir::new().unwrap();

    run_cli(&["login", "--key", "secret"], &server, data.path()).await;
    let output = run_cli(&["request", "/v1/models"], &server, data.path()).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("/admin/"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_request_ends_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/accounts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_backend(&server, "secret", "tok-1").await;

    let data = TempDir::new().unwrap();
    run_cli(&["login", "--key", "secret"], &server, data.path()).await;
    assert!(data.path().join("session.json").exists());

    let output = run_cli(&["request", "/admin/accounts"], &server, data.path()).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("authentication expired, please log in again"));
    assert!(!data.path().join("session.json").exists());
}
