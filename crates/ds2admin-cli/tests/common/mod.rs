use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run the CLI binary against `server` with `data_dir` as session storage.
///
/// The binary blocks, so it runs off the async test's worker thread while
/// the mock server keeps serving.
pub async fn run_cli(args: &[&str], server: &MockServer, data_dir: &Path) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let server = server.uri();
    let data_dir = data_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_ds2admin"))
            .args(&args)
            .env("DS2ADMIN_SERVER", server)
            .env("DS2ADMIN_DATA_DIR", data_dir)
            .env_remove("DS2ADMIN_KEY")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute CLI")
    })
    .await
    .expect("CLI task panicked")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Mount a backend that accepts `key` and issues `token`.
pub async fn mount_backend(server: &MockServer, key: &str, token: &str) {
    let bearer = format!("Bearer {}", token);

    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .and(wiremock::matchers::body_json(json!({ "admin_key": key })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": token,
            "expires_in": 86400
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "invalid admin key"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/verify"))
        .and(header("authorization", bearer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": true })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/config"))
        .and(header("authorization", bearer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": ["sk-a", "sk-b", "sk-c"],
            "accounts": [{ "email": "a@example.com" }, { "email": "b@example.com" }]
        })))
        .mount(server)
        .await;
}
