//! Shared test utilities and fixtures
//!
//! A wiremock server standing in for the playground backend, plus helpers to
//! point a session or the `playground` binary at it.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use playground_client::PlaygroundClient;
use playground_engine::Playground;
use playground_types::{Configuration, ToolchainComponent};

/// Start a mock server that simulates the playground backend
pub async fn start_playground_mock() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> PlaygroundClient {
    let base = Url::parse(&server.uri()).expect("mock server uri");
    PlaygroundClient::new(base, Duration::from_secs(10)).expect("client builds")
}

pub fn session_for(server: &MockServer) -> Playground<PlaygroundClient> {
    Playground::new(Arc::new(client_for(server)), Configuration::default())
}

async fn mount_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a `/execute` response
pub async fn mount_execute(server: &MockServer, stdout: &str, stderr: &str) {
    mount_json(
        server,
        "POST",
        "/execute",
        200,
        json!({ "success": true, "stdout": stdout, "stderr": stderr }),
    )
    .await;
}

/// Mount a `/compile` response
pub async fn mount_compile(server: &MockServer, code: &str, stderr: &str) {
    mount_json(
        server,
        "POST",
        "/compile",
        200,
        json!({ "success": true, "code": code, "stdout": "", "stderr": stderr }),
    )
    .await;
}

/// Mount a `/format` response
pub async fn mount_format(server: &MockServer, success: bool, code: &str, stderr: &str) {
    mount_json(
        server,
        "POST",
        "/format",
        200,
        json!({ "success": success, "code": code, "stdout": "", "stderr": stderr }),
    )
    .await;
}

/// Mount a backend failure with an `error` body on any route
pub async fn mount_error(server: &MockServer, verb: &str, route: &str, status: u16, error: &str) {
    mount_json(server, verb, route, status, json!({ "error": error })).await;
}

pub fn gist_body(id: &str, code: &str) -> Value {
    json!({
        "id": id,
        "url": format!("https://gist.github.com/{id}"),
        "code": code,
    })
}

/// Mount `POST /meta/gist`
pub async fn mount_gist_save(server: &MockServer, id: &str, code: &str) {
    mount_json(server, "POST", "/meta/gist", 200, gist_body(id, code)).await;
}

/// Mount `GET /meta/gist/{id}`
pub async fn mount_gist_load(server: &MockServer, id: &str, code: &str) {
    mount_json(
        server,
        "GET",
        &format!("/meta/gist/{id}"),
        200,
        gist_body(id, code),
    )
    .await;
}

/// Mount every `/meta/version/{component}` route
pub async fn mount_versions(server: &MockServer) {
    for component in ToolchainComponent::ALL {
        mount_json(
            server,
            "GET",
            &format!("/meta/version/{component}"),
            200,
            json!({
                "version": format!("1.0.0-{component}"),
                "date": "2022-04-04",
                "hash": "7737e0b5c4103216d6fd8cf941b7ab9bdbaace7c",
            }),
        )
        .await;
    }
}

/// Mount `GET /meta/crates`
pub async fn mount_crates(server: &MockServer, crates: &[(&str, &str)]) {
    let crates: Vec<Value> = crates
        .iter()
        .map(|(name, version)| json!({ "name": name, "version": version, "id": name }))
        .collect();
    mount_json(server, "GET", "/meta/crates", 200, json!({ "crates": crates })).await;
}

/// JSON bodies the server received on `route`, oldest first
pub async fn received_bodies(server: &MockServer, route: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .filter_map(|request| serde_json::from_slice(&request.body).ok())
        .collect()
}

/// Runs the `playground` binary against `server`, feeding `stdin`.
///
/// `home` isolates the config file and log directory from the real user.
pub fn run_cli(server: &MockServer, home: &Path, args: &[&str], stdin: &str) -> Output {
    run_cli_with_env_base(&server.uri(), home, args, stdin)
}

/// Like [`run_cli`], with `PLAYGROUND_BASE_URL` set to `env_base`.
pub fn run_cli_with_env_base(env_base: &str, home: &Path, args: &[&str], stdin: &str) -> Output {
    use std::io::Write;

    let mut child = Command::new(env!("CARGO_BIN_EXE_playground"))
        .args(args)
        .env("HOME", home)
        .env("PLAYGROUND_BASE_URL", env_base)
        .env_remove("RUST_LOG")
        .current_dir(home)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn playground binary");

    if let Some(mut input) = child.stdin.take() {
        input
            .write_all(stdin.as_bytes())
            .expect("write stdin");
    }
    child.wait_with_output().expect("wait for playground binary")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
