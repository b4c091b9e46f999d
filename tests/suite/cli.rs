//! The `playground` binary against a mock backend.

use serde_json::json;
use tempfile::TempDir;

use crate::common::{
    mount_crates, mount_error, mount_execute, mount_format, mount_gist_load, mount_gist_save,
    mount_versions, received_bodies, run_cli, run_cli_with_env_base, start_playground_mock,
    stderr_of, stdout_of,
};

#[tokio::test(flavor = "multi_thread")]
async fn run_prints_program_output() {
    let server = start_playground_mock().await;
    mount_execute(&server, "Hello, world!\n", "   Compiling playground\n").await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&server, home.path(), &["run"], "fn main() {}");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "Hello, world!\n");
    assert!(stderr_of(&output).contains("Compiling playground"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_flags_reach_the_request() {
    let server = start_playground_mock().await;
    mount_execute(&server, "", "").await;
    let home = TempDir::new().unwrap();

    let output = run_cli(
        &server,
        home.path(),
        &["run", "--action", "test", "--mode", "release", "--backtrace"],
        "#[test]\nfn t() {}",
    );

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let bodies = received_bodies(&server, "/execute").await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["tests"], json!(true));
    assert_eq!(bodies[0]["mode"], json!("release"));
    assert_eq!(bodies[0]["backtrace"], json!(true));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_request_exits_non_zero() {
    let server = start_playground_mock().await;
    mount_error(&server, "POST", "/execute", 500, "sandbox unavailable").await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&server, home.path(), &["run"], "fn main() {}");

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("sandbox unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn fmt_prints_formatted_source() {
    let server = start_playground_mock().await;
    mount_format(&server, true, "fn main() {}\n", "").await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&server, home.path(), &["fmt"], "fn main(){}");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "fn main() {}\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn fmt_failure_exits_non_zero() {
    let server = start_playground_mock().await;
    mount_format(&server, false, "", "error: expected one of `)`").await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&server, home.path(), &["fmt"], "fn main( {}");

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("expected one of"));
}

#[tokio::test(flavor = "multi_thread")]
async fn share_prints_links() {
    let server = start_playground_mock().await;
    mount_gist_save(&server, "abc123", "fn main() {}").await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&server, home.path(), &["share"], "fn main() {}");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("gist=abc123"));
    assert!(stdout.contains("https://gist.github.com/abc123"));
    assert!(stdout.contains("https://users.rust-lang.org/new-topic"));
}

#[tokio::test(flavor = "multi_thread")]
async fn load_accepts_a_bare_id() {
    let server = start_playground_mock().await;
    mount_gist_load(&server, "abc123", "fn main() { todo!() }").await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&server, home.path(), &["load", "abc123"], "");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "fn main() { todo!() }");
    assert!(stderr_of(&output).contains("edition: 2015"));
}

#[tokio::test(flavor = "multi_thread")]
async fn load_inline_code_link_needs_no_backend() {
    let server = start_playground_mock().await;
    let home = TempDir::new().unwrap();

    let output = run_cli(
        &server,
        home.path(),
        &["load", "https://play.rust-lang.org/?edition=2018&code=fn+main%28%29+%7B%7D"],
        "",
    );

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "fn main() {}");
    assert!(stderr_of(&output).contains("edition: 2018"));
    assert!(received_bodies(&server, "/meta/gist").await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn versions_lists_every_component() {
    let server = start_playground_mock().await;
    mount_versions(&server).await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&server, home.path(), &["versions"], "");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert_eq!(stdout.lines().count(), 6);
    assert!(stdout.starts_with("stable   1.0.0-stable (2022-04-04 7737e0b5c4103216d6fd)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn crates_are_listed_by_name() {
    let server = start_playground_mock().await;
    mount_crates(&server, &[("rand", "0.8.5"), ("itertools", "0.10.5")]).await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&server, home.path(), &["crates"], "");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "itertools 0.10.5\nrand 0.8.5\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn config_file_sets_defaults() {
    let server = start_playground_mock().await;
    mount_execute(&server, "", "").await;
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".playground");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[defaults]\nchannel = \"beta\"\nedition = \"2018\"\n",
    )
    .unwrap();

    let output = run_cli(&server, home.path(), &["run"], "fn main() {}");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let bodies = received_bodies(&server, "/execute").await;
    assert_eq!(bodies[0]["channel"], json!("beta"));
    assert_eq!(bodies[0]["edition"], json!("2018"));
    assert!(config_dir.join("logs").join("playground.log").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn base_url_flag_beats_environment() {
    let server = start_playground_mock().await;
    mount_crates(&server, &[("rand", "0.8.5")]).await;
    let home = TempDir::new().unwrap();

    let output = run_cli_with_env_base(
        "http://env-base.invalid/",
        home.path(),
        &["crates", "--base-url", &server.uri()],
        "",
    );

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "rand 0.8.5\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn environment_base_url_is_used_without_flag() {
    let home = TempDir::new().unwrap();

    let output = run_cli_with_env_base("http://env-base.invalid/", home.path(), &["crates"], "");

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("failed to fetch crate list"));
}
