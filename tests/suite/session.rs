//! A full session over real HTTP: engine, client and wire types together.

use pretty_assertions::assert_eq;
use serde_json::json;

use playground_core::page::PageQuery;
use playground_core::share;
use playground_engine::{ApiError, RecordStatus, Response};
use playground_types::{Action, Channel, Edition, Mode};

use crate::common::{
    mount_compile, mount_crates, mount_error, mount_execute, mount_format, mount_gist_load,
    mount_gist_save, mount_versions, received_bodies, session_for, start_playground_mock,
};

#[tokio::test]
async fn auto_primary_runs_tests_as_a_library() {
    let server = start_playground_mock().await;
    mount_execute(&server, "running 1 test\ntest works ... ok\n", "").await;
    let mut playground = session_for(&server);

    playground.edit_code("#[test]\nfn works() {}");
    let ticket = playground.perform_primary().unwrap();
    assert_eq!(ticket.action(), Action::Test);

    let record = playground.settle(&ticket).await;
    let Some(Response::Execute(response)) = record.response() else {
        panic!("test run should settle with an execute response");
    };
    assert!(response.stdout.contains("test works ... ok"));

    let bodies = received_bodies(&server, "/execute").await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["crateType"], json!("lib"));
    assert_eq!(bodies[0]["tests"], json!(true));
    assert_eq!(bodies[0]["channel"], json!("stable"));
    assert_eq!(bodies[0]["edition"], json!("2021"));
}

#[tokio::test]
async fn show_assembly_posts_to_compile() {
    let server = start_playground_mock().await;
    mount_compile(&server, "main:\n\tret", "").await;
    let mut playground = session_for(&server);

    playground.edit_code("fn main() {}");
    let ticket = playground.perform(Action::ShowAssembly).unwrap();
    let record = playground.settle(&ticket).await;
    assert!(matches!(
        record.response(),
        Some(Response::Compile(r)) if r.code == "main:\n\tret"
    ));

    let bodies = received_bodies(&server, "/compile").await;
    assert_eq!(bodies[0]["target"], json!("asm"));
    assert_eq!(bodies[0]["assemblyFlavor"], json!("att"));
    assert_eq!(bodies[0]["crateType"], json!("bin"));
}

#[tokio::test]
async fn format_round_trip_replaces_source() {
    let server = start_playground_mock().await;
    mount_format(&server, true, "fn main() {}\n", "").await;
    let mut playground = session_for(&server);

    playground.edit_code("fn main(){}");
    let ticket = playground.perform(Action::Format).unwrap();
    playground.settle(&ticket).await;

    assert_eq!(playground.state().code(), "fn main() {}\n");
    assert_eq!(playground.state().focus(), None);
}

#[tokio::test]
async fn backend_error_fails_only_its_record() {
    let server = start_playground_mock().await;
    mount_execute(&server, "hello\n", "").await;
    mount_error(&server, "POST", "/clippy", 500, "clippy crashed").await;
    let mut playground = session_for(&server);

    let run = playground.perform(Action::Execute).unwrap();
    playground.settle(&run).await;
    let lint = playground.perform(Action::Lint).unwrap();
    let record = playground.settle(&lint).await;

    assert_eq!(
        record.status(),
        &RecordStatus::Failed(ApiError::Application {
            status: 500,
            message: "clippy crashed".to_string(),
        })
    );
    assert!(matches!(
        playground.state().record(Action::Execute).response(),
        Some(Response::Execute(r)) if r.stdout == "hello\n"
    ));
}

#[tokio::test]
async fn saved_snippet_carries_latest_output_and_shares() {
    let server = start_playground_mock().await;
    mount_execute(&server, "Hello, world!\n", "").await;
    mount_gist_save(&server, "abc123", "ignored by the client").await;
    let mut playground = session_for(&server);

    playground.change_edition(Edition::Rust2018);
    let run = playground.perform(Action::Execute).unwrap();
    playground.settle(&run).await;
    let save = playground.save_snippet().unwrap();
    playground.settle(&save).await;

    let snippet = playground.state().snippet().cloned().unwrap();
    assert_eq!(snippet.id, "abc123");
    assert_eq!(snippet.code, playground.state().code());
    assert_eq!(snippet.stdout, "Hello, world!\n");
    assert_eq!(snippet.edition, Edition::Rust2018);

    let base = url::Url::parse("https://play.example.org/").unwrap();
    let permalink = share::permalink(&base, &snippet);
    assert_eq!(
        permalink.as_str(),
        "https://play.example.org/?version=stable&mode=debug&edition=2018&gist=abc123"
    );
    let body = share::forum_snippet(&snippet, &permalink);
    assert!(body.contains("Output:"));
    assert!(!body.contains("Errors:"));

    let bodies = received_bodies(&server, "/meta/gist").await;
    assert_eq!(bodies, vec![json!({ "code": playground.state().code() })]);
}

#[tokio::test]
async fn shared_link_loads_snippet_with_link_settings() {
    let server = start_playground_mock().await;
    mount_gist_load(&server, "abc123", "fn main() { println!(\"shared\"); }").await;
    let mut playground = session_for(&server);

    let query = PageQuery::from_query_str("?version=nightly&mode=release&gist=abc123");
    let ticket = playground.index_page_load(&query).unwrap();
    playground.settle(&ticket).await;

    let state = playground.state();
    assert_eq!(state.code(), "fn main() { println!(\"shared\"); }");
    assert_eq!(state.configuration().channel, Channel::Nightly);
    assert_eq!(state.configuration().mode, Mode::Release);
    // A link without an edition predates editions.
    assert_eq!(state.configuration().edition, Edition::OLDEST);
    assert_eq!(state.snippet().map(|s| s.id.as_str()), Some("abc123"));
}

#[tokio::test]
async fn metadata_queries() {
    let server = start_playground_mock().await;
    mount_versions(&server).await;
    mount_crates(&server, &[("rand", "0.8.5"), ("itertools", "0.10.5")]).await;
    let mut playground = session_for(&server);

    let versions = playground.refresh_versions().await.unwrap();
    assert_eq!(versions.nightly.version, "1.0.0-nightly");
    assert_eq!(versions.miri.details(), "2022-04-04 7737e0b5c4103216d6fd");
    assert!(playground.state().versions().is_some());

    let names: Vec<String> = playground
        .crates()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["itertools".to_string(), "rand".to_string()]);
}
