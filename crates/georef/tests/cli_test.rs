//! Integration tests for the `georef` CLI binary.
//!
//! Argument parsing, help output, completions and config handling run
//! without a service; lookup commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `georef` binary with env isolation.
///
/// Clears all `GEOREF_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn georef_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("georef");
    cmd.env("GEOREF_CONFIG", "/tmp/georef-cli-test-nonexistent/config.toml")
        .env_remove("GEOREF_URL")
        .env_remove("GEOREF_TIMEOUT")
        .env_remove("GEOREF_OUTPUT")
        .env_remove("GEOREF_SERVICE__URL")
        .env_remove("RUST_LOG");
    cmd
}

fn with_config(config: &Path) -> assert_cmd::Command {
    let mut cmd = georef_cmd();
    cmd.env("GEOREF_CONFIG", config);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> Output {
    let mut argv = vec!["--url".to_owned(), format!("{}/v1", server.uri())];
    argv.extend(args.iter().map(|a| (*a).to_owned()));
    tokio::task::spawn_blocking(move || georef_cmd().args(argv).output().unwrap())
        .await
        .unwrap()
}

async fn mount(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn india_server() -> MockServer {
    let server = MockServer::start().await;
    mount(
        &server,
        "/v1/countries",
        json!([
            { "code": "IN", "name": "India" },
            { "code": "US", "name": "United States" }
        ]),
    )
    .await;
    mount(
        &server,
        "/v1/countries/IN/states",
        json!([
            { "code": "MH", "name": "Maharashtra" },
            { "code": "KA", "name": "Karnataka" }
        ]),
    )
    .await;
    mount(
        &server,
        "/v1/countries/IN/states/MH/cities",
        json!([
            { "code": "MUM", "name": "Mumbai" },
            { "code": "PUN", "name": "Pune" }
        ]),
    )
    .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = georef_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    georef_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("reference-data")
            .and(predicate::str::contains("countries"))
            .and(predicate::str::contains("walk"))
            .and(predicate::str::contains("copy")),
    );
}

#[test]
fn test_version_flag() {
    georef_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("georef"));
}

#[test]
fn test_completions_bash() {
    georef_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_walk_requires_country() {
    georef_cmd()
        .args(["--url", "http://localhost:9", "walk"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<COUNTRY>"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_missing_url_is_a_config_error() {
    let output = georef_cmd().arg("countries").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No reference service URL"));
}

#[test]
fn test_zero_timeout_is_a_usage_error() {
    let output = georef_cmd()
        .args(["--url", "http://localhost:9", "--timeout", "0", "countries"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_path_honours_env() {
    georef_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("georef-cli-test-nonexistent"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    with_config(&config)
        .args(["config", "init", "--service-url", "https://geo.example.com/v1"])
        .assert()
        .success();
    assert!(config.exists());

    with_config(&config)
        .args(["config", "init", "--service-url", "https://geo.example.com/v1"])
        .assert()
        .code(3);

    let output = with_config(&config)
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["service"]["url"], "https://geo.example.com/v1");
}

// ── Lookups against a mock service ──────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_countries_plain() {
    let server = india_server().await;
    let output = run_against(&server, &["-o", "plain", "countries"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "IN\nUS");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cities_json() {
    let server = india_server().await;
    let output = run_against(&server, &["-o", "json-compact", "cities", "IN", "MH"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let cities: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cities[0]["key"], "MUM");
    assert_eq!(cities[1]["display_name"], "Pune");
    assert_eq!(cities[1]["level"], "city");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_service_error_exits_with_connection_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/countries/IN/states"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = run_against(&server, &["states", "IN"]).await;
    assert_eq!(output.status.code(), Some(7));
    assert!(combined_output(&output).contains("states of IN"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_timeout_exits_with_timeout_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/countries"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "code": "IN", "name": "India" }]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let output = run_against(&server, &["--timeout", "1", "walk", "IN"]).await;
    let text = combined_output(&output);
    assert_eq!(output.status.code(), Some(8), "{text}");
    assert!(text.contains("timed out after 1s"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_shows_each_level() {
    let server = india_server().await;
    let output = run_against(&server, &["-o", "json", "walk", "IN", "MH"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let levels: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(levels[0]["level"], "country");
    assert_eq!(levels[0]["selection"], "IN");
    assert_eq!(levels[1]["selection"], "MH");
    assert_eq!(levels[2]["level"], "city");
    assert_eq!(levels[2]["selection"], Value::Null);
    assert_eq!(levels[2]["options"][0]["key"], "MUM");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_unknown_state_is_not_found() {
    let server = india_server().await;
    let output = run_against(&server, &["walk", "IN", "ZZ"]).await;

    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("'ZZ' not found"), "{text}");
    assert!(text.contains("georef states IN"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_copy_is_served_from_cache() {
    let server = india_server().await;
    let output = run_against(&server, &["-o", "json", "copy", "IN", "MH", "MUM"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["permanent"], json!(["IN", "MH", "MUM"]));
    assert_eq!(report["fetches_filling_current"], 3);
    assert_eq!(report["fetches_during_copy"], 0);
}
