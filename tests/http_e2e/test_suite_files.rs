//! E2E tests: JSON suite files run end-to-end over HTTP.

use std::fs;
use std::path::Path;

use apitest::config::{ConfigHandle, RunnerConfig};
use apitest::error::{LoadError, RunError, UnitError};
use apitest::models::{RunSummary, TestResult, TestStatus};
use apitest::services::HttpRunner;
use futures_util::StreamExt;
use serde_json::{Value, json};
use tempfile::TempDir;

use super::mock_api_server::MockApiServer;

fn write_suite(dir: &Path, relative: &str, suite: Value) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(&suite).unwrap()).unwrap();
}

fn runner_for(server: &MockApiServer) -> HttpRunner {
    let config = ConfigHandle::new(RunnerConfig {
        load_concurrent: 2,
        cookies: None,
        url_prefix: Some(server.base_url.clone()),
    });
    HttpRunner::http(config).expect("failed to build runner")
}

async fn run(runner: &HttpRunner, root: &Path) -> Vec<Result<TestResult, RunError>> {
    runner.start(root).collect().await
}

fn unwrap_results(items: Vec<Result<TestResult, RunError>>) -> Vec<TestResult> {
    items
        .into_iter()
        .map(|item| item.expect("unexpected fatal error"))
        .collect()
}

#[actix_rt::test]
async fn test_suite_directory_runs_over_http() {
    let server = MockApiServer::start().await;
    let dir = TempDir::new().unwrap();

    write_suite(
        dir.path(),
        "health.test.json",
        json!({
            "name": "health",
            "url": "/health",
            "payload": {"expect": {"ok": true}}
        }),
    );
    write_suite(
        dir.path(),
        "users/list.test.json",
        json!({
            "name": "users",
            "url": "/users",
            "payload": [
                {"name": "first user", "respPluck": ["data", "0", "name"], "expect": "ada"},
                {"name": "empty list", "expect": {"data": []}},
                {"respPluck": ["total"], "expect": 2}
            ]
        }),
    );
    write_suite(
        dir.path(),
        "users/create.test.json",
        json!({
            "name": "create user",
            "url": "/inspect",
            "method": "POST",
            "payload": {
                "data": {"name": "grace"},
                "args": {"headers": {"x-trace": "t-9"}, "query": {"notify": "false"}},
                "respPluck": ["body"],
                "expect": {"name": "grace"}
            }
        }),
    );
    fs::write(dir.path().join("users/fixtures.json"), "not a suite").unwrap();

    let runner = runner_for(&server);
    let results = unwrap_results(run(&runner, dir.path()).await);

    let outcomes: Vec<(&str, &str, TestStatus)> = results
        .iter()
        .map(|r| (r.suite_name.as_str(), r.unit_name.as_str(), r.status))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("health", "1", TestStatus::Succeed),
            ("create user", "1", TestStatus::Succeed),
            ("users", "first user", TestStatus::Succeed),
            ("users", "empty list", TestStatus::Failed),
            ("users", "3", TestStatus::Succeed),
        ]
    );

    let summary: RunSummary = results.iter().collect();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.failed, 1);
    assert!(summary.has_failures());
}

#[actix_rt::test]
async fn test_only_and_skip_from_files() {
    let server = MockApiServer::start().await;
    let dir = TempDir::new().unwrap();

    write_suite(
        dir.path(),
        "a.test.json",
        json!({"name": "A", "url": "/health", "payload": {"expect": {"ok": true}}}),
    );
    write_suite(
        dir.path(),
        "b.test.json",
        json!({"name": "B", "url": "/health", "status": "only", "payload": {}}),
    );

    let runner = runner_for(&server);
    let results = unwrap_results(run(&runner, dir.path()).await);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].suite_name, "A");
    assert_eq!(results[0].status, TestStatus::Skipped);
    assert_eq!(results[1].suite_name, "B");
    assert_eq!(results[1].status, TestStatus::Succeed);
}

#[actix_rt::test]
async fn test_single_file_run() {
    let server = MockApiServer::start().await;
    let dir = TempDir::new().unwrap();
    write_suite(
        dir.path(),
        "text.test.json",
        json!({"name": "text", "url": "/text", "status": "skip", "payload": [{"expect": "pong"}]}),
    );

    let runner = runner_for(&server);
    let results = unwrap_results(run(&runner, &dir.path().join("text.test.json")).await);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, TestStatus::Succeed);
}

#[actix_rt::test]
async fn test_unit_failures_from_files() {
    let server = MockApiServer::start().await;
    let dir = TempDir::new().unwrap();
    write_suite(
        dir.path(),
        "failures.test.json",
        json!({
            "name": "failures",
            "url": "/missing",
            "bail": false,
            "payload": [
                {"name": "not found"},
                {"name": "uncallable", "callback": "checkUser", "args": {"method": "GET"}}
            ]
        }),
    );
    write_suite(
        dir.path(),
        "nameless.test.json",
        json!({"url": "/health", "payload": {}}),
    );

    let runner = runner_for(&server);
    let results = unwrap_results(run(&runner, dir.path()).await);

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.status == TestStatus::Failed));
    assert!(matches!(
        results[0].error.as_deref(),
        Some(UnitError::Transport(_))
    ));
    // The request fails before the callback is looked at
    assert!(matches!(
        results[1].error.as_deref(),
        Some(UnitError::Transport(_))
    ));
    assert!(matches!(
        results[2].error.as_deref(),
        Some(UnitError::Validation(_))
    ));
}

#[actix_rt::test]
async fn test_callback_in_data_file_is_not_callable() {
    let server = MockApiServer::start().await;
    let dir = TempDir::new().unwrap();
    write_suite(
        dir.path(),
        "cb.test.json",
        json!({"name": "cb", "url": "/health", "payload": {"callback": "verify"}}),
    );

    let runner = runner_for(&server);
    let results = unwrap_results(run(&runner, dir.path()).await);

    assert!(matches!(
        results[0].error.as_deref(),
        Some(UnitError::CallbackNotCallable(_))
    ));
}

#[actix_rt::test]
async fn test_malformed_suite_file_is_fatal() {
    let server = MockApiServer::start().await;
    let dir = TempDir::new().unwrap();
    write_suite(
        dir.path(),
        "good.test.json",
        json!({"name": "good", "url": "/health", "payload": {}}),
    );
    fs::write(dir.path().join("broken.test.json"), "[1, 2, 3]").unwrap();

    let runner = runner_for(&server);
    let items = run(&runner, dir.path()).await;

    assert_eq!(items.len(), 1);
    assert!(matches!(
        items[0],
        Err(RunError::Load(LoadError::NoSuiteExport { .. }))
    ));
}

#[actix_rt::test]
async fn test_unloadable_suite_files_are_ignored() {
    let server = MockApiServer::start().await;
    let dir = TempDir::new().unwrap();
    write_suite(
        dir.path(),
        "health.test.json",
        json!({"name": "health", "url": "/health", "payload": {"expect": {"ok": true}}}),
    );
    fs::write(dir.path().join("helper.test.ts"), "export const helper = 1;").unwrap();

    let runner = runner_for(&server);
    let results = unwrap_results(run(&runner, dir.path()).await);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].suite_name, "health");
    assert_eq!(results[0].status, TestStatus::Succeed);
}
