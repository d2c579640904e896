//! E2E tests: reqwest transport against the mock API.

use std::collections::BTreeMap;
use std::time::Duration;

use apitest::error::TransportError;
use apitest::services::{ReqwestTransport, Transport, UnitRequest};
use serde_json::{Value, json};

use super::mock_api_server::{MockApiServer, closed_port_url};

fn request(method: &str, url: String) -> UnitRequest {
    UnitRequest {
        url,
        method: method.to_string(),
        headers: BTreeMap::new(),
        cookies: BTreeMap::new(),
        query: BTreeMap::new(),
        body: None,
        timeout: Duration::from_secs(5),
    }
}

fn transport() -> ReqwestTransport {
    ReqwestTransport::new().expect("failed to build transport")
}

#[actix_rt::test]
async fn test_json_response_is_decoded() {
    let server = MockApiServer::start().await;

    let body = transport()
        .send(request("GET", server.url("/users")))
        .await
        .unwrap();

    assert_eq!(body["total"], json!(2));
    assert_eq!(body["data"][1]["name"], json!("linus"));
}

#[actix_rt::test]
async fn test_text_and_empty_bodies() {
    let server = MockApiServer::start().await;
    let transport = transport();

    let text = transport.send(request("GET", server.url("/text"))).await.unwrap();
    assert_eq!(text, json!("pong"));

    let empty = transport.send(request("get", server.url("/empty"))).await.unwrap();
    assert_eq!(empty, Value::Null);
}

#[actix_rt::test]
async fn test_non_success_status_is_error() {
    let server = MockApiServer::start().await;

    let err = transport()
        .send(request("GET", server.url("/missing")))
        .await
        .unwrap_err();

    match err {
        TransportError::Status { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not here");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[actix_rt::test]
async fn test_request_carries_headers_cookies_query_and_body() {
    let server = MockApiServer::start().await;
    let mut req = request("PATCH", server.url("/inspect"));
    req.headers.insert("x-trace".to_string(), "trace-1".to_string());
    req.cookies.insert("session".to_string(), "abc".to_string());
    req.cookies.insert("lang".to_string(), "en".to_string());
    req.query.insert("page".to_string(), "2".to_string());
    req.query.insert("q".to_string(), "a b".to_string());
    req.body = Some(json!({"name": "ada"}));

    let echoed = transport().send(req).await.unwrap();

    assert_eq!(echoed["method"], json!("PATCH"));
    assert_eq!(echoed["trace"], json!("trace-1"));
    assert_eq!(echoed["cookie"], json!("lang=en; session=abc"));
    assert_eq!(echoed["query"], json!({"page": "2", "q": "a b"}));
    assert_eq!(echoed["contentType"], json!("application/json"));
    assert_eq!(echoed["body"], json!({"name": "ada"}));
}

#[actix_rt::test]
async fn test_timeout_is_reported() {
    let server = MockApiServer::start().await;
    let mut req = request("GET", server.url("/slow"));
    req.timeout = Duration::from_millis(100);

    let err = transport().send(req).await.unwrap_err();

    assert!(matches!(err, TransportError::Timeout { timeout_ms: 100, .. }));
}

#[actix_rt::test]
async fn test_connection_failure_is_request_error() {
    let err = transport()
        .send(request("GET", closed_port_url()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Request { .. }));
}

#[actix_rt::test]
async fn test_invalid_method_is_rejected() {
    let err = transport()
        .send(request("NOT A METHOD", "http://127.0.0.1/".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::InvalidMethod(_)));
}
