// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the update handler and router

use super::auth::SharedSecret;
use super::handlers::*;
use super::reload::CommandReloader;
use super::server::build_router;
use super::store::ZoneFile;
use super::types::AppState;
use super::updater::{ProcessLock, Updater};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const FORWARD: &str = "@ IN SOA ns1.example.com. admin.example.com. 2024010100 3600 600 604800 86400
ns1 IN A 192.0.2.1
";

const REVERSE: &str = "@ IN SOA ns1.example.com. admin.example.com. 1 3600 600 604800 86400
1.2.0.192.in-addr.arpa. IN PTR ns1.example.com.
";

const SECRET: &str = "s3cret";

struct TestApp {
    dir: TempDir,
    router: Router,
}

impl TestApp {
    fn new(reload_command: &str, secret: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("forward.zone"), FORWARD).unwrap();
        fs::write(dir.path().join("reverse.zone"), REVERSE).unwrap();

        let updater = Updater::new(
            "example.com",
            ZoneFile::new(dir.path().join("forward.zone")),
            ZoneFile::new(dir.path().join("reverse.zone")),
            ProcessLock::new(),
            Arc::new(CommandReloader::parse(reload_command).unwrap()),
        );
        let state = AppState {
            updater: Arc::new(updater),
        };

        Self {
            router: build_router(state, secret.map(SharedSecret::new)),
            dir,
        }
    }

    async fn get(&self, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn zone(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).unwrap()
    }
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[test]
fn test_update_query_defaults_to_empty() {
    let query: UpdateQuery = serde_json::from_str("{}").unwrap();
    assert_eq!(query.name, "");
    assert_eq!(query.ip, "");
}

#[test]
fn test_update_response_serialization() {
    let response = UpdateResponse {
        success: true,
        message: "host A 10.0.0.5 updated".to_string(),
        details: None,
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_update_writes_both_zones() {
    let app = TestApp::new("true", Some(SECRET));

    let response = app
        .get("/api/v1/update?secret=s3cret&name=host&ip=192.0.2.10")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "host A 192.0.2.10 updated");
    assert_eq!(json["details"]["reverseName"], "10.2.0.192.in-addr.arpa.");
    assert_eq!(json["details"]["ptrTarget"], "host.example.com.");
    assert_eq!(json["details"]["forwardSerial"], 2024010101);
    assert_eq!(json["details"]["reverseSerial"], 2);

    assert!(app.zone("forward.zone").ends_with("host A 192.0.2.10\n"));
    assert!(app
        .zone("reverse.zone")
        .ends_with("10.2.0.192.in-addr.arpa. PTR host.example.com.\n"));
}

#[tokio::test]
async fn test_update_root_path_with_bearer_token() {
    let app = TestApp::new("true", Some(SECRET));

    let request = Request::builder()
        .uri("/?name=v6&ip=2001:db8::10")
        .header("authorization", "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["details"]["forwardType"], "AAAA");
    assert!(app.zone("forward.zone").ends_with("v6 AAAA 2001:db8::10\n"));
}

#[tokio::test]
async fn test_update_without_auth() {
    let app = TestApp::new("true", None);

    let response = app.get("/api/v1/update?name=host&ip=192.0.2.10").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// Negative test cases

#[tokio::test]
async fn test_update_missing_parameters() {
    let app = TestApp::new("true", Some(SECRET));

    for uri in [
        "/api/v1/update?secret=s3cret",
        "/api/v1/update?secret=s3cret&name=host",
        "/api/v1/update?secret=s3cret&ip=192.0.2.10",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json = json_body(response).await;
        assert_eq!(json["details"], "bad_request");
    }
    assert_eq!(app.zone("forward.zone"), FORWARD);
}

#[tokio::test]
async fn test_update_invalid_address() {
    let app = TestApp::new("true", Some(SECRET));

    let response = app
        .get("/api/v1/update?secret=s3cret&name=host&ip=999.1.1.1")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["details"], "invalid_address");
    assert_eq!(app.zone("forward.zone"), FORWARD);
    assert_eq!(app.zone("reverse.zone"), REVERSE);
}

#[tokio::test]
async fn test_update_requires_secret() {
    let app = TestApp::new("true", Some(SECRET));

    let response = app.get("/api/v1/update?name=host&ip=192.0.2.10").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .get("/api/v1/update?secret=nope&name=host&ip=192.0.2.10")
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/?secret=nope&name=host&ip=192.0.2.10").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert_eq!(app.zone("forward.zone"), FORWARD);
}

#[tokio::test]
async fn test_update_reload_failure() {
    let app = TestApp::new("false", Some(SECRET));

    let response = app
        .get("/api/v1/update?secret=s3cret&name=host&ip=192.0.2.10")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = json_body(response).await;
    assert_eq!(json["details"], "reload_failed");
    // Zone writes are kept
    assert!(app.zone("forward.zone").ends_with("host A 192.0.2.10\n"));
}

#[tokio::test]
async fn test_update_reverse_zone_failure() {
    let app = TestApp::new("true", Some(SECRET));
    let broken = "1.2.0.192.in-addr.arpa. IN PTR ns1.example.com.\n";
    fs::write(app.dir.path().join("reverse.zone"), broken).unwrap();

    let response = app
        .get("/api/v1/update?secret=s3cret&name=host&ip=192.0.2.10")
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["details"], "reverse_update_failed");
    assert_eq!(app.zone("reverse.zone"), broken);
}

// Operational endpoints

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new("true", Some(SECRET));

    let response = app.get("/api/v1/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_ready_checks_zone_files() {
    let app = TestApp::new("true", Some(SECRET));

    let json = json_body(app.get("/api/v1/ready").await).await;
    assert_eq!(json["ready"], true);

    fs::remove_file(app.dir.path().join("reverse.zone")).unwrap();
    let json = json_body(app.get("/api/v1/ready").await).await;
    assert_eq!(json["ready"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new("true", Some(SECRET));
    let _ = app.get("/api/v1/health").await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("zonecar_http_requests_total"));
}

#[tokio::test]
async fn test_openapi_document() {
    let app = TestApp::new("true", Some(SECRET));

    let response = app.get("/api/v1/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json["paths"]["/api/v1/update"]["get"].is_object());
}
