// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for auth module

use super::auth::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceExt;

async fn test_handler() -> &'static str {
    "success"
}

fn app() -> Router {
    Router::new()
        .route("/test", get(test_handler))
        .layer(middleware::from_fn_with_state(
            SharedSecret::new("s3cret"),
            authenticate,
        ))
}

async fn status_of(request: Request<Body>) -> StatusCode {
    app().oneshot(request).await.unwrap().status()
}

#[test]
fn test_shared_secret_matches() {
    let secret = SharedSecret::new("s3cret");
    assert!(secret.matches("s3cret"));
    assert!(!secret.matches("s3cret "));
    assert!(!secret.matches("S3CRET"));
    assert!(!secret.matches(""));
}

#[test]
fn test_shared_secret_debug_is_redacted() {
    let secret = SharedSecret::new("s3cret");
    let rendered = format!("{:?}", secret);
    assert!(!rendered.contains("s3cret"));
    assert!(rendered.contains("redacted"));
}

#[tokio::test]
async fn test_authenticate_with_valid_bearer_token() {
    let request = Request::builder()
        .uri("/test")
        .header("authorization", "Bearer s3cret")
        .body(Body::empty())
        .unwrap();

    assert_eq!(status_of(request).await, StatusCode::OK);
}

#[tokio::test]
async fn test_authenticate_with_valid_query_secret() {
    let request = Request::builder()
        .uri("/test?name=host&secret=s3cret&ip=10.0.0.1")
        .body(Body::empty())
        .unwrap();

    assert_eq!(status_of(request).await, StatusCode::OK);
}

#[tokio::test]
async fn test_authenticate_missing_credentials() {
    let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
    assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticate_invalid_format() {
    let request = Request::builder()
        .uri("/test")
        .header("authorization", "Basic s3cret")
        .body(Body::empty())
        .unwrap();

    assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticate_wrong_secret() {
    let request = Request::builder()
        .uri("/test?secret=guess")
        .body(Body::empty())
        .unwrap();
    assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/test")
        .header("authorization", "Bearer guess")
        .body(Body::empty())
        .unwrap();
    assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_authenticate_empty_secret() {
    let request = Request::builder()
        .uri("/test?secret=")
        .body(Body::empty())
        .unwrap();
    assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/test")
        .header("authorization", "Bearer ")
        .body(Body::empty())
        .unwrap();
    assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_header_takes_precedence_over_query() {
    let request = Request::builder()
        .uri("/test?secret=s3cret")
        .header("authorization", "Bearer guess")
        .body(Body::empty())
        .unwrap();

    assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);
}
