// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for types module

use super::types::*;
use crate::reload::{CommandReloader, ReloadError};
use crate::store::{StoreError, ZoneFile};
use crate::updater::{ProcessLock, UpdateError, Updater};
use crate::upsert::UpsertError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::path::PathBuf;
use std::sync::Arc;

#[test]
fn test_app_state_clone() {
    let updater = Updater::new(
        "example.com.",
        ZoneFile::new("/test/forward.zone"),
        ZoneFile::new("/test/reverse.zone"),
        ProcessLock::new(),
        Arc::new(CommandReloader::default()),
    );
    let state = AppState {
        updater: Arc::new(updater),
    };

    let cloned = state.clone();
    assert!(Arc::ptr_eq(&state.updater, &cloned.updater));
    assert_eq!(cloned.updater.origin(), "example.com");
}

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Test error".to_string(),
        details: Some("Details here".to_string()),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("Test error"));
    assert!(json.contains("Details here"));
}

#[test]
fn test_error_response_without_details() {
    let response = ErrorResponse {
        error: "Test error".to_string(),
        details: None,
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("null")); // None is serialized as null
}

#[test]
fn test_api_error_status_codes() {
    let cases = vec![
        (ApiError::InvalidRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (ApiError::InvalidAddress("x".to_string()), StatusCode::BAD_REQUEST),
        (
            ApiError::ForwardUpdateFailed("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            ApiError::ReverseUpdateFailed("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (ApiError::ReloadFailed("x".to_string()), StatusCode::BAD_GATEWAY),
        (
            ApiError::InternalError("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, status) in cases {
        assert_eq!(error.into_response().status(), status);
    }
}

#[test]
fn test_api_error_display() {
    let error = ApiError::InvalidRequest("Missing name or ip".to_string());
    assert_eq!(error.to_string(), "Invalid request: Missing name or ip");

    let error = ApiError::InternalError("task panicked".to_string());
    assert_eq!(error.to_string(), "Internal server error: task panicked");
}

#[tokio::test]
async fn test_api_error_body_carries_kind() {
    let response = ApiError::ReloadFailed("nsd not running".to_string()).into_response();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"], "Reload failed: nsd not running");
    assert_eq!(json["details"], "reload_failed");
}

#[test]
fn test_api_error_from_update_error() {
    let error = ApiError::from(UpdateError::BadRequest("Missing name or ip".to_string()));
    assert!(matches!(error, ApiError::InvalidRequest(ref m) if m == "Missing name or ip"));

    let source = "10.0.0".parse::<std::net::IpAddr>().unwrap_err();
    let error = ApiError::from(UpdateError::InvalidAddress {
        ip: "10.0.0".to_string(),
        source,
    });
    assert!(matches!(error, ApiError::InvalidAddress(ref m) if m.contains("10.0.0")));

    let store_error = || StoreError::Upsert {
        path: PathBuf::from("/zones/reverse.zone"),
        source: UpsertError::MissingSoa,
    };
    let error = ApiError::from(UpdateError::ForwardUpdateFailed {
        rtype: "A",
        source: store_error(),
    });
    assert_eq!(error.kind(), "forward_update_failed");

    let error = ApiError::from(UpdateError::ReverseUpdateFailed {
        source: store_error(),
    });
    assert_eq!(error.kind(), "reverse_update_failed");
    assert!(error.to_string().contains("/zones/reverse.zone"));

    let error = ApiError::from(UpdateError::ReloadFailed(ReloadError::EmptyCommand));
    assert_eq!(error.kind(), "reload_failed");
}
