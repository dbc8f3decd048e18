// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common types and errors used by the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::updater::{UpdateError, Updater};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Forward/reverse zone updater
    pub updater: Arc<Updater>,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Forward zone update failed: {0}")]
    ForwardUpdateFailed(String),

    #[error("Reverse zone update failed: {0}")]
    ReverseUpdateFailed(String),

    #[error("Reload failed: {0}")]
    ReloadFailed(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Error category, returned as `details` so clients can branch without parsing messages
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "bad_request",
            ApiError::InvalidAddress(_) => "invalid_address",
            ApiError::ForwardUpdateFailed(_) => "forward_update_failed",
            ApiError::ReverseUpdateFailed(_) => "reverse_update_failed",
            ApiError::ReloadFailed(_) => "reload_failed",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl From<UpdateError> for ApiError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::BadRequest(msg) => ApiError::InvalidRequest(msg),
            e @ UpdateError::InvalidAddress { .. } => ApiError::InvalidAddress(e.to_string()),
            UpdateError::ForwardUpdateFailed { source, .. } => {
                ApiError::ForwardUpdateFailed(source.to_string())
            }
            UpdateError::ReverseUpdateFailed { source } => {
                ApiError::ReverseUpdateFailed(source.to_string())
            }
            UpdateError::ReloadFailed(source) => ApiError::ReloadFailed(source.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            ApiError::ForwardUpdateFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ReverseUpdateFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ReloadFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            details: Some(self.kind().to_string()),
        });

        (status, body).into_response()
    }
}
