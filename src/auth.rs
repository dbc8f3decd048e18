// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared-secret authentication middleware
//!
//! Update requests must present the configured secret, either as a Bearer token or
//! as a `secret` query parameter (the form most dynamic DNS clients and routers can
//! send). Secrets are compared by SHA-256 digest, so the comparison time does not
//! depend on how much of the candidate matches.

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{debug, warn};

/// Error response for authentication failures
#[derive(Serialize)]
pub struct AuthError {
    pub error: String,
}

/// The secret update requests must present
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret {
    digest: [u8; 32],
}

impl SharedSecret {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: digest(secret),
        }
    }

    /// Check a candidate secret
    pub fn matches(&self, candidate: &str) -> bool {
        digest(candidate) == self.digest
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}

/// Query parameters read by the middleware; everything else is left to the handler
#[derive(Debug, Default, Deserialize)]
pub struct SecretParams {
    #[serde(default)]
    pub secret: Option<String>,
}

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<AuthError>) {
    (
        status,
        Json(AuthError {
            error: message.to_string(),
        }),
    )
}

/// Authentication middleware
///
/// # Credentials
/// - `Authorization: Bearer <secret>`, or
/// - `?secret=<secret>`
///
/// # Errors
/// - 401 Unauthorized if no credential is present or the header is malformed
/// - 403 Forbidden if the credential does not match the shared secret
pub async fn authenticate(
    State(secret): State<SharedSecret>,
    Query(params): Query<SecretParams>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<AuthError>)> {
    let from_header = match headers.get("authorization") {
        Some(value) => {
            let value = value.to_str().map_err(|_| {
                warn!("Invalid Authorization header encoding");
                reject(StatusCode::UNAUTHORIZED, "Invalid Authorization header")
            })?;
            let token = value.strip_prefix("Bearer ").ok_or_else(|| {
                warn!("Invalid Authorization header format");
                reject(
                    StatusCode::UNAUTHORIZED,
                    "Invalid Authorization header format. Expected: Bearer <secret>",
                )
            })?;
            Some(token.to_string())
        }
        None => None,
    };

    let candidate = from_header.or(params.secret).ok_or_else(|| {
        warn!("Missing credentials");
        reject(StatusCode::UNAUTHORIZED, "Missing credentials")
    })?;

    if candidate.is_empty() || !secret.matches(&candidate) {
        warn!("Rejected request with wrong secret");
        return Err(reject(StatusCode::FORBIDDEN, "Forbidden"));
    }

    debug!("Request authenticated");

    Ok(next.run(request).await)
}
