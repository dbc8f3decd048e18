// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Update API handler
//!
//! A single endpoint binds a name to an address:
//! `GET /api/v1/update?name=<name>&ip=<address>`
//!
//! The update itself does blocking file I/O and runs the reload command under the
//! update lock, so it is moved onto tokio's blocking pool. A started update always
//! runs to completion, even if the client goes away.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

use crate::{
    types::{ApiError, AppState},
    updater::UpdateSummary,
};

/// Update request parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UpdateQuery {
    /// Record name, relative to the zone origin (e.g., "host")
    #[serde(default)]
    pub name: String,

    /// IPv4 or IPv6 address (e.g., "192.0.2.10", "2001:db8::10")
    #[serde(default)]
    pub ip: String,
}

/// Response from a successful update
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<UpdateSummary>,
}

/// Bind a name to an address
///
/// This endpoint:
/// 1. Upserts the A/AAAA record in the forward zone and bumps its serial
/// 2. Upserts the PTR record in the reverse zone and bumps its serial
/// 3. Reloads the name server
#[utoipa::path(
    get,
    path = "/api/v1/update",
    params(UpdateQuery),
    responses(
        (status = 200, description = "Records updated and name server reloaded", body = UpdateResponse),
        (status = 400, description = "Missing name or ip, or invalid address"),
        (status = 401, description = "Missing credentials"),
        (status = 403, description = "Wrong secret"),
        (status = 500, description = "Zone file update failed"),
        (status = 502, description = "Reload command failed")
    ),
    tag = "update"
)]
pub async fn update_record(
    State(state): State<AppState>,
    Query(query): Query<UpdateQuery>,
) -> Result<Json<UpdateResponse>, ApiError> {
    debug!("Update request: {:?} -> {:?}", query.name, query.ip);

    let updater = state.updater.clone();
    let UpdateQuery { name, ip } = query;

    let summary = tokio::task::spawn_blocking(move || updater.set(&name, &ip))
        .await
        .map_err(|e| {
            error!("Update task failed: {}", e);
            ApiError::InternalError(format!("Update task failed: {}", e))
        })?
        .map_err(|e| {
            error!("Update failed ({}): {}", e.kind(), e);
            ApiError::from(e)
        })?;

    info!(
        "Updated {} {} {}",
        summary.name, summary.forward_type, summary.address
    );

    Ok(Json(UpdateResponse {
        success: true,
        message: format!(
            "{} {} {} updated",
            summary.name, summary.forward_type, summary.address
        ),
        details: Some(summary),
    }))
}
