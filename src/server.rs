// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP router
//!
//! Routes:
//! - `GET /api/v1/update` - authenticated name/address update
//! - `GET /` - same update, for clients configured with a bare URL
//! - `GET /api/v1/health`, `GET /api/v1/ready`, `GET /metrics`
//! - Swagger UI at `/api/v1/docs`

use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authenticate, SharedSecret},
    handlers, metrics, middleware,
    types::{AppState, ErrorResponse},
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(handlers::update_record),
    components(schemas(handlers::UpdateResponse, crate::updater::UpdateSummary)),
    tags(
        (name = "update", description = "Forward and reverse record updates")
    ),
    info(
        title = "Zonecar API",
        version = "0.1.0",
        description = "Binds names to addresses in forward and reverse DNS zone files",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Readiness check response
#[derive(Serialize)]
struct ReadyResponse {
    ready: bool,
    checks: Vec<String>,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Metrics endpoint for Prometheus scraping
async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(metrics_text) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            metrics_text,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to gather metrics: {}", e),
                details: None,
            }),
        )
            .into_response(),
    }
}

/// Check that a zone file exists and can be written
async fn check_zone_file(label: &str, path: &Path, checks: &mut Vec<String>) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() && !metadata.permissions().readonly() => {
            checks.push(format!("{}_zone_writable: {}", label, path.display()));
            true
        }
        Ok(_) => {
            checks.push(format!("{}_zone_not_writable: {}", label, path.display()));
            false
        }
        Err(e) => {
            checks.push(format!("{}_zone_error: {}", label, e));
            false
        }
    }
}

/// Readiness check endpoint
async fn ready_check(State(state): State<AppState>) -> Json<ReadyResponse> {
    let mut checks = Vec::new();

    let forward = check_zone_file(
        "forward",
        state.updater.forward_zone().path(),
        &mut checks,
    )
    .await;
    let reverse = check_zone_file(
        "reverse",
        state.updater.reverse_zone().path(),
        &mut checks,
    )
    .await;

    Json(ReadyResponse {
        ready: forward && reverse,
        checks,
    })
}

/// Build the application router
///
/// # Arguments
/// * `state` - Shared application state
/// * `secret` - Shared secret for update requests; `None` disables authentication
pub fn build_router(state: AppState, secret: Option<SharedSecret>) -> Router {
    let update_routes = Router::new()
        .route("/", get(handlers::update_record))
        .route("/api/v1/update", get(handlers::update_record))
        .with_state(state.clone());

    // conditionally apply authentication middleware
    let update_routes = match secret {
        Some(secret) => {
            update_routes.layer(axum_middleware::from_fn_with_state(secret, authenticate))
        }
        None => update_routes,
    };

    Router::new()
        .merge(SwaggerUi::new("/api/v1/docs").url("/api/v1/openapi.json", ApiDoc::openapi()))
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/ready", get(ready_check))
        .route("/metrics", get(metrics_handler))
        .merge(update_routes)
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::track_metrics))
        .layer(TraceLayer::new_for_http())
}
