// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone update server
//!
//! A small HTTP server that keeps a forward zone and its reverse zone in sync:
//! - Accepts authenticated `name`/`ip` update requests
//! - Upserts the A/AAAA record and the matching PTR record, bumping both serials
//! - Asks the authoritative name server to reload
//!
//! This server runs next to the name server, with write access to its zone files.

use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, warn};

use zonecar::{
    auth::SharedSecret,
    config::Config,
    metrics,
    reload::CommandReloader,
    server,
    store::ZoneFile,
    types::AppState,
    updater::{ProcessLock, Updater},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("starting zonecar v{}", env!("CARGO_PKG_VERSION"));

    // initialize metrics
    metrics::init_metrics();

    // get configuration from environment
    let config = Config::from_env().context("invalid configuration")?;

    info!("zone origin: {}", config.origin);
    info!("forward zone: {}", config.forward_zone.display());
    info!("reverse zone: {}", config.reverse_zone.display());
    info!("reload command: {}", config.reload_command);
    if config.disable_auth {
        warn!("⚠️  authentication is disabled - the update endpoint is unprotected!");
    } else {
        info!("authentication is enabled");
    }

    // verify zone files exist
    for path in [&config.forward_zone, &config.reverse_zone] {
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            error!("zone file does not exist: {}", path.display());
            return Err(anyhow::anyhow!("zone file not found: {}", path.display()));
        }
    }

    let reloader =
        CommandReloader::parse(&config.reload_command).context("invalid reload command")?;

    let updater = Updater::new(
        &config.origin,
        ZoneFile::new(&config.forward_zone),
        ZoneFile::new(&config.reverse_zone),
        ProcessLock::new(),
        Arc::new(reloader),
    );

    let state = AppState {
        updater: Arc::new(updater),
    };

    let secret = if config.disable_auth {
        None
    } else {
        config.secret.as_deref().map(SharedSecret::new)
    };

    let app = server::build_router(state, secret);

    info!("zonecar listening on {}", config.bind_addr);
    info!(
        "swagger ui available at http://{}/api/v1/docs",
        config.bind_addr
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
