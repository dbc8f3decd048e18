// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Server configuration from environment variables
//!
//! Environment variables:
//! - `ZONE_ORIGIN`: Origin appended to names in PTR records (required)
//! - `FORWARD_ZONE_FILE`: Path of the forward zone file (required)
//! - `REVERSE_ZONE_FILE`: Path of the reverse zone file (required)
//! - `BIND_ADDR`: Listen address (default: 0.0.0.0:8080)
//! - `UPDATE_SECRET`: Shared secret for update requests (required unless auth is disabled)
//! - `DISABLE_AUTH`: Disable authentication (default: false)
//! - `RELOAD_COMMAND`: Name server reload command (default: /usr/bin/systemctl reload nsd)

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::{reload::DEFAULT_RELOAD_COMMAND, zonefile};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Zone origin without trailing dot (e.g., "example.com")
    pub origin: String,
    pub forward_zone: PathBuf,
    pub reverse_zone: PathBuf,
    pub bind_addr: SocketAddr,
    /// `None` only when authentication is disabled
    pub secret: Option<String>,
    pub disable_auth: bool,
    pub reload_command: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let origin_value = require("ZONE_ORIGIN")?;
        let origin = origin_value.trim().trim_end_matches('.').to_string();
        // PTR targets are written as `name.origin.`, one zone file token
        if !zonefile::is_plain_field(&origin) {
            return Err(ConfigError::Invalid {
                name: "ZONE_ORIGIN",
                value: origin_value,
            });
        }

        let forward_zone = PathBuf::from(require("FORWARD_ZONE_FILE")?);
        let reverse_zone = PathBuf::from(require("REVERSE_ZONE_FILE")?);

        let bind_value = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_value.clone(),
        })?;

        let disable_auth = match get("DISABLE_AUTH") {
            Some(value) => value.parse::<bool>().map_err(|_| ConfigError::Invalid {
                name: "DISABLE_AUTH",
                value,
            })?,
            None => false,
        };

        let secret = get("UPDATE_SECRET");
        if secret.is_none() && !disable_auth {
            return Err(ConfigError::Missing("UPDATE_SECRET"));
        }

        let reload_command =
            get("RELOAD_COMMAND").unwrap_or_else(|| DEFAULT_RELOAD_COMMAND.to_string());

        Ok(Self {
            origin,
            forward_zone,
            reverse_zone,
            bind_addr,
            secret,
            disable_auth,
            reload_command,
        })
    }
}
