// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Name server reload
//!
//! After both zone files are written the authoritative server is asked to reload
//! them. The default [`CommandReloader`] runs a configured command line, e.g.
//! `/usr/bin/systemctl reload nsd` or `/usr/sbin/rndc reload`.
//!
//! Reloads run while the update lock is held, so they are blocking calls.

use std::process::Command;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

use crate::metrics;

/// Default reload command line
pub const DEFAULT_RELOAD_COMMAND: &str = "/usr/bin/systemctl reload nsd";

/// Reload errors
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("Reload command is empty")]
    EmptyCommand,

    #[error("Failed to execute reload command `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Reload command `{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Asks the authoritative name server to reload its zones
pub trait Reloader: Send + Sync {
    /// Trigger a reload
    ///
    /// # Returns
    /// Output of the reload action on success
    fn reload(&self) -> Result<String, ReloadError>;
}

/// Reloads by running an external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReloader {
    program: String,
    args: Vec<String>,
}

impl CommandReloader {
    /// Create a reloader for `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build a reloader from a whitespace-separated command line
    ///
    /// # Errors
    /// Returns [`ReloadError::EmptyCommand`] if the line has no program
    pub fn parse(command_line: &str) -> Result<Self, ReloadError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or(ReloadError::EmptyCommand)?;
        Ok(Self::new(program, parts.map(str::to_string).collect()))
    }

    /// The full command line, for logs and errors
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for CommandReloader {
    fn default() -> Self {
        Self::new(
            "/usr/bin/systemctl",
            vec!["reload".to_string(), "nsd".to_string()],
        )
    }
}

impl Reloader for CommandReloader {
    fn reload(&self) -> Result<String, ReloadError> {
        let command = self.command_line();
        debug!("Executing reload command: {}", command);

        let start = Instant::now();
        let output = Command::new(&self.program).args(&self.args).output();
        let duration = start.elapsed().as_secs_f64();

        let output = output.map_err(|source| {
            error!("Failed to execute reload command {}: {}", command, source);
            metrics::record_reload(false, duration);
            ReloadError::Spawn {
                command: command.clone(),
                source,
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Reload command failed: {}", stderr);
            metrics::record_reload(false, duration);
            return Err(ReloadError::Failed {
                command,
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("Reload command output: {}", stdout);
        metrics::record_reload(true, duration);
        Ok(stdout)
    }
}
