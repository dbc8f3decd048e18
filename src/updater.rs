// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Forward and reverse zone synchronization
//!
//! [`Updater::set`] binds a name to an address:
//! 1. Validates the name and parses the address
//! 2. Picks the forward type (`A` or `AAAA`) and derives the reverse name
//! 3. Inside the critical section, upserts the forward record, then the PTR record
//! 4. Reloads the name server, still inside the critical section
//!
//! The two zone writes are not a transaction. When the forward zone was written and
//! the reverse zone fails, the forward change stays on disk and the failure is
//! reported as [`UpdateError::ReverseUpdateFailed`] so an operator can reconcile.
//! A failed reload does not roll back either file.

use serde::Serialize;
use std::net::{AddrParseError, IpAddr};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    metrics,
    reload::{ReloadError, Reloader},
    reverse::{forward_type, reverse_name, PTR_TYPE},
    store::{StoreError, ZoneFile},
    zonefile,
};

/// Serializes zone updates
///
/// The whole forward write, reverse write and reload sequence of one request runs
/// inside [`CriticalSection::run`].
pub trait CriticalSection: Send + Sync {
    fn run<T>(&self, f: impl FnOnce() -> T) -> T;
}

/// In-process mutual exclusion for one forward/reverse zone pair
#[derive(Debug, Default)]
pub struct ProcessLock {
    mutex: Mutex<()>,
}

impl ProcessLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CriticalSection for ProcessLock {
    fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        // The zone files are the only state; a panic in another update leaves
        // nothing behind the mutex to repair.
        let _guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

/// No locking, for single-threaded use
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLock;

impl CriticalSection for NoLock {
    fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        f()
    }
}

/// Update errors
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid IP address {ip:?}: {source}")]
    InvalidAddress {
        ip: String,
        source: AddrParseError,
    },

    #[error("Could not update forward {rtype} record: {source}")]
    ForwardUpdateFailed {
        rtype: &'static str,
        source: StoreError,
    },

    #[error("Could not update reverse PTR record (forward record already written): {source}")]
    ReverseUpdateFailed { source: StoreError },

    #[error("Zones updated but reload failed: {0}")]
    ReloadFailed(#[from] ReloadError),
}

impl UpdateError {
    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            UpdateError::BadRequest(_) => "bad_request",
            UpdateError::InvalidAddress { .. } => "invalid_address",
            UpdateError::ForwardUpdateFailed { .. } => "forward_update_failed",
            UpdateError::ReverseUpdateFailed { .. } => "reverse_update_failed",
            UpdateError::ReloadFailed(_) => "reload_failed",
        }
    }
}

/// Result of a successful update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    /// Name as given in the request
    pub name: String,
    /// Canonical text form of the address
    pub address: String,
    /// Forward record type ("A" or "AAAA")
    pub forward_type: String,
    /// Reverse-lookup name of the address
    pub reverse_name: String,
    /// Value written into the PTR record
    pub ptr_target: String,
    /// Forward zone serial after the update
    pub forward_serial: u32,
    /// Reverse zone serial after the update
    pub reverse_serial: u32,
    /// A new forward record was appended
    pub forward_created: bool,
    /// A new PTR record was appended
    pub reverse_created: bool,
}

/// Keeps a forward zone and its reverse zone in sync
pub struct Updater<L = ProcessLock> {
    origin: String,
    forward: ZoneFile,
    reverse: ZoneFile,
    lock: L,
    reloader: Arc<dyn Reloader>,
}

impl<L: CriticalSection> Updater<L> {
    /// Create an updater
    ///
    /// # Arguments
    /// * `origin` - Zone origin appended to relative names in PTR records (e.g., "example.com")
    /// * `forward` - Forward zone file
    /// * `reverse` - Reverse zone file
    /// * `lock` - Critical section shared by every update of this zone pair
    /// * `reloader` - Name server reload action
    pub fn new(
        origin: &str,
        forward: ZoneFile,
        reverse: ZoneFile,
        lock: L,
        reloader: Arc<dyn Reloader>,
    ) -> Self {
        Self {
            origin: origin.trim_end_matches('.').to_string(),
            forward,
            reverse,
            lock,
            reloader,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn forward_zone(&self) -> &ZoneFile {
        &self.forward
    }

    pub fn reverse_zone(&self) -> &ZoneFile {
        &self.reverse
    }

    /// Fully-qualified name written into PTR records
    ///
    /// Relative names get the origin appended (`host` -> `host.example.com.`);
    /// names ending in a dot are already absolute and are used as they are.
    pub fn ptr_target(&self, name: &str) -> String {
        if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{}.{}.", name, self.origin)
        }
    }

    /// Bind `name` to `ip` in the forward and reverse zones, then reload
    ///
    /// # Errors
    /// Returns the first failure; nothing is retried. See [`UpdateError`].
    pub fn set(&self, name: &str, ip: &str) -> Result<UpdateSummary, UpdateError> {
        let result = self.try_set(name, ip);
        match &result {
            Ok(_) => metrics::record_set("success"),
            Err(e) => metrics::record_set(e.kind()),
        }
        result
    }

    fn try_set(&self, name: &str, ip: &str) -> Result<UpdateSummary, UpdateError> {
        if name.is_empty() || ip.is_empty() {
            return Err(UpdateError::BadRequest("Missing name or ip".to_string()));
        }
        if !zonefile::is_plain_field(name) {
            return Err(UpdateError::BadRequest(format!(
                "Invalid name {:?}: must be a single zone file token",
                name
            )));
        }

        let address: IpAddr = ip.parse().map_err(|source| UpdateError::InvalidAddress {
            ip: ip.to_string(),
            source,
        })?;

        let rtype = forward_type(&address);
        let reverse = reverse_name(&address);
        let target = self.ptr_target(name);
        if !zonefile::is_plain_field(&target) {
            return Err(UpdateError::BadRequest(format!(
                "Invalid PTR target {:?}: must be a single zone file token",
                target
            )));
        }
        let value = address.to_string();

        self.lock.run(|| -> Result<UpdateSummary, UpdateError> {
            let forward = self.forward.update(name, rtype, &value).map_err(|source| {
                error!("Forward update of {} {} failed: {}", name, rtype, source);
                metrics::record_zone_update("forward", false);
                UpdateError::ForwardUpdateFailed { rtype, source }
            })?;
            metrics::record_zone_update("forward", true);
            metrics::set_zone_serial("forward", forward.serial);

            let reverse_outcome = self
                .reverse
                .update(&reverse, PTR_TYPE, &target)
                .map_err(|source| {
                    error!(
                        "Reverse update of {} failed after {} {} was written to {}; zones are inconsistent: {}",
                        reverse,
                        name,
                        rtype,
                        self.forward.path().display(),
                        source
                    );
                    metrics::record_zone_update("reverse", false);
                    UpdateError::ReverseUpdateFailed { source }
                })?;
            metrics::record_zone_update("reverse", true);
            metrics::set_zone_serial("reverse", reverse_outcome.serial);

            self.reloader.reload()?;

            info!(
                "Set {} {} {} (PTR {} -> {}), serials {}/{}",
                name, rtype, value, reverse, target, forward.serial, reverse_outcome.serial
            );

            Ok(UpdateSummary {
                name: name.to_string(),
                address: value.clone(),
                forward_type: rtype.to_string(),
                reverse_name: reverse.clone(),
                ptr_target: target.clone(),
                forward_serial: forward.serial,
                reverse_serial: reverse_outcome.serial,
                forward_created: forward.created,
                reverse_created: reverse_outcome.created,
            })
        })
    }
}
