// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! zonecar - binds names to addresses in forward and reverse DNS zone files
//!
//! A small library and server that keeps a forward zone and its matching reverse
//! zone in sync. Given a name and an IP address it:
//!
//! - upserts the `A` or `AAAA` record in the forward zone file
//! - upserts the `PTR` record under `in-addr.arpa.` or `ip6.arpa.` in the reverse
//!   zone file
//! - bumps the SOA serial of each file exactly once
//! - asks the authoritative name server to reload
//!
//! Zone files are rewritten in place, keeping every byte that was not changed.
//!
//! # Usage
//!
//! ## As a Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zonecar::{CommandReloader, ProcessLock, Updater, ZoneFile};
//!
//! let updater = Updater::new(
//!     "example.com",
//!     ZoneFile::new("/etc/nsd/example.com.zone"),
//!     ZoneFile::new("/etc/nsd/2.0.192.in-addr.arpa.zone"),
//!     ProcessLock::new(),
//!     Arc::new(CommandReloader::default()),
//! );
//!
//! let summary = updater.set("host", "192.0.2.10")?;
//! assert_eq!(summary.reverse_name, "10.2.0.192.in-addr.arpa.");
//! # Ok::<(), zonecar::UpdateError>(())
//! ```
//!
//! ## Reverse Names
//!
//! ```rust
//! use zonecar::reverse_name;
//!
//! let addr = "192.0.2.10".parse().unwrap();
//! assert_eq!(reverse_name(&addr), "10.2.0.192.in-addr.arpa.");
//! ```
//!
//! ## As a Binary
//!
//! ```bash
//! ZONE_ORIGIN=example.com \
//! FORWARD_ZONE_FILE=/etc/nsd/example.com.zone \
//! REVERSE_ZONE_FILE=/etc/nsd/2.0.192.in-addr.arpa.zone \
//! UPDATE_SECRET=changeme \
//! zonecar
//!
//! curl "http://localhost:8080/api/v1/update?name=host&ip=192.0.2.10&secret=changeme"
//! ```

pub mod auth;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod reload;
pub mod reverse;
pub mod server;
pub mod store;
pub mod types;
pub mod updater;
pub mod upsert;
pub mod zonefile;

// Re-export commonly used types

// Zone text model and record upsert
pub use upsert::{upsert, UpsertError, Upserted};
pub use zonefile::{Entry, Zone, ZoneParseError};

// Reverse names
pub use reverse::{forward_type, reverse_name};

// Zone files and updates
pub use reload::{CommandReloader, ReloadError, Reloader};
pub use store::{StoreError, ZoneFile};
pub use updater::{CriticalSection, NoLock, ProcessLock, UpdateError, UpdateSummary, Updater};

// Error types
pub use types::{ApiError, AppState, ErrorResponse};

// Test modules
#[cfg(test)]
mod auth_test;
#[cfg(test)]
mod handlers_test;
#[cfg(test)]
mod types_test;
