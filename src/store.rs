// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone file read-modify-write
//!
//! A [`ZoneFile`] owns one zone file on disk. Each update reads the whole file,
//! parses it, applies [`upsert`], and writes the result back over the same file.
//! The file is only truncated after parse and upsert both succeeded, so a failed
//! update leaves it untouched.
//!
//! Truncate-then-write is not atomic: a crash between the two loses the file's
//! content. No temp-file-and-rename is done, so the file keeps its inode, owner
//! and permissions for the name server.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::{
    upsert::{upsert, UpsertError, Upserted},
    zonefile::{Zone, ZoneParseError},
};

/// Zone file store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on zone file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse zone file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: ZoneParseError,
    },

    #[error("Failed to update zone file {}: {source}", .path.display())]
    Upsert {
        path: PathBuf,
        source: UpsertError,
    },
}

/// A zone file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneFile {
    path: PathBuf,
}

impl ZoneFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upsert one record and bump the serial of this zone file
    ///
    /// The file handle is held for the whole call and closed on every path.
    ///
    /// # Arguments
    /// * `domain` - Owner name of the record
    /// * `rtype` - Record type
    /// * `value` - Record value
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, read or written, does not
    /// parse, or the upsert fails. Parse and upsert failures leave the file untouched.
    pub fn update(&self, domain: &str, rtype: &str, value: &str) -> Result<Upserted, StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(io_error)?;

        let mut current = Vec::new();
        file.read_to_end(&mut current).map_err(io_error)?;

        let mut zone = Zone::from_bytes(&current).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let outcome =
            upsert(&mut zone, domain, rtype, value).map_err(|source| StoreError::Upsert {
                path: self.path.clone(),
                source,
            })?;

        let rendered = zone.to_string();

        file.set_len(0).map_err(io_error)?;
        file.seek(SeekFrom::Start(0)).map_err(io_error)?;
        file.write_all(rendered.as_bytes()).map_err(io_error)?;
        // Appended records carry no line terminator of their own
        if outcome.created {
            file.write_all(zone.line_ending().as_bytes())
                .map_err(io_error)?;
        }
        file.sync_data().map_err(io_error)?;

        debug!(
            "Wrote zone file {}: serial {} -> {}, created: {}",
            self.path.display(),
            outcome.previous_serial,
            outcome.serial,
            outcome.created
        );

        Ok(outcome)
    }
}
