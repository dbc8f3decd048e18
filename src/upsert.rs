// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record upsert and SOA serial bump
//!
//! A single pass over the zone:
//! - every record whose type and owner name match exactly gets its first value
//!   overwritten
//! - the SOA serial is incremented by one
//!
//! When no record matched, a new `domain type value` record is appended. Records are
//! never removed or deduplicated here.
//!
//! The serial is bumped on every successful call, even if the value was already
//! correct. Name servers reload on serial change, not on content change.

use thiserror::Error;
use tracing::debug;

use crate::zonefile::{self, Zone, SOA_TYPE};

/// Number of value fields in an SOA record
pub const SOA_FIELD_COUNT: usize = 7;

/// Position of the serial among the SOA values
pub const SOA_SERIAL_INDEX: usize = 2;

/// Upsert errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsertError {
    #[error("SOA record on line {line} has {actual} fields, expected {expected}")]
    MalformedSoa {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("SOA record on line {line} has invalid serial {serial:?}")]
    InvalidSerial { line: usize, serial: String },

    #[error("Zone has no SOA record")]
    MissingSoa,

    #[error("Invalid record {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Outcome of a successful upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted {
    /// A new record was appended
    pub created: bool,
    /// Number of existing records whose value was overwritten
    pub updated: usize,
    /// Serial before the bump
    pub previous_serial: u32,
    /// Serial after the bump
    pub serial: u32,
}

/// Parse an SOA serial: decimal digits only, within `u32`
fn parse_serial(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn check_field(field: &'static str, value: &str) -> Result<(), UpsertError> {
    if zonefile::is_plain_field(value) {
        Ok(())
    } else {
        Err(UpsertError::InvalidField {
            field,
            value: value.to_string(),
        })
    }
}

/// Set `domain rtype` to `value` and bump the zone serial
///
/// # Arguments
/// * `zone` - Zone to modify in place
/// * `domain` - Owner name, compared byte for byte
/// * `rtype` - Record type (e.g., "A", "AAAA", "PTR")
/// * `value` - New first value of the record
///
/// # Errors
/// - [`UpsertError::InvalidField`] if a field cannot be written as one plain token,
///   or `rtype` is `SOA`
/// - [`UpsertError::MalformedSoa`] if the SOA does not have 7 values
/// - [`UpsertError::InvalidSerial`] if the serial is not a decimal `u32`
/// - [`UpsertError::MissingSoa`] if the zone has no SOA record
///
/// On error the zone may be partially modified and must be discarded.
pub fn upsert(
    zone: &mut Zone,
    domain: &str,
    rtype: &str,
    value: &str,
) -> Result<Upserted, UpsertError> {
    check_field("domain", domain)?;
    check_field("value", value)?;
    if !zonefile::is_record_type(rtype) || rtype == SOA_TYPE {
        return Err(UpsertError::InvalidField {
            field: "type",
            value: rtype.to_string(),
        });
    }

    let mut updated = 0;
    let mut serials = None;

    for entry in zone.records_mut() {
        if entry.record_type() == Some(rtype) && entry.domain() == Some(domain) {
            let previous = entry.set_value(0, value);
            debug!(
                "Updated {} {} on line {}: {:?} -> {}",
                domain,
                rtype,
                entry.line(),
                previous,
                value
            );
            updated += 1;
        }

        if entry.record_type() != Some(SOA_TYPE) {
            continue;
        }

        let (count, serial_text) = {
            let values = entry.values();
            (
                values.len(),
                values.get(SOA_SERIAL_INDEX).map(|s| s.to_string()),
            )
        };
        if count != SOA_FIELD_COUNT {
            return Err(UpsertError::MalformedSoa {
                line: entry.line(),
                expected: SOA_FIELD_COUNT,
                actual: count,
            });
        }

        let serial_text = serial_text.unwrap_or_default();
        let previous = parse_serial(&serial_text).ok_or_else(|| UpsertError::InvalidSerial {
            line: entry.line(),
            serial: serial_text.clone(),
        })?;
        // RFC 1982: 4294967295 + 1 wraps to 0
        let next = previous.wrapping_add(1);
        entry.set_value(SOA_SERIAL_INDEX, &next.to_string());
        serials = Some((previous, next));
    }

    let (previous_serial, serial) = serials.ok_or(UpsertError::MissingSoa)?;

    let created = updated == 0;
    if created {
        zone.append(domain, rtype, value)
            .map_err(|e| UpsertError::InvalidField {
                field: "record",
                value: e.to_string(),
            })?;
        debug!("Appended {} {} {}", domain, rtype, value);
    }

    Ok(Upserted {
        created,
        updated,
        previous_serial,
        serial,
    })
}
