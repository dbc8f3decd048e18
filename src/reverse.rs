// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reverse-lookup names for IP addresses

use std::fmt::Write;
use std::net::IpAddr;

/// Record type of reverse-lookup records
pub const PTR_TYPE: &str = "PTR";

/// Forward record type for an address: `A` for IPv4, `AAAA` for IPv6
pub fn forward_type(addr: &IpAddr) -> &'static str {
    match addr {
        IpAddr::V4(_) => "A",
        IpAddr::V6(_) => "AAAA",
    }
}

/// Fully-qualified reverse-lookup name of an address
///
/// - IPv4: bytes in reverse order under `in-addr.arpa.` (192.0.2.10 ->
///   `10.2.0.192.in-addr.arpa.`)
/// - IPv6: the 32 nibbles in reverse order, lowercase hex, under `ip6.arpa.`
pub fn reverse_name(addr: &IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{}.{}.{}.{}.in-addr.arpa.", d, c, b, a)
        }
        IpAddr::V6(v6) => {
            let mut name = String::with_capacity(73);
            for byte in v6.octets().iter().rev() {
                // Writing to a String cannot fail
                let _ = write!(name, "{:x}.{:x}.", byte & 0x0f, byte >> 4);
            }
            name.push_str("ip6.arpa.");
            name
        }
    }
}
