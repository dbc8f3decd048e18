// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for zonecar
//!
//! This module provides metrics for monitoring the zone update server:
//! - HTTP request metrics (count, duration, status codes)
//! - Update outcomes by result kind
//! - Per-zone write outcomes and current serials
//! - Reload command execution metrics

use lazy_static::lazy_static;
use prometheus::{
    opts, register_counter_vec, register_gauge_vec, register_histogram, register_histogram_vec,
    CounterVec, Encoder, GaugeVec, Histogram, HistogramVec, TextEncoder,
};

lazy_static! {
    /// HTTP request counter by method, path, and status code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        opts!(
            "zonecar_http_requests_total",
            "Total number of HTTP requests processed"
        ),
        &["method", "path", "status"]
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration histogram
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "zonecar_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Name/address updates by result (success or error kind)
    pub static ref SET_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        opts!(
            "zonecar_set_requests_total",
            "Total number of name/address updates"
        ),
        &["result"]
    )
    .expect("Failed to create SET_REQUESTS_TOTAL metric");

    /// Zone file writes by zone (forward/reverse) and result
    pub static ref ZONE_UPDATES_TOTAL: CounterVec = register_counter_vec!(
        opts!(
            "zonecar_zone_updates_total",
            "Total number of zone file updates"
        ),
        &["zone", "result"]
    )
    .expect("Failed to create ZONE_UPDATES_TOTAL metric");

    /// Last written SOA serial by zone
    pub static ref ZONE_SERIAL: GaugeVec = register_gauge_vec!(
        opts!(
            "zonecar_zone_serial",
            "SOA serial last written to the zone file"
        ),
        &["zone"]
    )
    .expect("Failed to create ZONE_SERIAL metric");

    /// Reload command counter by result
    pub static ref RELOAD_COMMANDS_TOTAL: CounterVec = register_counter_vec!(
        opts!(
            "zonecar_reload_commands_total",
            "Total number of name server reload commands executed"
        ),
        &["result"]
    )
    .expect("Failed to create RELOAD_COMMANDS_TOTAL metric");

    /// Reload command duration histogram
    pub static ref RELOAD_COMMAND_DURATION_SECONDS: Histogram = register_histogram!(
        "zonecar_reload_command_duration_seconds",
        "Reload command execution duration in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create RELOAD_COMMAND_DURATION_SECONDS metric");

    /// Application info metric
    pub static ref APP_INFO: CounterVec = register_counter_vec!(
        opts!(
            "zonecar_app_info",
            "Application information"
        ),
        &["version"]
    )
    .expect("Failed to create APP_INFO metric");
}

/// Initialize metrics with application info
pub fn init_metrics() {
    APP_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .inc();
}

/// Generate metrics output in Prometheus format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration);
}

/// Record the outcome of a name/address update
pub fn record_set(result: &str) {
    SET_REQUESTS_TOTAL.with_label_values(&[result]).inc();
}

/// Record a zone file write
pub fn record_zone_update(zone: &str, success: bool) {
    let result = if success { "success" } else { "error" };
    ZONE_UPDATES_TOTAL.with_label_values(&[zone, result]).inc();
}

/// Update the last written serial of a zone
pub fn set_zone_serial(zone: &str, serial: u32) {
    ZONE_SERIAL.with_label_values(&[zone]).set(f64::from(serial));
}

/// Record a reload command execution
pub fn record_reload(success: bool, duration: f64) {
    let result = if success { "success" } else { "error" };
    RELOAD_COMMANDS_TOTAL.with_label_values(&[result]).inc();
    RELOAD_COMMAND_DURATION_SECONDS.observe(duration);
}
