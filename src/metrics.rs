// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the nodegate controller.
//!
//! Two counters describe everything the controller does to the cluster:
//!
//! - `taint_operations{operation, taint}` - one increment per individual
//!   taint added to or removed from a node
//! - `taint_operation_errors{operation}` - one increment per failed phase
//!   (`calculateTaints` or `nodeUpdate`)
//!
//! Both are registered in a crate-local [`Registry`] and exposed by the HTTP
//! server in [`crate::http`].

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

/// Global Prometheus metrics registry, scraped via the `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of added/removed taint operations
///
/// Labels:
/// - `operation`: `added` or `removed`
/// - `taint`: the full managed taint key
pub static TAINT_OPERATIONS: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        "taint_operations",
        "Total number of added/removed taints operations",
    );
    let counter = CounterVec::new(opts, &["operation", "taint"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of errors during taint operations
///
/// Labels:
/// - `operation`: the phase that failed (`calculateTaints`, `nodeUpdate`)
pub static TAINT_OPERATION_ERRORS: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        "taint_operation_errors",
        "Total number of errors during taint operations",
    );
    let counter = CounterVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Record one taint add or remove against a specific key.
pub fn record_taint_operation(operation: &str, taint: &str) {
    TAINT_OPERATIONS.with_label_values(&[operation, taint]).inc();
}

/// Record a failed reconciliation phase.
pub fn record_taint_operation_error(operation: &str) {
    TAINT_OPERATION_ERRORS.with_label_values(&[operation]).inc();
}

/// Gather and encode all metrics in Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
