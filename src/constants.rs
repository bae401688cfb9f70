// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Global constants for the nodegate controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Taint Constants
// ============================================================================

/// Default prefix for every taint key managed by this controller.
///
/// Taints produced by nodegate have the form `<prefix>/<namespace>.<name>`.
/// Overridable via `taintNamePrefix` in the config file.
pub const DEFAULT_TAINT_PREFIX: &str = "nidhogg.uswitch.com";

/// Suffix appended to the taint prefix to form the ready-since annotation key
pub const READY_SINCE_ANNOTATION_SUFFIX: &str = "/ready-since";

/// Timestamp format for the ready-since annotation (UTC, second precision)
pub const READY_SINCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ============================================================================
// Metric Label Values
// ============================================================================

/// `operation` label value recorded when a taint is added
pub const TAINT_OPERATION_ADDED: &str = "added";

/// `operation` label value recorded when a taint is removed
pub const TAINT_OPERATION_REMOVED: &str = "removed";

/// `operation` label value for failures while computing the desired taint set
pub const PHASE_CALCULATE_TAINTS: &str = "calculateTaints";

/// `operation` label value for failures while persisting the node update
pub const PHASE_NODE_UPDATE: &str = "nodeUpdate";

// ============================================================================
// Event Constants
// ============================================================================

/// Reason attached to the cluster event emitted when a node's taint set changes
pub const EVENT_REASON_TAINTS_CHANGED: &str = "TaintsChanged";

/// Action attached to the `TaintsChanged` event
pub const EVENT_ACTION_RECONCILE: &str = "Reconcile";

/// Reporting controller name used for events
pub const CONTROLLER_NAME: &str = "nodegate";

// ============================================================================
// Workload Constants
// ============================================================================

/// Controller owner kind that marks a pod as daemonset-managed
pub const DAEMONSET_OWNER_KIND: &str = "DaemonSet";

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default bind address for the metrics HTTP server
pub const METRICS_SERVER_DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Path for the Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness endpoint
pub const HEALTH_SERVER_PATH: &str = "/healthz";

// ============================================================================
// Controller Constants
// ============================================================================

/// Default path of the controller configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Requeue interval after a failed reconciliation pass
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Number of worker threads for the Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
