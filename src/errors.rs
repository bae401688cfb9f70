// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Error types for the nodegate controller.
//!
//! The taxonomy mirrors the failure semantics of a reconciliation pass:
//!
//! - [`Error::WorkloadNotFound`] - a configured daemon workload does not exist
//! - [`Error::Lookup`] - transient read failure against the API server; the
//!   pass aborts without mutating the node and is retried by the controller
//! - [`Error::Persist`] - the node update failed after computation; retried
//! - [`Error::Config`] - malformed selector or unreadable config file; fatal
//!   at startup, the process must not start

use thiserror::Error;

/// Errors surfaced by reconciliation passes and configuration loading.
#[derive(Error, Debug)]
pub enum Error {
    /// A configured daemon workload object does not exist in the cluster.
    ///
    /// Distinguished from [`Error::Lookup`] so callers can treat absence as
    /// "nothing to fetch" rather than a transient failure worth retrying.
    #[error("workload {kind} {namespace}/{name} not found")]
    WorkloadNotFound {
        /// Workload API kind (e.g. `DaemonSet`)
        kind: String,
        /// Namespace of the missing workload
        namespace: String,
        /// Name of the missing workload
        name: String,
    },

    /// Transient failure reading cluster state (nodes, pods or workloads).
    ///
    /// Aborts the current pass with no node mutation; the driver's standard
    /// backoff retries it.
    #[error("error fetching {what}: {source}")]
    Lookup {
        /// What was being fetched when the call failed
        what: String,
        /// Underlying API error
        #[source]
        source: kube::Error,
    },

    /// Failure persisting the computed node update.
    #[error("error updating node {node}: {source}")]
    Persist {
        /// Name of the node whose update failed
        node: String,
        /// Underlying API error
        #[source]
        source: kube::Error,
    },

    /// Invalid configuration: unreadable file, bad document or a selector
    /// expression that does not parse.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a [`Error::Lookup`] with context about what was being fetched.
    pub fn lookup(what: impl Into<String>, source: kube::Error) -> Self {
        Error::Lookup {
            what: what.into(),
            source,
        }
    }

    /// True when this error represents a missing object rather than a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::WorkloadNotFound { .. })
    }
}

/// Classify a `kube::Error` from a workload fetch: 404 becomes
/// [`Error::WorkloadNotFound`], everything else a [`Error::Lookup`].
pub fn classify_get_error(
    err: kube::Error,
    kind: &str,
    namespace: &str,
    name: &str,
) -> Error {
    if let kube::Error::Api(ref resp) = err {
        if resp.code == 404 {
            return Error::WorkloadNotFound {
                kind: kind.to_string(),
                namespace: namespace.to_string(),
                name: name.to_string(),
            };
        }
    }
    Error::lookup(format!("{kind} {namespace}/{name}"), err)
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
