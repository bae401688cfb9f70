// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Controller configuration.
//!
//! The config file (YAML or JSON) is loaded once at startup and is immutable
//! for the process lifetime. It lists the daemon workloads that must be ready
//! on each applicable node, plus the taint prefix, the optional removal delay
//! and the optional global node selector.
//!
//! ```yaml
//! taintNamePrefix: "nidhogg.uswitch.com"
//! taintRemovalDelayInSeconds: 10
//! nodeSelector:
//!   - "node-pool in (general, ingress)"
//! daemonsets:
//!   - name: kiam
//!     namespace: kube-system
//!   - name: datadog-agent
//!     namespace: monitoring
//!     kind: ExtendedDaemonSet
//! ```
//!
//! When `nodeSelector` is present every daemon shares the selector parsed
//! from it; when absent, each daemon's selector is resolved from its own pod
//! template (see [`crate::resolver`]).

use crate::constants::DEFAULT_TAINT_PREFIX;
use crate::errors::Error;
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Which workload API a configured daemon lives behind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    /// Standard `apps/v1` DaemonSet; pods carry a direct owner reference
    #[default]
    DaemonSet,
    /// Datadog `datadoghq.com/v1alpha1` ExtendedDaemonSet; pods are owned by
    /// the workload's active (and, during a rollout, canary) replica sets
    ExtendedDaemonSet,
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadKind::DaemonSet => write!(f, "DaemonSet"),
            WorkloadKind::ExtendedDaemonSet => write!(f, "ExtendedDaemonSet"),
        }
    }
}

/// A required daemon workload, identified by name, namespace and API kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Daemon {
    /// Workload name
    pub name: String,
    /// Workload namespace
    pub namespace: String,
    /// Workload API kind; defaults to the standard DaemonSet variant
    #[serde(default)]
    pub kind: WorkloadKind,
}

impl Daemon {
    /// Canonical taint key for this daemon: `<prefix>/<namespace>.<name>`.
    #[must_use]
    pub fn taint_key(&self, prefix: &str) -> String {
        format!("{prefix}/{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for Daemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// Top-level controller configuration, deserialized from the config file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Prefix for managed taint keys; empty means the built-in default
    #[serde(default)]
    pub taint_name_prefix: String,

    /// Seconds to wait before removing a taint that became removal-eligible,
    /// to damp flapping when a daemon briefly loses readiness. 0 disables it.
    #[serde(default)]
    pub taint_removal_delay_in_seconds: u64,

    /// Daemon workloads that must be ready on applicable nodes, evaluated in
    /// this order on every pass
    #[serde(default)]
    pub daemonsets: Vec<Daemon>,

    /// Raw selector expressions shared by every daemon. `None` switches to
    /// per-daemon selector resolution; an empty list matches every node.
    #[serde(default)]
    pub node_selector: Option<Vec<String>>,
}

impl Config {
    /// Load and validate a config file. Accepts YAML or JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read, does not parse,
    /// or contains an invalid selector expression.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("unable to read config file {}: {e}", path.display())))?;
        let config: Config = serde_yaml::from_str(&raw)
            .map_err(|e| Error::Config(format!("error parsing config file {}: {e}", path.display())))?;
        // Surface selector syntax errors at startup rather than mid-pass
        config.build_global_selector()?;
        Ok(config)
    }

    /// Effective taint prefix, falling back to the built-in default.
    #[must_use]
    pub fn taint_prefix(&self) -> &str {
        if self.taint_name_prefix.is_empty() {
            DEFAULT_TAINT_PREFIX
        } else {
            &self.taint_name_prefix
        }
    }

    /// Parse the configured `nodeSelector` expressions into one conjunctive
    /// selector. `None` means no global selector is configured and each
    /// daemon resolves its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an expression that does not parse.
    pub fn build_global_selector(&self) -> Result<Option<Selector>, Error> {
        let Some(expressions) = &self.node_selector else {
            return Ok(None);
        };
        let mut selector = Selector::everything();
        for raw in expressions {
            selector = selector.and(Selector::parse(raw)?);
        }
        Ok(Some(selector))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
