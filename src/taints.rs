// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! The taint reconciliation core.
//!
//! Pure computation, no I/O: given a node snapshot and the readiness facts
//! the driver gathered for every configured daemon, produce the desired node
//! state and a record of which managed taints were added and removed.
//!
//! Guarantees upheld here and exercised by the tests:
//!
//! - re-running on the algorithm's own output with unchanged readiness
//!   yields an empty change record (idempotence)
//! - a key never appears in both `added` and `removed`
//! - taints whose key does not carry the managed prefix are preserved
//!   verbatim and never reported
//! - the ready-since annotation is written at most once per node

use crate::constants::{READY_SINCE_ANNOTATION_SUFFIX, READY_SINCE_TIMESTAMP_FORMAT};
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Node, Taint};
use std::collections::BTreeSet;

/// Taint effect applied to nodes missing a required daemon.
const TAINT_EFFECT_NO_SCHEDULE: &str = "NoSchedule";

/// Readiness facts for one configured daemon, computed by the driver.
#[derive(Clone, Debug)]
pub struct DaemonCheck {
    /// Canonical managed taint key for this daemon
    pub taint_key: String,
    /// Whether the daemon's selector matches this node
    pub applicable: bool,
    /// Whether at least one attributed pod runs on the node and all are ready
    pub ready: bool,
}

/// Managed taint keys added and removed by one pass. The two sets are
/// disjoint; ordering within each is not part of the contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaintChanges {
    /// Keys of taints added this pass
    pub added: Vec<String>,
    /// Keys of taints removed this pass
    pub removed: Vec<String>,
}

impl TaintChanges {
    /// True when the pass changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute the desired taint set for a node.
///
/// Walks the node's current managed taints into a candidate-removal set,
/// then visits each daemon in configuration order: an applicable, unready
/// daemon either keeps its existing taint (withdrawing it from the removal
/// set) or gains a fresh `NoSchedule` taint. Whatever remains in the removal
/// set is no longer justified - including taints left over from an older
/// configuration - and is stripped.
///
/// Returns the mutated copy and the change record; the caller decides
/// whether the copy differs enough from the snapshot to persist.
#[must_use]
pub fn calculate_taints(node: &Node, prefix: &str, checks: &[DaemonCheck]) -> (Node, TaintChanges) {
    let mut desired = node.clone();
    let mut changes = TaintChanges::default();

    let mut to_remove: BTreeSet<String> = desired
        .spec
        .as_ref()
        .and_then(|spec| spec.taints.as_ref())
        .map(|taints| {
            taints
                .iter()
                .filter(|taint| taint.key.starts_with(prefix))
                .map(|taint| taint.key.clone())
                .collect()
        })
        .unwrap_or_default();

    for check in checks {
        if !check.applicable {
            continue;
        }
        if check.ready {
            // Any existing taint stays in the removal set and gets stripped
            continue;
        }
        if to_remove.remove(&check.taint_key) {
            // Daemon still unready and already tainted: keep the taint
            continue;
        }
        add_taint(&mut desired, &check.taint_key);
        changes.added.push(check.taint_key.clone());
    }

    for key in to_remove {
        remove_taint(&mut desired, &key);
        changes.removed.push(key);
    }

    (desired, changes)
}

/// True when the node carries no taint with the managed prefix.
#[must_use]
pub fn is_taint_less(node: &Node, prefix: &str) -> bool {
    !node
        .spec
        .as_ref()
        .and_then(|spec| spec.taints.as_ref())
        .is_some_and(|taints| taints.iter().any(|taint| taint.key.starts_with(prefix)))
}

/// Maintain the one-shot `<prefix>/ready-since` annotation.
///
/// When the node is taint-less with respect to the managed prefix, the
/// annotation is set to `now` only if absent; an existing value is never
/// overwritten. When the node is tainted, the annotation is left untouched.
/// Returns the value to report, or `None` when it was never set.
pub fn ensure_ready_since(node: &mut Node, prefix: &str, now: DateTime<Utc>) -> Option<String> {
    let key = format!("{prefix}{READY_SINCE_ANNOTATION_SUFFIX}");

    if !is_taint_less(node, prefix) {
        return node
            .metadata
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(&key))
            .cloned();
    }

    let annotations = node.metadata.annotations.get_or_insert_with(Default::default);
    if let Some(existing) = annotations.get(&key) {
        return Some(existing.clone());
    }
    let value = now.format(READY_SINCE_TIMESTAMP_FORMAT).to_string();
    annotations.insert(key, value.clone());
    Some(value)
}

fn add_taint(node: &mut Node, key: &str) {
    let spec = node.spec.get_or_insert_with(Default::default);
    spec.taints.get_or_insert_with(Vec::new).push(Taint {
        key: key.to_string(),
        effect: TAINT_EFFECT_NO_SCHEDULE.to_string(),
        ..Taint::default()
    });
}

fn remove_taint(node: &mut Node, key: &str) {
    if let Some(taints) = node.spec.as_mut().and_then(|spec| spec.taints.as_mut()) {
        taints.retain(|taint| taint.key != key);
    }
}

#[cfg(test)]
#[path = "taints_tests.rs"]
mod taints_tests;
