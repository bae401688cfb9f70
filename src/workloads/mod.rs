// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Readiness sources for the supported daemon workload kinds.
//!
//! Each required daemon answers two questions through the [`DaemonWorkload`]
//! trait: which nodes is it expected on (its declared node selector), and
//! which of its pods currently run on a given node. Pod attribution differs
//! by variant:
//!
//! - [`daemonset`] - standard `apps/v1` DaemonSet; a pod belongs to the
//!   workload when a direct owner reference names it
//! - [`extendeddaemonset`] - Datadog ExtendedDaemonSet; ownership is
//!   indirect through the active and (during rollouts) canary replica sets
//!
//! New workload kinds are added by implementing this trait, not by branching
//! inside the reconciliation core.

pub mod daemonset;
pub mod extendeddaemonset;

use crate::config::{Daemon, WorkloadKind};
use crate::errors::{Error, Result};
use crate::selector::Selector;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::{Api, Client};

pub use daemonset::DaemonSetWorkload;
pub use extendeddaemonset::ExtendedDaemonSetWorkload;

/// Read-only capability over one daemon workload. Implementations carry
/// their own client, so callers never see which API the pods come from.
#[async_trait]
pub trait DaemonWorkload: Send + Sync {
    /// Fetch the workload's declared placement constraint as a selector.
    ///
    /// # Errors
    ///
    /// [`Error::WorkloadNotFound`] when the workload object is absent; any
    /// other fetch failure surfaces as [`Error::Lookup`].
    async fn node_selector(&self) -> Result<Selector>;

    /// List the pods attributable to this workload on the given node.
    ///
    /// # Errors
    ///
    /// [`Error::Lookup`] on any read failure; the caller aborts the whole
    /// pass for the node, so no partial taint state is ever applied.
    async fn pods_on_node(&self, node_name: &str) -> Result<Vec<Pod>>;
}

/// Build the readiness source for a configured daemon.
#[must_use]
pub fn workload_for(client: Client, daemon: &Daemon) -> Box<dyn DaemonWorkload> {
    match daemon.kind {
        WorkloadKind::DaemonSet => Box::new(DaemonSetWorkload::new(client, daemon)),
        WorkloadKind::ExtendedDaemonSet => {
            Box::new(ExtendedDaemonSetWorkload::new(client, daemon))
        }
    }
}

/// A pod counts as ready when it is running and its `Ready` condition is
/// `True`. Pods that are scheduled but not yet serving stay unready.
#[must_use]
pub fn pod_ready(pod: &Pod) -> bool {
    let Some(status) = &pod.status else {
        return false;
    };
    if status.phase.as_deref() != Some("Running") {
        return false;
    }
    status.conditions.as_ref().is_some_and(|conditions| {
        conditions
            .iter()
            .any(|c| c.type_ == "Ready" && c.status == "True")
    })
}

/// List every pod in a namespace, wrapping failures as lookup errors.
pub(crate) async fn list_namespace_pods(
    client: &Client,
    namespace: &str,
) -> Result<Vec<Pod>, Error> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let list = pods
        .list(&ListParams::default())
        .await
        .map_err(|e| Error::lookup(format!("pods in {namespace}"), e))?;
    Ok(list.items)
}

/// True when the pod is assigned to `node_name`.
pub(crate) fn pod_on_node(pod: &Pod, node_name: &str) -> bool {
    pod.spec
        .as_ref()
        .and_then(|spec| spec.node_name.as_deref())
        == Some(node_name)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
