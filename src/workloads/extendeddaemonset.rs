// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Readiness source for Datadog `ExtendedDaemonSet` workloads.
//!
//! Unlike a standard DaemonSet, the workload does not own its pods directly:
//! pods carry owner references to replica-set-like objects named in the
//! workload's status. The active replica set always exists; during a rolling
//! canary deployment a second one owns the canary pod generation, and both
//! generations coexist. A pod owned by either satisfies attribution.

use super::{list_namespace_pods, pod_on_node, DaemonWorkload};
use crate::config::Daemon;
use crate::crd::{ExtendedDaemonSet, ExtendedDaemonSetStatus};
use crate::errors::{classify_get_error, Result};
use crate::selector::Selector;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Api, Client};
use std::collections::BTreeMap;

/// One configured ExtendedDaemonSet, addressed by name and namespace.
#[derive(Clone)]
pub struct ExtendedDaemonSetWorkload {
    client: Client,
    name: String,
    namespace: String,
}

impl ExtendedDaemonSetWorkload {
    /// Build the readiness source for a configured daemon entry.
    #[must_use]
    pub fn new(client: Client, daemon: &Daemon) -> Self {
        ExtendedDaemonSetWorkload {
            client,
            name: daemon.name.clone(),
            namespace: daemon.namespace.clone(),
        }
    }

    async fn fetch(&self) -> Result<ExtendedDaemonSet> {
        let api: Api<ExtendedDaemonSet> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(&self.name)
            .await
            .map_err(|e| classify_get_error(e, "ExtendedDaemonSet", &self.namespace, &self.name))
    }
}

#[async_trait]
impl DaemonWorkload for ExtendedDaemonSetWorkload {
    async fn node_selector(&self) -> Result<Selector> {
        let eds = self.fetch().await?;

        let empty = BTreeMap::new();
        let node_selector = eds
            .spec
            .template
            .as_ref()
            .and_then(|template| template.spec.as_ref())
            .and_then(|pod_spec| pod_spec.node_selector.as_ref())
            .unwrap_or(&empty);
        Ok(Selector::from_node_selector(node_selector))
    }

    async fn pods_on_node(&self, node_name: &str) -> Result<Vec<Pod>> {
        let eds = self.fetch().await?;
        let owners = owner_replica_sets(eds.status.as_ref());
        let pods = list_namespace_pods(&self.client, &self.namespace).await?;
        Ok(pods
            .into_iter()
            .filter(|pod| pod_on_node(pod, node_name) && owned_by_any(pod, &owners))
            .collect())
    }
}

/// Replica sets whose pods count toward this workload: the active one, plus
/// the canary one while a rollout is in flight.
fn owner_replica_sets(status: Option<&ExtendedDaemonSetStatus>) -> Vec<String> {
    let Some(status) = status else {
        return Vec::new();
    };
    let mut owners = Vec::with_capacity(2);
    owners.push(status.active_replica_set.clone());
    if let Some(canary) = &status.canary {
        owners.push(canary.replica_set.clone());
    }
    owners
}

/// True when any of the pod's owner references names one of `owners`.
fn owned_by_any(pod: &Pod, owners: &[String]) -> bool {
    let refs: &[OwnerReference] = pod
        .metadata
        .owner_references
        .as_deref()
        .unwrap_or_default();
    refs.iter()
        .any(|owner| owners.iter().any(|name| *name == owner.name))
}

#[cfg(test)]
#[path = "extendeddaemonset_tests.rs"]
mod extendeddaemonset_tests;
