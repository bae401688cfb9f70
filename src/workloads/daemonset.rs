// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Readiness source for standard `apps/v1` DaemonSets.

use super::{list_namespace_pods, pod_on_node, DaemonWorkload};
use crate::config::Daemon;
use crate::errors::{classify_get_error, Result};
use crate::selector::Selector;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};
use std::collections::BTreeMap;

/// One configured DaemonSet, addressed by name and namespace.
#[derive(Clone)]
pub struct DaemonSetWorkload {
    client: Client,
    name: String,
    namespace: String,
}

impl DaemonSetWorkload {
    /// Build the readiness source for a configured daemon entry.
    #[must_use]
    pub fn new(client: Client, daemon: &Daemon) -> Self {
        DaemonSetWorkload {
            client,
            name: daemon.name.clone(),
            namespace: daemon.namespace.clone(),
        }
    }
}

/// A pod belongs to a daemonset when any direct owner reference names it.
fn directly_owned_by(pod: &Pod, name: &str) -> bool {
    pod.metadata
        .owner_references
        .as_ref()
        .is_some_and(|owners| owners.iter().any(|owner| owner.name == name))
}

#[async_trait]
impl DaemonWorkload for DaemonSetWorkload {
    async fn node_selector(&self) -> Result<Selector> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), &self.namespace);
        let ds = api
            .get(&self.name)
            .await
            .map_err(|e| classify_get_error(e, "DaemonSet", &self.namespace, &self.name))?;

        let empty = BTreeMap::new();
        let node_selector = ds
            .spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .and_then(|pod_spec| pod_spec.node_selector.as_ref())
            .unwrap_or(&empty);
        Ok(Selector::from_node_selector(node_selector))
    }

    async fn pods_on_node(&self, node_name: &str) -> Result<Vec<Pod>> {
        let pods = list_namespace_pods(&self.client, &self.namespace).await?;
        Ok(pods
            .into_iter()
            .filter(|pod| pod_on_node(pod, node_name) && directly_owned_by(pod, &self.name))
            .collect())
    }
}

#[cfg(test)]
#[path = "daemonset_tests.rs"]
mod daemonset_tests;
