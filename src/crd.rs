// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Minimal typed view of the Datadog `ExtendedDaemonSet` custom resource.
//!
//! Nodegate never creates or mutates these objects; it only reads the pod
//! template (for the node selector) and the status (for the replica sets that
//! currently own pods). Only those fields are modelled - everything else in
//! the upstream CRD is ignored during deserialization.

use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Spec subset of `datadoghq.com/v1alpha1` `ExtendedDaemonSet`.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "datadoghq.com",
    version = "v1alpha1",
    kind = "ExtendedDaemonSet",
    namespaced
)]
#[kube(status = "ExtendedDaemonSetStatus")]
#[serde(rename_all = "camelCase")]
pub struct ExtendedDaemonSetSpec {
    /// Pod template; its `spec.nodeSelector` decides node applicability
    #[serde(default)]
    pub template: Option<PodTemplateSpec>,
}

/// Status subset carrying the replica sets that own this workload's pods.
///
/// The active replica set always owns pods; during a canary rollout a second
/// replica set owns the canary generation concurrently. Pods owned by either
/// count toward readiness.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedDaemonSetStatus {
    /// Name of the replica set serving the stable pod generation
    #[serde(default)]
    pub active_replica_set: String,

    /// Canary rollout state, present only while a canary is in flight
    #[serde(default)]
    pub canary: Option<ExtendedDaemonSetStatusCanary>,
}

/// Canary slice of the `ExtendedDaemonSet` status.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedDaemonSetStatusCanary {
    /// Name of the replica set serving the canary pod generation
    #[serde(default)]
    pub replica_set: String,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
