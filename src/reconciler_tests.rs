// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Unit tests for pod-to-node trigger mapping.

#[cfg(test)]
mod tests {
    use crate::reconciler::node_for_daemon_pod;
    use k8s_openapi::api::core::v1::{Pod, PodSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

    fn pod(node_name: Option<&str>, owner: Option<(&str, bool)>) -> Pod {
        let owner_references = owner.map(|(kind, controller)| {
            vec![OwnerReference {
                api_version: "apps/v1".to_string(),
                kind: kind.to_string(),
                name: "kiam".to_string(),
                controller: Some(controller),
                ..OwnerReference::default()
            }]
        });
        Pod {
            metadata: ObjectMeta {
                name: Some("kiam-x7f2p".to_string()),
                namespace: Some("kube-system".to_string()),
                owner_references,
                ..ObjectMeta::default()
            },
            spec: node_name.map(|node| PodSpec {
                node_name: Some(node.to_string()),
                ..PodSpec::default()
            }),
            ..Pod::default()
        }
    }

    #[test]
    fn test_daemonset_pod_maps_to_its_node() {
        let trigger = node_for_daemon_pod(pod(Some("node-1"), Some(("DaemonSet", true))));
        let trigger = trigger.expect("daemonset pod should trigger its node");
        assert_eq!(trigger.name, "node-1");
    }

    // Unscheduled pods have no node to re-reconcile yet
    #[test]
    fn test_unscheduled_pod_is_ignored() {
        assert!(node_for_daemon_pod(pod(None, Some(("DaemonSet", true)))).is_none());
        assert!(node_for_daemon_pod(pod(Some(""), Some(("DaemonSet", true)))).is_none());
    }

    #[test]
    fn test_non_daemonset_pod_is_ignored() {
        assert!(node_for_daemon_pod(pod(Some("node-1"), Some(("ReplicaSet", true)))).is_none());
    }

    #[test]
    fn test_non_controller_owner_is_ignored() {
        assert!(node_for_daemon_pod(pod(Some("node-1"), Some(("DaemonSet", false)))).is_none());
    }

    #[test]
    fn test_unowned_pod_is_ignored() {
        assert!(node_for_daemon_pod(pod(Some("node-1"), None)).is_none());
    }
}
