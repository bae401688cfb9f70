// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Unit tests for ExtendedDaemonSet pod ownership.

#[cfg(test)]
mod tests {
    use crate::crd::{ExtendedDaemonSetStatus, ExtendedDaemonSetStatusCanary};
    use crate::workloads::extendeddaemonset::{owned_by_any, owner_replica_sets};
    use k8s_openapi::api::core::v1::Pod;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

    fn status(active: &str, canary: Option<&str>) -> ExtendedDaemonSetStatus {
        ExtendedDaemonSetStatus {
            active_replica_set: active.to_string(),
            canary: canary.map(|name| ExtendedDaemonSetStatusCanary {
                replica_set: name.to_string(),
            }),
        }
    }

    fn pod_owned_by(name: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                owner_references: Some(vec![OwnerReference {
                    api_version: "datadoghq.com/v1alpha1".to_string(),
                    kind: "ExtendedDaemonSetReplicaSet".to_string(),
                    name: name.to_string(),
                    controller: Some(true),
                    ..OwnerReference::default()
                }]),
                ..ObjectMeta::default()
            },
            ..Pod::default()
        }
    }

    #[test]
    fn test_owner_replica_sets_active_only() {
        let owners = owner_replica_sets(Some(&status("agent-abc1234", None)));
        assert_eq!(owners, vec!["agent-abc1234".to_string()]);
    }

    // During a canary rollout two replica sets own pods concurrently
    #[test]
    fn test_owner_replica_sets_with_canary() {
        let owners = owner_replica_sets(Some(&status("agent-abc1234", Some("agent-def5678"))));
        assert_eq!(
            owners,
            vec!["agent-abc1234".to_string(), "agent-def5678".to_string()]
        );
    }

    #[test]
    fn test_owner_replica_sets_no_status() {
        assert!(owner_replica_sets(None).is_empty());
    }

    #[test]
    fn test_pod_owned_by_active_replica_set() {
        let owners = owner_replica_sets(Some(&status("agent-abc1234", Some("agent-def5678"))));
        assert!(owned_by_any(&pod_owned_by("agent-abc1234"), &owners));
    }

    #[test]
    fn test_pod_owned_by_canary_replica_set() {
        let owners = owner_replica_sets(Some(&status("agent-abc1234", Some("agent-def5678"))));
        assert!(owned_by_any(&pod_owned_by("agent-def5678"), &owners));
    }

    #[test]
    fn test_pod_owned_by_stale_replica_set() {
        let owners = owner_replica_sets(Some(&status("agent-abc1234", None)));
        assert!(!owned_by_any(&pod_owned_by("agent-old9999"), &owners));
    }

    #[test]
    fn test_pod_without_owner_references() {
        let owners = vec!["agent-abc1234".to_string()];
        assert!(!owned_by_any(&Pod::default(), &owners));
    }
}
