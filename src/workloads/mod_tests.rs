// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Unit tests for pod readiness and node attribution.

#[cfg(test)]
mod tests {
    use crate::workloads::{pod_on_node, pod_ready};
    use k8s_openapi::api::core::v1::{Pod, PodCondition, PodSpec, PodStatus};

    fn pod_with_status(phase: Option<&str>, ready: Option<&str>) -> Pod {
        let conditions = ready.map(|status| {
            vec![PodCondition {
                type_: "Ready".to_string(),
                status: status.to_string(),
                ..PodCondition::default()
            }]
        });
        Pod {
            status: Some(PodStatus {
                phase: phase.map(str::to_string),
                conditions,
                ..PodStatus::default()
            }),
            ..Pod::default()
        }
    }

    #[test]
    fn test_pod_ready_running_and_ready() {
        assert!(pod_ready(&pod_with_status(Some("Running"), Some("True"))));
    }

    // A running pod whose readiness probe fails is not serving
    #[test]
    fn test_pod_ready_running_but_not_ready() {
        assert!(!pod_ready(&pod_with_status(Some("Running"), Some("False"))));
    }

    #[test]
    fn test_pod_ready_pending() {
        assert!(!pod_ready(&pod_with_status(Some("Pending"), None)));
        assert!(!pod_ready(&pod_with_status(Some("Pending"), Some("False"))));
    }

    #[test]
    fn test_pod_ready_no_status() {
        assert!(!pod_ready(&Pod::default()));
    }

    #[test]
    fn test_pod_ready_running_without_conditions() {
        assert!(!pod_ready(&pod_with_status(Some("Running"), None)));
    }

    #[test]
    fn test_pod_ready_ignores_other_conditions() {
        let mut pod = pod_with_status(Some("Running"), None);
        pod.status.as_mut().unwrap().conditions = Some(vec![PodCondition {
            type_: "PodScheduled".to_string(),
            status: "True".to_string(),
            ..PodCondition::default()
        }]);
        assert!(!pod_ready(&pod));
    }

    #[test]
    fn test_pod_on_node() {
        let pod = Pod {
            spec: Some(PodSpec {
                node_name: Some("node-1".to_string()),
                ..PodSpec::default()
            }),
            ..Pod::default()
        };
        assert!(pod_on_node(&pod, "node-1"));
        assert!(!pod_on_node(&pod, "node-2"));
        assert!(!pod_on_node(&Pod::default(), "node-1"));
    }
}
