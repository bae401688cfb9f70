// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Unit tests for config loading and validation.

#[cfg(test)]
mod tests {
    use crate::config::{Config, Daemon, WorkloadKind};
    use crate::constants::DEFAULT_TAINT_PREFIX;
    use crate::errors::Error;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            r#"
taintNamePrefix: "pelo.tech"
taintRemovalDelayInSeconds: 10
nodeSelector:
  - "node-pool in (general, ingress)"
daemonsets:
  - name: kiam
    namespace: kube-system
  - name: datadog-agent
    namespace: monitoring
    kind: ExtendedDaemonSet
"#,
        );

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.taint_prefix(), "pelo.tech");
        assert_eq!(config.taint_removal_delay_in_seconds, 10);
        assert_eq!(config.daemonsets.len(), 2);
        assert_eq!(config.daemonsets[0].name, "kiam");
        assert_eq!(config.daemonsets[0].namespace, "kube-system");
        assert_eq!(config.daemonsets[0].kind, WorkloadKind::DaemonSet);
        assert_eq!(config.daemonsets[1].kind, WorkloadKind::ExtendedDaemonSet);
        let selector = config.build_global_selector().unwrap().unwrap();
        assert_eq!(selector.len(), 1);
    }

    // serde_yaml parses JSON too; the config file may be either
    #[test]
    fn test_load_json() {
        let file = write_config(
            r#"{"daemonsets": [{"name": "kiam", "namespace": "kube-system"}]}"#,
        );

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.daemonsets.len(), 1);
        assert_eq!(config.daemonsets[0].name, "kiam");
    }

    #[test]
    fn test_defaults() {
        let file = write_config("daemonsets: []\n");

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.taint_prefix(), DEFAULT_TAINT_PREFIX);
        assert_eq!(config.taint_removal_delay_in_seconds, 0);
        assert!(config.daemonsets.is_empty());
        assert!(config.node_selector.is_none());
        assert!(config.build_global_selector().unwrap().is_none());
    }

    // An explicit empty selector list is global mode matching every node,
    // not the same as leaving nodeSelector out
    #[test]
    fn test_empty_node_selector_matches_everything() {
        let file = write_config("nodeSelector: []\n");

        let config = Config::load(file.path()).unwrap();

        let selector = config.build_global_selector().unwrap().unwrap();
        assert!(selector.is_empty());
    }

    #[test]
    fn test_load_rejects_invalid_selector() {
        let file = write_config(
            r#"
nodeSelector:
  - "zone in (a, b"
"#,
        );

        assert!(matches!(Config::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let result = Config::load("/nonexistent/nodegate-config.yaml");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let file = write_config("daemonsets: [name: only-a-fragment");
        assert!(matches!(Config::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_taint_key_format() {
        let daemon = Daemon {
            name: "kiam".to_string(),
            namespace: "kube-system".to_string(),
            kind: WorkloadKind::DaemonSet,
        };
        assert_eq!(daemon.taint_key("pelo.tech"), "pelo.tech/kube-system.kiam");
    }

    #[test]
    fn test_daemon_display() {
        let daemon = Daemon {
            name: "datadog-agent".to_string(),
            namespace: "monitoring".to_string(),
            kind: WorkloadKind::ExtendedDaemonSet,
        };
        assert_eq!(daemon.to_string(), "ExtendedDaemonSet monitoring/datadog-agent");
    }
}
