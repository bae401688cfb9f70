// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Unit tests for error classification.

#[cfg(test)]
mod tests {
    use crate::errors::{classify_get_error, Error};
    use kube::core::{response::StatusSummary, Status};

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(Box::new(Status {
            status: Some(StatusSummary::Failure),
            message: format!("status {code}"),
            reason: (if code == 404 { "NotFound" } else { "InternalError" }).to_string(),
            code,
            details: None,
            metadata: None,
        }))
    }

    #[test]
    fn test_classify_404_as_not_found() {
        let err = classify_get_error(api_error(404), "DaemonSet", "kube-system", "kiam");

        assert!(err.is_not_found());
        match err {
            Error::WorkloadNotFound {
                kind,
                namespace,
                name,
            } => {
                assert_eq!(kind, "DaemonSet");
                assert_eq!(namespace, "kube-system");
                assert_eq!(name, "kiam");
            }
            other => panic!("expected WorkloadNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_other_api_errors_as_lookup() {
        let err = classify_get_error(api_error(500), "DaemonSet", "kube-system", "kiam");

        assert!(!err.is_not_found());
        match err {
            Error::Lookup { what, .. } => assert_eq!(what, "DaemonSet kube-system/kiam"),
            other => panic!("expected Lookup, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::WorkloadNotFound {
            kind: "ExtendedDaemonSet".to_string(),
            namespace: "monitoring".to_string(),
            name: "datadog-agent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "workload ExtendedDaemonSet monitoring/datadog-agent not found"
        );
    }

    #[test]
    fn test_config_display() {
        let err = Error::Config("bad selector".to_string());
        assert_eq!(err.to_string(), "configuration error: bad selector");
    }

    #[test]
    fn test_persist_is_not_not_found() {
        let err = Error::Persist {
            node: "node-1".to_string(),
            source: api_error(409),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("error updating node node-1"));
    }
}
