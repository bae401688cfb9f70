// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! # Nodegate - node readiness taint controller for Kubernetes
//!
//! Nodegate keeps node taints converged to the readiness of required
//! per-node daemons. A node carries a `NoSchedule` taint for every configured
//! daemon whose pods are not yet ready on it; once every daemon is ready the
//! taints are removed and the node becomes schedulable for general
//! workloads. The first time a node becomes fully taint-less, a one-shot
//! `ready-since` annotation records when that happened.
//!
//! ## Modules
//!
//! - [`taints`] - the pure taint reconciliation core
//! - [`reconciler`] - the controller driver tying the core to the cluster
//! - [`workloads`] - readiness sources per supported workload kind
//! - [`resolver`] - per-daemon node selector resolution and caching
//! - [`selector`] - label selector parsing and matching
//! - [`config`] - config file loading and validation
//! - [`crd`] - typed view of the `ExtendedDaemonSet` custom resource
//! - [`metrics`] - taint operation counters
//! - [`http`] - `/metrics` and `/healthz` endpoints
//!
//! ## Example
//!
//! ```rust
//! use nodegate::config::{Config, Daemon};
//! use nodegate::taints::{calculate_taints, DaemonCheck};
//! use k8s_openapi::api::core::v1::Node;
//!
//! let daemon = Daemon {
//!     name: "kiam".to_string(),
//!     namespace: "kube-system".to_string(),
//!     kind: Default::default(),
//! };
//! let config = Config::default();
//!
//! let checks = vec![DaemonCheck {
//!     taint_key: daemon.taint_key(config.taint_prefix()),
//!     applicable: true,
//!     ready: false,
//! }];
//! let (desired, changes) = calculate_taints(&Node::default(), config.taint_prefix(), &checks);
//! assert_eq!(changes.added, vec!["nidhogg.uswitch.com/kube-system.kiam"]);
//! # let _ = desired;
//! ```

pub mod config;
pub mod constants;
pub mod crd;
pub mod errors;
pub mod http;
pub mod metrics;
pub mod reconciler;
pub mod resolver;
pub mod selector;
pub mod taints;
pub mod workloads;
