// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Node reconciliation driver.
//!
//! One pass per node: fetch the node, gather applicability and readiness for
//! every configured daemon, run the pure core in [`crate::taints`], persist
//! the result and emit metrics plus a `TaintsChanged` event. Passes are
//! triggered by node creation and by changes to daemonset-owned pods, and
//! the controller's work queue collapses duplicate triggers per node name.
//!
//! Concurrency is deliberately one pass in flight across the whole node
//! population: the pass holds the selector-resolver lock for its full
//! duration, which also makes the selector cache safe to mutate without
//! further guarding.

use crate::config::Config;
use crate::constants::{
    CONTROLLER_NAME, DAEMONSET_OWNER_KIND, ERROR_REQUEUE_DURATION_SECS, EVENT_ACTION_RECONCILE,
    EVENT_REASON_TAINTS_CHANGED, PHASE_CALCULATE_TAINTS, PHASE_NODE_UPDATE, TAINT_OPERATION_ADDED,
    TAINT_OPERATION_REMOVED,
};
use crate::errors::Error;
use crate::metrics::{record_taint_operation, record_taint_operation_error};
use crate::resolver::SelectorResolver;
use crate::taints::{calculate_taints, ensure_ready_since, is_taint_less, DaemonCheck};
use crate::workloads::{pod_ready, workload_for};
use anyhow::Result;
use chrono::Utc;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{Event, EventSource, Node, ObjectReference, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::api::PostParams;
use kube::runtime::controller::Action;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client, Resource, ResourceExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Shared state for the node controller.
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,
    /// Immutable controller configuration
    pub config: Config,
    /// Selector resolver guarded by the pass lock; holding it serializes
    /// reconciliation passes globally
    resolver: Mutex<SelectorResolver>,
}

impl Context {
    /// Build the controller context, parsing the global node selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a configured selector expression does
    /// not parse.
    pub fn new(client: Client, config: Config) -> Result<Self, Error> {
        let global = config.build_global_selector()?;
        Ok(Context {
            client,
            config,
            resolver: Mutex::new(SelectorResolver::new(global)),
        })
    }
}

/// Run the node controller until shutdown.
///
/// Watches nodes directly and maps daemonset-owned pod events to the pod's
/// assigned node, so a daemon pod becoming ready re-queues exactly the node
/// it runs on.
///
/// # Errors
///
/// Returns an error only if the controller stream terminates abnormally.
pub async fn run_node_controller(ctx: Arc<Context>) -> Result<()> {
    info!("starting node controller");

    let nodes = Api::<Node>::all(ctx.client.clone());
    let pods = Api::<Pod>::all(ctx.client.clone());

    Controller::new(nodes, WatcherConfig::default())
        .watches(pods, WatcherConfig::default(), node_for_daemon_pod)
        .shutdown_on_signal()
        .run(reconcile_node, error_policy, ctx)
        .for_each(|result| {
            if let Err(err) = result {
                debug!(error = ?err, "reconciliation attempt failed");
            }
            futures::future::ready(())
        })
        .await;

    Ok(())
}

/// Map a pod event to the node that must be re-reconciled.
///
/// Only pods that are assigned to a node and controller-owned by a
/// `DaemonSet` produce a trigger; everything else is ignored.
fn node_for_daemon_pod(pod: Pod) -> Option<ObjectRef<Node>> {
    let node_name = pod.spec.as_ref()?.node_name.as_deref()?;
    if node_name.is_empty() {
        return None;
    }
    let controller = pod
        .metadata
        .owner_references
        .as_ref()?
        .iter()
        .find(|owner| owner.controller == Some(true))?;
    (controller.kind == DAEMONSET_OWNER_KIND).then(|| ObjectRef::new(node_name))
}

/// Requeue failed passes after a fixed backoff.
fn error_policy(node: Arc<Node>, err: &Error, _ctx: Arc<Context>) -> Action {
    error!(
        node = %node.name_any(),
        error = %err,
        "reconciliation failed, will retry in {ERROR_REQUEUE_DURATION_SECS}s"
    );
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// One reconciliation pass for a node.
///
/// Fail-closed: any readiness lookup failure aborts before the node is
/// touched, and a failed update leaves the node unchanged for the next
/// retry. The node write is a full replacement, so a concurrent modification
/// is rejected by the API server's resource-version check and retried.
async fn reconcile_node(node: Arc<Node>, ctx: Arc<Context>) -> Result<Action, Error> {
    let name = node.name_any();

    // Taking the resolver lock serializes passes across all nodes
    let mut resolver = ctx.resolver.lock().await;

    let api: Api<Node> = Api::all(ctx.client.clone());
    let latest = match api.get(&name).await {
        Ok(node) => node,
        Err(kube::Error::Api(resp)) if resp.code == 404 => {
            // Node deleted since the trigger fired, nothing to do
            return Ok(Action::await_change());
        }
        Err(err) => return Err(Error::lookup(format!("node {name}"), err)),
    };

    let labels = latest.metadata.labels.clone().unwrap_or_default();
    if let Some(global) = resolver.global() {
        if !global.matches(&labels) {
            debug!(node = %name, "node does not match the configured node selector, skipping");
            return Ok(Action::await_change());
        }
    }

    let prefix = ctx.config.taint_prefix();
    let mut checks = Vec::with_capacity(ctx.config.daemonsets.len());
    for daemon in &ctx.config.daemonsets {
        let taint_key = daemon.taint_key(prefix);
        let workload = workload_for(ctx.client.clone(), daemon);

        let applicable = resolver
            .selector_for(daemon, workload.as_ref())
            .await
            .is_some_and(|selector| selector.matches(&labels));
        if !applicable {
            checks.push(DaemonCheck {
                taint_key,
                applicable: false,
                ready: false,
            });
            continue;
        }

        let pods = workload
            .pods_on_node(&name)
            .await
            .inspect_err(|_| record_taint_operation_error(PHASE_CALCULATE_TAINTS))?;
        let ready = !pods.is_empty() && pods.iter().all(pod_ready);
        debug!(node = %name, daemon = %daemon, pods = pods.len(), ready, "daemon readiness");

        checks.push(DaemonCheck {
            taint_key,
            applicable: true,
            ready,
        });
    }

    let (mut desired, changes) = calculate_taints(&latest, prefix, &checks);
    let taint_less = is_taint_less(&desired, prefix);
    let ready_since = ensure_ready_since(&mut desired, prefix, Utc::now());

    if desired == latest {
        return Ok(Action::await_change());
    }

    if !changes.removed.is_empty() {
        apply_taint_removal_delay(ctx.config.taint_removal_delay_in_seconds).await;
    }

    info!(
        node = %name,
        added = ?changes.added,
        removed = ?changes.removed,
        taint_less,
        ready_since = ?ready_since,
        "updating node taints"
    );

    api.replace(&name, &PostParams::default(), &desired)
        .await
        .map_err(|err| {
            record_taint_operation_error(PHASE_NODE_UPDATE);
            Error::Persist {
                node: name.clone(),
                source: err,
            }
        })?;

    for key in &changes.added {
        record_taint_operation(TAINT_OPERATION_ADDED, key);
    }
    for key in &changes.removed {
        record_taint_operation(TAINT_OPERATION_REMOVED, key);
    }

    let message = format!(
        "Taints added: {:?}, Taints removed: {:?}, TaintLess: {}, FirstTimeReady: {:?}",
        changes.added, changes.removed, taint_less, ready_since
    );
    if let Err(err) = publish_taints_changed_event(&ctx.client, &latest, &message).await {
        // The taint update already landed; a lost event is not worth a retry
        warn!(node = %name, error = %err, "failed to publish TaintsChanged event");
    }

    Ok(Action::await_change())
}

/// Emit a `TaintsChanged` event against the node. Nodes are cluster-scoped,
/// so the event itself lands in the `default` namespace.
async fn publish_taints_changed_event(
    client: &Client,
    node: &Node,
    message: &str,
) -> Result<(), kube::Error> {
    let name = node.name_any();
    let now = Time(k8s_openapi::jiff::Timestamp::now());
    let event = Event {
        metadata: ObjectMeta {
            generate_name: Some(format!("{name}-")),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        involved_object: ObjectReference {
            api_version: Some(Node::api_version(&()).to_string()),
            kind: Some(Node::kind(&()).to_string()),
            name: Some(name),
            uid: node.meta().uid.clone(),
            ..Default::default()
        },
        reason: Some(EVENT_REASON_TAINTS_CHANGED.to_string()),
        message: Some(message.to_string()),
        type_: Some("Normal".to_string()),
        action: Some(EVENT_ACTION_RECONCILE.to_string()),
        source: Some(EventSource {
            component: Some(CONTROLLER_NAME.to_string()),
            ..Default::default()
        }),
        first_timestamp: Some(now.clone()),
        last_timestamp: Some(now),
        count: Some(1),
        ..Default::default()
    };

    let events: Api<Event> = Api::namespaced(client.clone(), "default");
    events.create(&PostParams::default(), &event).await?;
    Ok(())
}

/// Wait out the configured removal delay before stripping taints, damping
/// flaps when a daemon pod is briefly ready then unready. The sleep is
/// cancellable with the pass, so shutdown is never stalled.
async fn apply_taint_removal_delay(delay_seconds: u64) {
    if delay_seconds == 0 {
        return;
    }
    info!(
        delay_seconds,
        "daemon is ready, waiting before removing taint"
    );
    tokio::time::sleep(Duration::from_secs(delay_seconds)).await;
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
