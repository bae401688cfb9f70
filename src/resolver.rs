// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Per-daemon node selector resolution with caching.
//!
//! Which nodes a daemon is expected on is decided by exactly one of:
//!
//! - the global `nodeSelector` from the config file, shared by every daemon
//!   and parsed once at startup, or
//! - the daemon's own pod template selector, fetched lazily on first use and
//!   cached for the process lifetime.
//!
//! The cache tolerates transient fetch failures by falling back to the last
//! known selector. A daemon whose selector has never been fetched
//! successfully is treated as applicable to no node for that pass, so the
//! controller fails open toward "do not taint".

use crate::config::Daemon;
use crate::selector::Selector;
use crate::workloads::DaemonWorkload;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Resolves and caches the selector binding for each configured daemon.
pub struct SelectorResolver {
    global: Option<Selector>,
    cache: HashMap<Daemon, Selector>,
}

impl SelectorResolver {
    /// Create a resolver. `global` comes from
    /// [`crate::config::Config::build_global_selector`]; `Some` disables
    /// per-daemon fetching entirely.
    #[must_use]
    pub fn new(global: Option<Selector>) -> Self {
        SelectorResolver {
            global,
            cache: HashMap::new(),
        }
    }

    /// True when a global selector overrides per-daemon resolution.
    #[must_use]
    pub fn has_global(&self) -> bool {
        self.global.is_some()
    }

    /// The configured global selector, if any.
    #[must_use]
    pub fn global(&self) -> Option<&Selector> {
        self.global.as_ref()
    }

    /// Selector that determines whether `daemon` is expected on a node.
    ///
    /// Returns `None` when the selector cannot be determined this pass (no
    /// global override, fetch failed, nothing cached) - the daemon is then
    /// inapplicable to every node until a fetch succeeds.
    pub async fn selector_for(
        &mut self,
        daemon: &Daemon,
        workload: &dyn DaemonWorkload,
    ) -> Option<Selector> {
        if let Some(global) = &self.global {
            return Some(global.clone());
        }

        match workload.node_selector().await {
            Ok(selector) => {
                // Fresh value wins; keep it for passes where the fetch fails
                self.cache.insert(daemon.clone(), selector.clone());
                Some(selector)
            }
            Err(err) => match self.cache.get(daemon) {
                Some(cached) => {
                    debug!(daemon = %daemon, error = %err, "selector fetch failed, using cached selector");
                    Some(cached.clone())
                }
                None => {
                    warn!(daemon = %daemon, error = %err, "selector unavailable and nothing cached, treating daemon as inapplicable");
                    None
                }
            },
        }
    }

    /// Number of cached per-daemon selectors.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
