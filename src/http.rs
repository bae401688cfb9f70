// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

//! Metrics and health HTTP endpoints.
//!
//! Serves `/metrics` (Prometheus text format) and `/healthz` on the address
//! given by `--metrics-addr`. The server runs beside the controller and
//! shares its lifetime.

use crate::constants::{HEALTH_SERVER_PATH, METRICS_SERVER_PATH};
use crate::metrics::gather_metrics;
use anyhow::{Context as _, Result};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tracing::info;

/// Build the router exposing metrics and health endpoints.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route(METRICS_SERVER_PATH, get(serve_metrics))
        .route(HEALTH_SERVER_PATH, get(|| async { "ok" }))
}

/// Run the HTTP server until the process shuts down.
///
/// # Errors
///
/// Returns an error if the listen address cannot be bound.
pub async fn run_metrics_server(addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("unable to bind metrics server to {addr}"))?;
    info!(%addr, "metrics server listening");
    axum::serve(listener, router())
        .await
        .context("metrics server exited")
}

async fn serve_metrics() -> Result<String, StatusCode> {
    gather_metrics().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
