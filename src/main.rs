// Copyright (c) 2025 nodegate contributors
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use kube::Client;
use nodegate::config::Config;
use nodegate::constants::{DEFAULT_CONFIG_PATH, METRICS_SERVER_DEFAULT_ADDR, TOKIO_WORKER_THREADS};
use nodegate::http::run_metrics_server;
use nodegate::reconciler::{run_node_controller, Context};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Kubernetes controller that taints nodes until required daemonset pods are ready.
#[derive(Parser, Debug)]
#[command(name = "nodegate", version, about)]
struct Args {
    /// Path to the config file (YAML or JSON)
    #[arg(long = "config-file", default_value = DEFAULT_CONFIG_PATH)]
    config_file: String,

    /// Address the metrics endpoint binds to
    #[arg(long = "metrics-addr", default_value = METRICS_SERVER_DEFAULT_ADDR)]
    metrics_addr: String,
}

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("nodegate-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Respects RUST_LOG for the filter and RUST_LOG_FORMAT for text/json output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let args = Args::parse();

    info!("Starting nodegate node readiness controller");

    let config = Config::load(&args.config_file).map_err(|err| {
        error!(config_file = %args.config_file, error = %err, "unable to load config");
        anyhow::anyhow!(err)
    })?;

    match &config.node_selector {
        Some(expressions) => info!(
            selector = %expressions.join(","),
            "looking for nodes that match the configured node selector"
        ),
        None => info!("looking for nodes that match each daemonset's own selector"),
    }
    info!(
        taint_prefix = %config.taint_prefix(),
        daemons = config.daemonsets.len(),
        removal_delay_seconds = config.taint_removal_delay_in_seconds,
        "configuration loaded"
    );

    debug!("initializing Kubernetes client");
    let client = Client::try_default().await?;

    let metrics_addr = args.metrics_addr.clone();
    let ctx = Arc::new(Context::new(client, config)?);

    // The controller shuts down on SIGTERM/SIGINT; the metrics server shares
    // the process lifetime. Either future ending takes the process down.
    tokio::select! {
        result = run_node_controller(ctx) => {
            error!("node controller exited: {:?}", result);
            result?;
            Ok(())
        }
        result = run_metrics_server(&metrics_addr) => {
            error!("metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
    }
}
