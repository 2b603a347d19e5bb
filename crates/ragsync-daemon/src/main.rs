//! ragsync daemon - mirrors a bucket prefix into a remote indexing service
//!
//! Loads configuration from the environment (and an optional YAML file
//! named by `RAGSYNC_CONFIG`), runs one sync pass immediately and then
//! one per interval, and serves the HTTP control surface until SIGTERM
//! or SIGINT.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ragsync_core::config::Config;
use ragsync_daemon::app;
use ragsync_daemon::server::ControlServer;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Waits for SIGINT or SIGTERM, then cancels `token`
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let problems = config.validate();
    if !problems.is_empty() {
        let joined = problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        anyhow::bail!("Invalid configuration: {joined}");
    }

    app::init_logging(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "ragsync daemon starting (ragsyncd)");

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let app = app::build(&config).await?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
    let server = ControlServer::bind(
        addr,
        Arc::clone(&app.control),
        Duration::from_secs(config.server.shutdown_grace_secs),
    )
    .await
    .with_context(|| format!("Failed to bind control surface on {addr}"))?;

    let scheduler = tokio::spawn(Arc::clone(&app.scheduler).run(shutdown.clone()));

    let result = server.run(shutdown.clone()).await;

    // The server only returns early on error; stop the scheduler too
    shutdown.cancel();
    if let Err(e) = scheduler.await {
        warn!(error = %e, "Scheduler task ended abnormally");
    }

    match &result {
        Ok(()) => info!("ragsync daemon shut down gracefully"),
        Err(e) => error!(error = %e, "ragsync daemon exiting with error"),
    }

    result
}
