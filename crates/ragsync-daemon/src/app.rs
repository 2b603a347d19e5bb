//! Daemon wiring
//!
//! Turns a validated [`Config`] into the running pieces: adapters, the
//! shared processed set, the sync engine, the scheduler and the state
//! served by the control surface.

use std::sync::Arc;

use anyhow::{Context, Result};
use ragsync_core::config::{Config, LoggingConfig};
use ragsync_index::IndexServiceProvider;
use ragsync_s3::S3ObjectStore;
use ragsync_sync::engine::SyncEngine;
use ragsync_sync::policy::SizePolicy;
use ragsync_sync::scheduler::SyncScheduler;
use ragsync_sync::state::ProcessedSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::server::{ControlState, ServiceInfo};

/// Installs the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    let installed = if config.format == "pretty" {
        builder.try_init()
    } else {
        builder.json().try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

/// Everything the binary needs to run
pub struct App {
    pub scheduler: Arc<SyncScheduler>,
    pub control: Arc<ControlState>,
}

/// Builds adapters, engine and scheduler from configuration
///
/// The bucket probe only warns; the first pass reports real failures.
pub async fn build(config: &Config) -> Result<App> {
    let store_config = &config.object_store;

    info!(
        bucket = %store_config.bucket,
        prefix = %store_config.prefix,
        region = %store_config.region,
        endpoint = store_config.endpoint_url.as_deref().unwrap_or("aws"),
        access_key_id = store_config.masked_access_key_id().as_deref().unwrap_or("none"),
        "Configuring object store"
    );

    let store = S3ObjectStore::new(store_config, config.request_timeout())
        .context("Failed to create object store client")?;
    info!(signed = store.is_signed(), "Object store client ready");

    match store.head_bucket().await {
        Ok(()) => info!(bucket = %store_config.bucket, "Bucket is reachable"),
        Err(e) => warn!(
            bucket = %store_config.bucket,
            error = %e,
            "Bucket probe failed, continuing"
        ),
    }

    let index = IndexServiceProvider::from_config(&config.index)
        .context("Failed to create indexing service client")?;
    info!(
        api_url = %config.index.api_url,
        rag_id = %index.rag_id(),
        "Configured indexing service"
    );

    if config.sync.interval_secs.is_none() {
        warn!(
            interval_secs = config.sync_interval().as_secs_f64(),
            "Sync interval not set, using default"
        );
    }

    let policy = SizePolicy::from_megabytes(config.sync.max_file_size_mb);
    let state = Arc::new(ProcessedSet::new());
    let engine = Arc::new(SyncEngine::new(
        Arc::new(store),
        Arc::new(index),
        state,
        policy,
        &store_config.prefix,
    ));
    let scheduler = Arc::new(SyncScheduler::new(engine, config.sync_interval()));

    let info = ServiceInfo {
        bucket: store_config.bucket.clone(),
        prefix: store_config.prefix.clone(),
        index_api: config.index.api_url.clone(),
        interval: config.sync_interval(),
        max_file_size_mb: config.sync.max_file_size_mb,
    };
    let control = Arc::new(ControlState::new(Arc::clone(&scheduler), info));

    Ok(App { scheduler, control })
}
