//! Application surface for locsync.
//!
//! Wires a loaded [`SyncConfig`] into the core components and sets up
//! logging. The `locsync` binary is a thin clap front-end over this crate.

pub mod logging;

/// Re-export for convenience.
pub use locsync_config as config;
/// Re-export for convenience.
pub use locsync_core as core;

use anyhow::Context;
use locsync_config::SyncConfig;
use locsync_core::{
    FlushReport, InfobloxClient, ServiceNowClient, SyncReport, Synchronizer, flush_attribute,
};
use std::sync::Arc;

/// Run one ServiceNow -> Infoblox synchronization.
pub async fn run_sync(config: &SyncConfig) -> anyhow::Result<SyncReport> {
    let source = ServiceNowClient::from_config(config)
        .context("ServiceNow settings are missing from the config")?
        .context("failed to set up the ServiceNow client")?;
    let store =
        InfobloxClient::from_config(config).context("failed to set up the Infoblox client")?;
    Synchronizer::new(
        Arc::new(source),
        Arc::new(store),
        config.infoblox.attribute_name.clone(),
    )
    .run()
    .await
    .context("synchronization failed")
}

/// Reset the configured attribute to the sentinel placeholder.
pub async fn run_flush(config: &SyncConfig) -> anyhow::Result<FlushReport> {
    let store =
        InfobloxClient::from_config(config).context("failed to set up the Infoblox client")?;
    flush_attribute(Arc::new(store), &config.infoblox.attribute_name)
        .await
        .context("flush failed")
}
