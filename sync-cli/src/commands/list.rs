//! List managed folders.

use anyhow::{Context, Result};
use scratch_sync_client::DaemonConfig;
use scratch_sync_core::is_managed;

use crate::config::Config;

/// Managed folder ids, in daemon order.
pub async fn managed_folders<D: DaemonConfig>(daemon: &D, prefix: &str) -> Result<Vec<String>> {
    let folders = daemon
        .list_folders()
        .await
        .context("Failed to list Syncthing folders")?;
    Ok(folders.into_iter().filter(|f| is_managed(f, prefix)).collect())
}

/// Run the list command.
pub async fn run(config: &Config) -> Result<()> {
    let daemon = super::syncthing(config)?;
    let folders = managed_folders(&daemon, &config.folders.prefix).await?;

    if folders.is_empty() {
        println!("No scratch-sync folders configured");
        return Ok(());
    }

    println!("Scratch folders:");
    for folder_id in folders {
        println!("  - {}", folder_id);
    }
    Ok(())
}
