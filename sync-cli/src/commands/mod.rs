//! CLI command implementations.

pub mod init;
pub mod list;
pub mod pair;
pub mod serve;
pub mod status;

use crate::config::{Config, API_KEY_ENV};
use anyhow::{Context, Result};
use scratch_sync_client::{RestControl, SyncthingCli};

/// The daemon's CLI, or a missing-prerequisite error.
pub fn syncthing(config: &Config) -> Result<SyncthingCli> {
    let program = config.prerequisites().syncthing()?;
    Ok(SyncthingCli::new(program))
}

/// The daemon's REST API key: config, then environment, then the daemon.
pub async fn api_key(config: &Config, daemon: &SyncthingCli) -> Result<String> {
    if let Some(key) = config.daemon.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            return Ok(key);
        }
    }
    daemon
        .api_key()
        .await
        .context("Could not read the Syncthing API key")
}

/// A REST client for the local daemon.
pub async fn rest_control(config: &Config, daemon: &SyncthingCli) -> Result<RestControl> {
    let key = api_key(config, daemon).await?;
    Ok(RestControl::new(&config.daemon.api_url, &key, config.command_timeout())?)
}
