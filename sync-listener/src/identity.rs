//! The identity this machine advertises on `/info`.

use crate::error::Result;
use async_trait::async_trait;
use scratch_sync_client::{DaemonConfig, MembershipSource};
use scratch_sync_types::DATA_PORT;
use serde::{Deserialize, Serialize};

/// Body of `GET /info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Hostname on the overlay.
    pub hostname: String,
    /// Local daemon device id.
    pub syncthing_device_id: String,
    /// Daemon data port.
    pub syncthing_port: u16,
    /// scratch-sync version.
    pub version: String,
}

/// Something that can describe this machine.
#[async_trait]
pub trait IdentitySource: Send + Sync + 'static {
    /// Look up the identity. Called once per request.
    async fn node_info(&self) -> Result<NodeInfo>;
}

/// Identity from the local daemon, named by the overlay.
///
/// The hostname falls back to the system hostname when there is no overlay
/// or it does not report one.
#[derive(Debug, Clone)]
pub struct DaemonIdentity<D, M> {
    daemon: D,
    membership: Option<M>,
}

impl<D: DaemonConfig, M: MembershipSource> DaemonIdentity<D, M> {
    /// Combine a daemon and an optional overlay membership source.
    pub fn new(daemon: D, membership: Option<M>) -> Self {
        Self { daemon, membership }
    }
}

fn system_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[async_trait]
impl<D, M> IdentitySource for DaemonIdentity<D, M>
where
    D: DaemonConfig + 'static,
    M: MembershipSource + 'static,
{
    async fn node_info(&self) -> Result<NodeInfo> {
        let device_id = self.daemon.local_device_id().await?;
        let overlay_name = match &self.membership {
            Some(membership) => membership.self_hostname().await,
            None => None,
        };
        let hostname = overlay_name.unwrap_or_else(system_hostname);
        Ok(NodeInfo {
            hostname,
            syncthing_device_id: device_id,
            syncthing_port: DATA_PORT,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
