//! Overlay-network membership.
//!
//! [`MembershipSource`] answers "which machines are on the overlay network
//! right now". It never fails loudly: if the overlay client is missing or not
//! running the answer is simply empty.

use crate::command::Program;
use async_trait::async_trait;
use scratch_sync_types::Peer;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Source of overlay-network peers.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// Every known peer, online or not.
    async fn list_all_peers(&self) -> Vec<Peer>;

    /// Peers currently online.
    async fn list_online_peers(&self) -> Vec<Peer> {
        self.list_all_peers()
            .await
            .into_iter()
            .filter(|p| p.online)
            .collect()
    }

    /// This machine's overlay hostname.
    async fn self_hostname(&self) -> Option<String>;

    /// Whether the overlay client is up.
    async fn is_running(&self) -> bool;
}

#[derive(Debug, Default, Deserialize)]
struct StatusJson {
    #[serde(rename = "Self", default)]
    self_node: Option<NodeJson>,
    #[serde(rename = "Peer", default)]
    peers: BTreeMap<String, NodeJson>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeJson {
    #[serde(rename = "HostName")]
    host_name: Option<String>,
    #[serde(rename = "TailscaleIPs")]
    ips: Vec<String>,
    #[serde(rename = "OS")]
    os: Option<String>,
    #[serde(rename = "Online")]
    online: bool,
    #[serde(rename = "ID")]
    id: Option<serde_json::Value>,
}

fn numeric_id(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Parse `tailscale status --json` output into peers.
///
/// Peers without an overlay IP are dropped.
pub fn parse_status(json: &str) -> Result<Vec<Peer>, serde_json::Error> {
    let status: StatusJson = serde_json::from_str(json)?;
    Ok(status
        .peers
        .into_values()
        .filter_map(|node| {
            let overlay_ip = node.ips.first()?.clone();
            Some(Peer {
                hostname: non_empty(node.host_name).unwrap_or_else(|| "unknown".to_string()),
                overlay_ip,
                os: non_empty(node.os).unwrap_or_else(|| "unknown".to_string()),
                online: node.online,
                node_id: node.id.as_ref().and_then(numeric_id),
            })
        })
        .collect())
}

/// Parse the local hostname out of `tailscale status --json` output.
pub fn parse_self_hostname(json: &str) -> Option<String> {
    let status: StatusJson = serde_json::from_str(json).ok()?;
    status.self_node.and_then(|n| non_empty(n.host_name))
}

/// Membership from the Tailscale CLI.
#[derive(Debug, Clone)]
pub struct TailscaleCli {
    program: Program,
}

impl TailscaleCli {
    /// Use the given `tailscale` binary.
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    async fn status_json(&self) -> Option<String> {
        match self.program.exec_ok(&["status", "--json"]).await {
            Ok(out) => Some(out.stdout),
            Err(e) => {
                tracing::debug!("tailscale status failed: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl MembershipSource for TailscaleCli {
    async fn list_all_peers(&self) -> Vec<Peer> {
        let Some(json) = self.status_json().await else {
            return Vec::new();
        };
        match parse_status(&json) {
            Ok(peers) => peers,
            Err(e) => {
                tracing::warn!("could not parse tailscale status: {}", e);
                Vec::new()
            }
        }
    }

    async fn self_hostname(&self) -> Option<String> {
        parse_self_hostname(&self.status_json().await?)
    }

    async fn is_running(&self) -> bool {
        matches!(self.program.exec(&["status"]).await, Ok(out) if out.success())
    }
}

/// Fixed membership for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticMembership {
    inner: Arc<Mutex<StaticInner>>,
}

#[derive(Debug, Default)]
struct StaticInner {
    peers: Vec<Peer>,
    hostname: Option<String>,
    stopped: bool,
}

impl StaticMembership {
    /// A running overlay with these peers.
    pub fn new(peers: Vec<Peer>) -> Self {
        let membership = Self::default();
        membership.inner.lock().unwrap().peers = peers;
        membership
    }

    /// Set the local hostname.
    pub fn with_hostname(self, hostname: &str) -> Self {
        self.inner.lock().unwrap().hostname = Some(hostname.to_string());
        self
    }

    /// Simulate the overlay client being down.
    pub fn stop(&self) {
        self.inner.lock().unwrap().stopped = true;
    }
}

#[async_trait]
impl MembershipSource for StaticMembership {
    async fn list_all_peers(&self) -> Vec<Peer> {
        let inner = self.inner.lock().unwrap();
        if inner.stopped {
            return Vec::new();
        }
        inner.peers.clone()
    }

    async fn self_hostname(&self) -> Option<String> {
        self.inner.lock().unwrap().hostname.clone()
    }

    async fn is_running(&self) -> bool {
        !self.inner.lock().unwrap().stopped
    }
}
