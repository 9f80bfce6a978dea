//! Overlay-network peers and the identity a probe extracts from them.

use serde::{Deserialize, Serialize};

/// A machine visible on the overlay network.
///
/// Produced fresh on every membership query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Overlay hostname.
    pub hostname: String,
    /// First overlay IP address.
    pub overlay_ip: String,
    /// Operating system as reported by the overlay client.
    pub os: String,
    /// Whether the overlay client currently sees the peer online.
    pub online: bool,
    /// Opaque numeric node identifier, if the overlay client reports one.
    pub node_id: Option<u64>,
}

impl Peer {
    /// Create an online peer with unknown OS and no node id.
    pub fn online(hostname: &str, overlay_ip: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            overlay_ip: overlay_ip.to_string(),
            os: "unknown".to_string(),
            online: true,
            node_id: None,
        }
    }
}

/// The durable identity of a remote sync daemon, learned from a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentity {
    /// Hostname to use as the device's display name.
    pub hostname: Option<String>,
    /// Overlay IP the daemon was reached on.
    pub overlay_ip: String,
    /// Device identity assigned by the remote daemon (opaque, case-preserved).
    pub device_id: String,
    /// Remote daemon version, or `"unknown"`.
    pub version: String,
    /// Port the remote daemon accepts sync connections on.
    pub data_port: u16,
}

impl PeerIdentity {
    /// Address the local daemon should dial, e.g. `tcp://100.64.0.7:22000`.
    pub fn tcp_address(&self) -> String {
        format!("tcp://{}:{}", self.overlay_ip, self.data_port)
    }

    /// Abbreviated device id for display (first 7 characters, like the daemon's GUI).
    pub fn short_id(&self) -> &str {
        let end = self
            .device_id
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.device_id.len());
        &self.device_id[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> PeerIdentity {
        PeerIdentity {
            hostname: Some("laptop".into()),
            overlay_ip: "100.101.102.103".into(),
            device_id: "MFZWI3D-BONSGYC-YLTMRWG-C43ENR5-QXGZDMM-FZWI3DP-BONSGYY-LTMRWAD".into(),
            version: "v1.27.0".into(),
            data_port: 22000,
        }
    }

    #[test]
    fn tcp_address_uses_overlay_ip_and_data_port() {
        assert_eq!(identity().tcp_address(), "tcp://100.101.102.103:22000");
    }

    #[test]
    fn short_id_truncates() {
        assert_eq!(identity().short_id(), "MFZWI3D");

        let mut tiny = identity();
        tiny.device_id = "ABC".into();
        assert_eq!(tiny.short_id(), "ABC");
    }

    #[test]
    fn online_peer_defaults() {
        let peer = Peer::online("desk", "100.64.0.2");
        assert!(peer.online);
        assert_eq!(peer.os, "unknown");
        assert!(peer.node_id.is_none());
    }
}
