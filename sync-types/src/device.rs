//! View of a remote device as the local sync daemon sees it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection state of a device, keeping "don't know" apart from "disconnected".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    /// The daemon reports an active connection.
    Connected,
    /// The daemon reports no connection.
    Disconnected,
    /// Connection data was unavailable.
    Unknown,
}

/// A device configured in the local sync daemon, merged with its runtime state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedDevice {
    /// Daemon-assigned device identity.
    pub device_id: String,
    /// Configured display name.
    pub display_name: Option<String>,
    /// Live connection address, or the first configured address.
    pub address: Option<String>,
    /// Whether the device is connected. `false` when connection data is missing.
    pub connected: bool,
    /// Whether the device is paused.
    pub paused: bool,
    /// Last time the daemon saw the device.
    pub last_seen: Option<DateTime<Utc>>,
    /// Total bytes received from the device.
    pub bytes_in: u64,
    /// Total bytes sent to the device.
    pub bytes_out: u64,
    /// Whether `connected` is confirmed or defaulted.
    pub link: LinkState,
}

impl ManagedDevice {
    /// A device known only from configuration.
    pub fn configured(device_id: &str, display_name: Option<String>) -> Self {
        Self {
            device_id: device_id.to_string(),
            display_name,
            address: None,
            connected: false,
            paused: false,
            last_seen: None,
            bytes_in: 0,
            bytes_out: 0,
            link: LinkState::Unknown,
        }
    }

    /// Display name, falling back to the device id.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.device_id,
        }
    }
}
