//! Typed views of the daemon's REST responses.
//!
//! Only the fields scratch-sync reads are modelled. Everything defaults when
//! absent so a field renamed or dropped by a newer daemon degrades to an
//! empty value instead of failing the whole response.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// `GET /rest/system/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    /// Local device id.
    #[serde(rename = "myID")]
    pub my_id: String,
    /// Seconds since the daemon started.
    pub uptime: u64,
}

/// One entry of `GET /rest/config/devices`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviceEntry {
    /// Device id.
    #[serde(rename = "deviceID")]
    pub device_id: String,
    /// Display name.
    pub name: String,
    /// Configured addresses (`dynamic` or `tcp://...`).
    pub addresses: Vec<String>,
    /// Whether the device is paused.
    pub paused: bool,
}

/// A device reference inside a folder entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FolderDevice {
    /// Device id.
    #[serde(rename = "deviceID")]
    pub device_id: String,
}

/// One entry of `GET /rest/config/folders`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FolderEntry {
    /// Folder id.
    pub id: String,
    /// Folder label.
    pub label: String,
    /// Local path.
    pub path: String,
    /// Devices the folder is shared with.
    pub devices: Vec<FolderDevice>,
    /// Whether the folder is paused.
    pub paused: bool,
}

/// One connection in `GET /rest/system/connections`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionEntry {
    /// Whether connected.
    pub connected: bool,
    /// Whether paused.
    pub paused: bool,
    /// Remote address of the live connection.
    pub address: String,
    /// Bytes received.
    pub in_bytes_total: u64,
    /// Bytes sent.
    pub out_bytes_total: u64,
}

/// `GET /rest/system/connections`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Connections {
    /// Per-device connections.
    pub connections: HashMap<String, ConnectionEntry>,
}

/// One entry of `GET /rest/stats/device`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceStats {
    /// Last time the device was seen; the Unix epoch means never.
    pub last_seen: Option<DateTime<Utc>>,
}

/// One entry of `GET /rest/cluster/pending/devices`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PendingDevice {
    /// Name the remote device asked to be known by.
    pub name: String,
    /// Address the request came from.
    pub address: String,
}

/// `GET /rest/db/status?folder=<id>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FolderStatus {
    /// Daemon state string (`idle`, `scanning`, `syncing`, ...).
    pub state: String,
}
