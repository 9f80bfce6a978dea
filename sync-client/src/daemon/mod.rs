//! The local sync daemon's control surfaces.
//!
//! Two seams:
//! - [`DaemonConfig`] mutates and lists configuration (devices, folders,
//!   folder share lists). Backed by the daemon's CLI.
//! - [`ControlSurface`] reads runtime views for status reporting. Backed by
//!   the daemon's REST API.
//!
//! The daemon serializes its own configuration writes; nothing here adds
//! locking on top.

pub mod api;
mod cli;
mod mock;
mod rest;

pub use cli::SyncthingCli;
pub use mock::MockDaemon;
pub use rest::{RestControl, DEFAULT_API_URL};

use crate::error::Result;
use api::{
    Connections, DeviceEntry, DeviceStats, FolderEntry, FolderStatus, PendingDevice, SystemStatus,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Configuration operations on the local daemon.
#[async_trait]
pub trait DaemonConfig: Send + Sync {
    /// The local device id.
    async fn local_device_id(&self) -> Result<String>;

    /// Ids of every configured device (including the local one).
    async fn list_devices(&self) -> Result<Vec<String>>;

    /// Add a device, optionally naming it.
    async fn add_device(&self, device_id: &str, name: Option<&str>) -> Result<()>;

    /// Replace a device's address list with a single address.
    async fn set_device_address(&self, device_id: &str, address: &str) -> Result<()>;

    /// Ids of every configured folder.
    async fn list_folders(&self) -> Result<Vec<String>>;

    /// Ids of the devices a folder is shared with, in daemon order.
    async fn folder_devices(&self, folder_id: &str) -> Result<Vec<String>>;

    /// Share a folder with a device.
    async fn add_device_to_folder(&self, folder_id: &str, device_id: &str) -> Result<()>;

    /// Register a send-receive folder.
    async fn add_folder(&self, folder_id: &str, path: &Path) -> Result<()>;
}

/// Read-only runtime views of the local daemon.
#[async_trait]
pub trait ControlSurface: Send + Sync {
    /// System status (local id, uptime).
    async fn system_status(&self) -> Result<SystemStatus>;

    /// Configured devices.
    async fn device_configs(&self) -> Result<Vec<DeviceEntry>>;

    /// Configured folders.
    async fn folder_configs(&self) -> Result<Vec<FolderEntry>>;

    /// Live connections.
    async fn connections(&self) -> Result<Connections>;

    /// Historical per-device statistics.
    async fn device_stats(&self) -> Result<HashMap<String, DeviceStats>>;

    /// Devices asking to pair that are not yet configured.
    async fn pending_devices(&self) -> Result<HashMap<String, PendingDevice>>;

    /// State of one folder.
    async fn folder_status(&self, folder_id: &str) -> Result<FolderStatus>;
}
