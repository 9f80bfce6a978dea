//! In-memory daemon for testing.
//!
//! Implements both [`DaemonConfig`] and [`ControlSurface`] over one shared
//! state, with switches to fail writes or take REST sources offline.

use super::api::{
    ConnectionEntry, Connections, DeviceEntry, DeviceStats, FolderDevice, FolderEntry,
    FolderStatus, PendingDevice, SystemStatus,
};
use super::{ControlSurface, DaemonConfig};
use crate::error::{ClientError, Result};
use crate::status::Source;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// In-memory daemon.
#[derive(Debug, Clone, Default)]
pub struct MockDaemon {
    inner: Arc<Mutex<MockDaemonInner>>,
}

#[derive(Debug, Default)]
struct MockDaemonInner {
    local_id: String,
    uptime: u64,
    devices: Vec<DeviceEntry>,
    folders: Vec<FolderEntry>,
    connections: HashMap<String, ConnectionEntry>,
    stats: HashMap<String, DeviceStats>,
    pending: HashMap<String, PendingDevice>,
    folder_states: HashMap<String, String>,
    offline: HashSet<Source>,
    fail_writes_for: HashSet<String>,
}

fn unavailable(what: &str) -> ClientError {
    ClientError::InvalidResponse(format!("{} unavailable", what))
}

impl MockDaemon {
    /// A daemon whose local device is `local_id`.
    pub fn new(local_id: &str) -> Self {
        let daemon = Self::default();
        {
            let mut inner = daemon.inner.lock().unwrap();
            inner.local_id = local_id.to_string();
            inner.devices.push(DeviceEntry {
                device_id: local_id.to_string(),
                name: "local".to_string(),
                addresses: vec!["dynamic".to_string()],
                paused: false,
            });
        }
        daemon
    }

    /// Add a folder shared only with the local device.
    pub fn with_folder(self, folder_id: &str, path: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let local = inner.local_id.clone();
            inner.folders.push(FolderEntry {
                id: folder_id.to_string(),
                label: String::new(),
                path: path.to_string(),
                devices: vec![FolderDevice { device_id: local }],
                paused: false,
            });
        }
        self
    }

    /// Set the reported uptime.
    pub fn set_uptime(&self, secs: u64) {
        self.inner.lock().unwrap().uptime = secs;
    }

    /// Set a live connection for a device.
    pub fn set_connection(&self, device_id: &str, entry: ConnectionEntry) {
        let mut inner = self.inner.lock().unwrap();
        inner.connections.insert(device_id.to_string(), entry);
    }

    /// Set statistics for a device.
    pub fn set_stats(&self, device_id: &str, stats: DeviceStats) {
        let mut inner = self.inner.lock().unwrap();
        inner.stats.insert(device_id.to_string(), stats);
    }

    /// Add a pending pairing request.
    pub fn add_pending(&self, device_id: &str, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.pending.insert(
            device_id.to_string(),
            PendingDevice {
                name: name.to_string(),
                address: String::new(),
            },
        );
    }

    /// Set a folder's daemon state string.
    pub fn set_folder_state(&self, folder_id: &str, state: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .folder_states
            .insert(folder_id.to_string(), state.to_string());
    }

    /// Make a REST source fail.
    pub fn take_offline(&self, source: Source) {
        self.inner.lock().unwrap().offline.insert(source);
    }

    /// Make every configuration write touching `device_id` fail.
    pub fn fail_writes_for(&self, device_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_writes_for.insert(device_id.to_string());
    }

    /// Configured devices.
    pub fn devices(&self) -> Vec<DeviceEntry> {
        self.inner.lock().unwrap().devices.clone()
    }

    /// Configured device with `device_id`.
    pub fn device(&self, device_id: &str) -> Option<DeviceEntry> {
        self.devices()
            .into_iter()
            .find(|d| d.device_id == device_id)
    }

    /// Share list of a folder.
    pub fn shared_with(&self, folder_id: &str) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .folders
            .iter()
            .find(|f| f.id == folder_id)
            .map(|f| f.devices.iter().map(|d| d.device_id.clone()).collect())
            .unwrap_or_default()
    }

    fn check_online(&self, source: Source) -> Result<()> {
        if self.inner.lock().unwrap().offline.contains(&source) {
            return Err(unavailable(source.as_str()));
        }
        Ok(())
    }

    fn check_writable(inner: &MockDaemonInner, device_id: &str) -> Result<()> {
        if inner.fail_writes_for.contains(device_id) {
            return Err(ClientError::CommandFailed {
                program: "mock-syncthing".into(),
                exit_code: 1,
                stderr: format!("write rejected for {}", device_id),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DaemonConfig for MockDaemon {
    async fn local_device_id(&self) -> Result<String> {
        Ok(self.inner.lock().unwrap().local_id.clone())
    }

    async fn list_devices(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.devices.iter().map(|d| d.device_id.clone()).collect())
    }

    async fn add_device(&self, device_id: &str, name: Option<&str>) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_writable(&inner, device_id)?;
        if inner.devices.iter().any(|d| d.device_id == device_id) {
            return Err(ClientError::CommandFailed {
                program: "mock-syncthing".into(),
                exit_code: 1,
                stderr: format!("device {} already exists", device_id),
            });
        }
        inner.devices.push(DeviceEntry {
            device_id: device_id.to_string(),
            name: name.unwrap_or_default().to_string(),
            addresses: vec!["dynamic".to_string()],
            paused: false,
        });
        Ok(())
    }

    async fn set_device_address(&self, device_id: &str, address: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_writable(&inner, device_id)?;
        let device = inner
            .devices
            .iter_mut()
            .find(|d| d.device_id == device_id)
            .ok_or_else(|| unavailable(device_id))?;
        device.addresses = vec![address.to_string()];
        Ok(())
    }

    async fn list_folders(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.folders.iter().map(|f| f.id.clone()).collect())
    }

    async fn folder_devices(&self, folder_id: &str) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        inner
            .folders
            .iter()
            .find(|f| f.id == folder_id)
            .map(|f| f.devices.iter().map(|d| d.device_id.clone()).collect())
            .ok_or_else(|| unavailable(folder_id))
    }

    async fn add_device_to_folder(&self, folder_id: &str, device_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_writable(&inner, device_id)?;
        let folder = inner
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or_else(|| unavailable(folder_id))?;
        // The real daemon rejects duplicates too.
        if folder.devices.iter().any(|d| d.device_id == device_id) {
            return Err(ClientError::CommandFailed {
                program: "mock-syncthing".into(),
                exit_code: 1,
                stderr: format!("{} already shares {}", device_id, folder_id),
            });
        }
        folder.devices.push(FolderDevice {
            device_id: device_id.to_string(),
        });
        Ok(())
    }

    async fn add_folder(&self, folder_id: &str, path: &Path) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.folders.iter().any(|f| f.id == folder_id) {
            return Err(ClientError::CommandFailed {
                program: "mock-syncthing".into(),
                exit_code: 1,
                stderr: format!("folder {} already exists", folder_id),
            });
        }
        let local = inner.local_id.clone();
        inner.folders.push(FolderEntry {
            id: folder_id.to_string(),
            label: String::new(),
            path: path.to_string_lossy().to_string(),
            devices: vec![FolderDevice { device_id: local }],
            paused: false,
        });
        Ok(())
    }
}

#[async_trait]
impl ControlSurface for MockDaemon {
    async fn system_status(&self) -> Result<SystemStatus> {
        self.check_online(Source::System)?;
        let inner = self.inner.lock().unwrap();
        Ok(SystemStatus {
            my_id: inner.local_id.clone(),
            uptime: inner.uptime,
        })
    }

    async fn device_configs(&self) -> Result<Vec<DeviceEntry>> {
        self.check_online(Source::Devices)?;
        Ok(self.devices())
    }

    async fn folder_configs(&self) -> Result<Vec<FolderEntry>> {
        self.check_online(Source::Folders)?;
        Ok(self.inner.lock().unwrap().folders.clone())
    }

    async fn connections(&self) -> Result<Connections> {
        self.check_online(Source::Connections)?;
        Ok(Connections {
            connections: self.inner.lock().unwrap().connections.clone(),
        })
    }

    async fn device_stats(&self) -> Result<HashMap<String, DeviceStats>> {
        self.check_online(Source::Stats)?;
        Ok(self.inner.lock().unwrap().stats.clone())
    }

    async fn pending_devices(&self) -> Result<HashMap<String, PendingDevice>> {
        self.check_online(Source::Pending)?;
        Ok(self.inner.lock().unwrap().pending.clone())
    }

    async fn folder_status(&self, folder_id: &str) -> Result<FolderStatus> {
        self.check_online(Source::FolderState)?;
        let inner = self.inner.lock().unwrap();
        inner
            .folder_states
            .get(folder_id)
            .map(|state| FolderStatus {
                state: state.clone(),
            })
            .ok_or_else(|| unavailable(folder_id))
    }
}
