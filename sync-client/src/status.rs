//! Status aggregation.
//!
//! [`StatusAggregator::snapshot`] pulls every runtime view the daemon offers
//! and joins them on device id and folder id. Each source may be down on its
//! own; a missing source only blanks its part of the snapshot and is listed
//! in [`StatusSnapshot::degraded`]. A device whose connection data is missing
//! reports `connected = false` with [`LinkState::Unknown`], never
//! [`LinkState::Disconnected`].

use crate::daemon::api::{ConnectionEntry, DeviceEntry, DeviceStats, FolderEntry};
use crate::daemon::ControlSurface;
use futures_util::future::join_all;
use scratch_sync_core::is_managed;
use scratch_sync_types::{LinkState, ManagedDevice, ManagedFolder, SyncState};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One of the daemon's runtime views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// `/rest/system/status`
    System,
    /// `/rest/config/devices`
    Devices,
    /// `/rest/config/folders`
    Folders,
    /// `/rest/system/connections`
    Connections,
    /// `/rest/stats/device`
    Stats,
    /// `/rest/cluster/pending/devices`
    Pending,
    /// `/rest/db/status`
    FolderState,
}

impl Source {
    /// Short name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::System => "system status",
            Source::Devices => "device config",
            Source::Folders => "folder config",
            Source::Connections => "connections",
            Source::Stats => "device stats",
            Source::Pending => "pending devices",
            Source::FolderState => "folder state",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The local daemon itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemSummary {
    /// Local device id.
    pub device_id: String,
    /// Seconds since the daemon started.
    pub uptime_secs: u64,
}

/// Merged status of the local daemon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// The local daemon, if system status was available.
    pub system: Option<SystemSummary>,
    /// Remote devices.
    pub devices: Vec<ManagedDevice>,
    /// Managed folders.
    pub folders: Vec<ManagedFolder>,
    /// Pending pairing requests: device id to requested name.
    pub pending: BTreeMap<String, String>,
    /// Sources that could not be read.
    pub degraded: Vec<Source>,
}

impl StatusSnapshot {
    /// Whether every source answered.
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// Builds [`StatusSnapshot`]s from a [`ControlSurface`].
#[derive(Debug, Clone)]
pub struct StatusAggregator<C: ControlSurface> {
    control: C,
    folder_prefix: String,
}

fn ok_or_note<T>(
    result: crate::Result<T>,
    source: Source,
    degraded: &mut Vec<Source>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("{} unavailable: {}", source, e);
            degraded.push(source);
            None
        }
    }
}

fn configured_address(entry: &DeviceEntry) -> Option<String> {
    entry
        .addresses
        .iter()
        .find(|a| a.as_str() != "dynamic")
        .cloned()
}

impl<C: ControlSurface> StatusAggregator<C> {
    /// Aggregate over `control`, reporting folders whose id starts with `folder_prefix`.
    pub fn new(control: C, folder_prefix: &str) -> Self {
        Self {
            control,
            folder_prefix: folder_prefix.to_string(),
        }
    }

    /// Take a snapshot.
    pub async fn snapshot(&self) -> StatusSnapshot {
        let c = &self.control;
        let (system, devices, folders, connections, stats, pending) = tokio::join!(
            c.system_status(),
            c.device_configs(),
            c.folder_configs(),
            c.connections(),
            c.device_stats(),
            c.pending_devices(),
        );

        let mut degraded = Vec::new();
        let system = ok_or_note(system, Source::System, &mut degraded);
        let devices = ok_or_note(devices, Source::Devices, &mut degraded);
        let folders = ok_or_note(folders, Source::Folders, &mut degraded);
        let connections = ok_or_note(connections, Source::Connections, &mut degraded)
            .map(|c| c.connections);
        let stats = ok_or_note(stats, Source::Stats, &mut degraded).unwrap_or_default();
        let pending = ok_or_note(pending, Source::Pending, &mut degraded).unwrap_or_default();

        let local_id = system.as_ref().map(|s| s.my_id.clone());
        let devices = merge_devices(devices, connections.as_ref(), &stats, local_id.as_deref());

        let managed: Vec<FolderEntry> = folders
            .unwrap_or_default()
            .into_iter()
            .filter(|f| is_managed(&f.id, &self.folder_prefix))
            .collect();
        let states = join_all(managed.iter().map(|f| c.folder_status(&f.id))).await;

        let mut state_missing = false;
        let folders = managed
            .into_iter()
            .zip(states)
            .map(|(entry, state)| {
                let sync_state = match state {
                    Ok(status) => SyncState::from_daemon(&status.state),
                    Err(e) => {
                        tracing::debug!("no state for {}: {}", entry.id, e);
                        state_missing = true;
                        SyncState::Unknown
                    }
                };
                ManagedFolder {
                    folder_id: entry.id,
                    path: entry.path,
                    shared_with: entry.devices.into_iter().map(|d| d.device_id).collect(),
                    sync_state,
                }
            })
            .collect();
        if state_missing {
            degraded.push(Source::FolderState);
        }
        degraded.sort();

        StatusSnapshot {
            system: system.map(|s| SystemSummary {
                device_id: s.my_id,
                uptime_secs: s.uptime,
            }),
            devices,
            folders,
            pending: pending.into_iter().map(|(id, p)| (id, p.name)).collect(),
            degraded,
        }
    }
}

/// Join device configuration, connections and statistics on device id.
///
/// Without device configuration the device list falls back to the ids the
/// other sources mention.
fn merge_devices(
    configs: Option<Vec<DeviceEntry>>,
    connections: Option<&HashMap<String, ConnectionEntry>>,
    stats: &HashMap<String, DeviceStats>,
    local_id: Option<&str>,
) -> Vec<ManagedDevice> {
    let configs = configs.unwrap_or_else(|| {
        let mut ids: Vec<&String> = stats
            .keys()
            .chain(connections.into_iter().flat_map(|c| c.keys()))
            .collect();
        ids.sort();
        ids.dedup();
        ids.into_iter()
            .map(|id| DeviceEntry {
                device_id: id.clone(),
                ..DeviceEntry::default()
            })
            .collect()
    });

    configs
        .into_iter()
        .filter(|entry| Some(entry.device_id.as_str()) != local_id)
        .map(|entry| {
            let mut device = ManagedDevice::configured(
                &entry.device_id,
                Some(entry.name.clone()).filter(|n| !n.is_empty()),
            );
            device.address = configured_address(&entry);
            device.paused = entry.paused;
            device.last_seen = stats.get(&entry.device_id).and_then(|s| s.last_seen);

            if let Some(connections) = connections {
                match connections.get(&entry.device_id) {
                    Some(conn) => {
                        device.connected = conn.connected;
                        device.paused = device.paused || conn.paused;
                        device.bytes_in = conn.in_bytes_total;
                        device.bytes_out = conn.out_bytes_total;
                        if conn.connected && !conn.address.is_empty() {
                            device.address = Some(conn.address.clone());
                        }
                        device.link = if conn.connected {
                            LinkState::Connected
                        } else {
                            LinkState::Disconnected
                        };
                    }
                    None => device.link = LinkState::Disconnected,
                }
            }
            device
        })
        .collect()
}
