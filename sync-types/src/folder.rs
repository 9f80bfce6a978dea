//! View of a managed folder in the local sync daemon.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Folder-id prefix identifying folders scratch-sync owns.
pub const MANAGED_FOLDER_PREFIX: &str = "scratch-";

/// Coarse folder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Up to date.
    Idle,
    /// Scanning the local tree.
    Scanning,
    /// Pulling or preparing to pull changes.
    Syncing,
    /// The daemon reports an error.
    Error,
    /// State could not be determined.
    Unknown,
}

impl SyncState {
    /// Map the daemon's state string onto the coarse model.
    ///
    /// Waiting states fold into their active counterpart.
    pub fn from_daemon(state: &str) -> Self {
        match state {
            "idle" => SyncState::Idle,
            "scanning" | "scan-waiting" => SyncState::Scanning,
            "syncing" | "sync-waiting" | "sync-preparing" | "cleaning" | "clean-waiting" => {
                SyncState::Syncing
            }
            "error" | "stopped" => SyncState::Error,
            _ => SyncState::Unknown,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncState::Idle => "idle",
            SyncState::Scanning => "scanning",
            SyncState::Syncing => "syncing",
            SyncState::Error => "error",
            SyncState::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A managed folder and its share list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedFolder {
    /// Folder id, always starting with [`MANAGED_FOLDER_PREFIX`].
    pub folder_id: String,
    /// Local path.
    pub path: String,
    /// Devices the folder is shared with, in daemon order.
    pub shared_with: Vec<String>,
    /// Current state.
    pub sync_state: SyncState,
}
