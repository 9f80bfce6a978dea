//! # sync-types
//!
//! Data model shared by all scratch-sync crates.
//!
//! Everything here is derived on each call from live state (the overlay
//! network's membership or the sync daemon's configuration) and never
//! persisted by scratch-sync itself:
//! - [`Peer`] - a machine visible on the overlay network
//! - [`ProbeOutcome`], [`ProbeStatus`], [`PeerIdentity`] - result of probing a peer
//! - [`ManagedDevice`], [`ManagedFolder`] - views over the daemon's state

#![warn(missing_docs)]
#![warn(clippy::all)]

mod device;
mod folder;
mod peer;
mod probe;

pub use device::{LinkState, ManagedDevice};
pub use folder::{ManagedFolder, SyncState, MANAGED_FOLDER_PREFIX};
pub use peer::{Peer, PeerIdentity};
pub use probe::{ProbeFailure, ProbeOutcome, ProbeStatus};

/// Port the sync daemon's GUI/REST API listens on.
pub const GUI_PORT: u16 = 8384;

/// Port the sync daemon uses for device-to-device data transfer.
pub const DATA_PORT: u16 = 22000;

/// Port of the auxiliary discovery listener.
pub const LISTENER_PORT: u16 = 8385;

/// Unauthenticated health path probed on candidate peers.
pub const HEALTH_PATH: &str = "/rest/noauth/health";

/// Response header carrying the remote daemon's device identity.
pub const DEVICE_ID_HEADER: &str = "X-Syncthing-Id";

/// Response header carrying the remote daemon's version.
pub const VERSION_HEADER: &str = "X-Syncthing-Version";
