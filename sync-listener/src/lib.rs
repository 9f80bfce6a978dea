//! # sync-listener
//!
//! Auxiliary discovery listener for scratch-sync.
//!
//! Answers `GET /info` with this machine's daemon identity so peers can pair
//! with it even when its daemon's GUI port is bound to localhost. Only
//! callers on the overlay network are answered.
//!
//! ```text
//! peer ──GET /info──► :8385 ──► { hostname, syncthing_device_id,
//!                                 syncthing_port, version }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod server;

pub use config::ListenerConfig;
pub use error::{ListenerError, Result};
pub use http::{build_router, is_overlay_addr};
pub use identity::{DaemonIdentity, IdentitySource, NodeInfo};
pub use server::{bind, serve, spawn, ListenerHandle};
