//! # sync-client
//!
//! I/O side of scratch-sync: talks to the overlay client, probes peers,
//! drives the local sync daemon, and aggregates its status.
//!
//! ## Seams
//!
//! - [`MembershipSource`]: who is on the overlay ([`TailscaleCli`], [`StaticMembership`])
//! - [`Prober`]: one health check per peer ([`HttpProbe`], [`ScriptedProbe`])
//! - [`DaemonConfig`]: daemon configuration writes ([`SyncthingCli`], [`MockDaemon`])
//! - [`ControlSurface`]: daemon runtime views ([`RestControl`], [`MockDaemon`])
//!
//! ## Example
//!
//! ```ignore
//! use scratch_sync_client::{CoordinatorConfig, HttpProbe, PairingCoordinator};
//!
//! let coordinator = PairingCoordinator::new(HttpProbe::new()?, daemon, CoordinatorConfig::default());
//! let discovery = coordinator.discover(&membership.list_online_peers().await, timeout).await;
//! let report = coordinator.run(&discovery.discovered).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod coordinator;
pub mod daemon;
pub mod error;
pub mod membership;
pub mod prerequisites;
pub mod probe;
pub mod status;

pub use command::{CommandOutput, Program};
pub use coordinator::{
    CoordinatorConfig, DiscoveryReport, LinkFailure, LinkReport, PairingCoordinator,
    PairingReport, DEFAULT_CONCURRENCY,
};
pub use daemon::{ControlSurface, DaemonConfig, MockDaemon, RestControl, SyncthingCli};
pub use error::{ClientError, Result};
pub use membership::{MembershipSource, StaticMembership, TailscaleCli};
pub use prerequisites::{locate, Prerequisites, Toolchain};
pub use probe::{HttpProbe, Prober, ScriptedProbe, DEFAULT_PROBE_TIMEOUT_SECS};
pub use status::{Source, StatusAggregator, StatusSnapshot, SystemSummary};
