//! # sync-core
//!
//! Pure logic for scratch-sync (no I/O, instant tests).
//!
//! Everything here takes values in and hands values back. The I/O of probing
//! peers, shelling out to the daemon and the overlay client, and talking to
//! the daemon's REST API lives in `sync-client`, which feeds results through
//! these functions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod folder_id;
pub mod humanize;
pub mod remediation;
pub mod selection;
pub mod sharing;

pub use folder_id::{is_managed, managed_folder_id, repo_name_from_remote, sanitize_folder_id};
pub use remediation::{group_failures, FailureCategory, FailureGroup};
pub use selection::{select, Selection, SelectionResult};
pub use sharing::{missing_members, plan_links, LinkTask};
