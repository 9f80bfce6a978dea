//! The selection step of a pairing run.
//!
//! The operator either accepts every discovered peer or names a subset. A
//! filter matches a peer by hostname (case-insensitive), by overlay IP, or
//! by a device-id prefix.

use scratch_sync_types::PeerIdentity;

/// Which discovered peers to pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every discovered peer.
    All,
    /// Only peers matching one of these filters.
    Only(Vec<String>),
}

/// Result of applying a [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    /// Selected identities, in discovery order.
    pub selected: Vec<PeerIdentity>,
    /// Filters that matched nothing.
    pub unmatched: Vec<String>,
}

fn matches(identity: &PeerIdentity, filter: &str) -> bool {
    let filter = filter.trim();
    if filter.is_empty() {
        return false;
    }
    identity
        .hostname
        .as_deref()
        .is_some_and(|h| h.eq_ignore_ascii_case(filter))
        || identity.overlay_ip == filter
        || identity.device_id.starts_with(filter)
}

/// Apply a selection to the discovered identities.
pub fn select(discovered: &[PeerIdentity], selection: &Selection) -> SelectionResult {
    match selection {
        Selection::All => SelectionResult {
            selected: discovered.to_vec(),
            unmatched: Vec::new(),
        },
        Selection::Only(filters) => {
            let selected = discovered
                .iter()
                .filter(|identity| filters.iter().any(|f| matches(identity, f)))
                .cloned()
                .collect();
            let unmatched = filters
                .iter()
                .filter(|f| !discovered.iter().any(|identity| matches(identity, f)))
                .cloned()
                .collect();
            SelectionResult {
                selected,
                unmatched,
            }
        }
    }
}
