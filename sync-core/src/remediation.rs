//! Grouping probe failures into actionable categories.
//!
//! The fix for a peer that refused the connection (start the daemon) is
//! different from one that timed out (check the network path), so failures
//! are reported per category rather than as one flat list.

use scratch_sync_types::{Peer, ProbeOutcome, ProbeStatus};

/// Remediation category for a failed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureCategory {
    /// The host answered but nothing listens on the GUI port.
    NotListening,
    /// No answer within the timeout.
    TimedOut,
    /// Something answered, but not a usable daemon; or an unexpected error.
    Other,
}

impl FailureCategory {
    /// Category for a status, `None` for success.
    pub fn of(status: ProbeStatus) -> Option<Self> {
        match status {
            ProbeStatus::Success => None,
            ProbeStatus::ConnectionRefused => Some(FailureCategory::NotListening),
            ProbeStatus::Timeout => Some(FailureCategory::TimedOut),
            ProbeStatus::NoIdentityHeader
            | ProbeStatus::HttpError
            | ProbeStatus::UnknownError => Some(FailureCategory::Other),
        }
    }

    /// Short heading.
    pub fn title(&self) -> &'static str {
        match self {
            FailureCategory::NotListening => "Sync daemon not running",
            FailureCategory::TimedOut => "No response (timed out)",
            FailureCategory::Other => "Other errors",
        }
    }

    /// Remediation steps, one per line.
    pub fn guidance(&self) -> &'static [&'static str] {
        match self {
            FailureCategory::NotListening => &[
                "Install and start Syncthing on these machines",
                "Then run 'scratch-sync pair' again",
            ],
            FailureCategory::TimedOut => &[
                "Check that the machines are awake and reachable over Tailscale",
                "Check firewall rules and Tailscale ACLs for port 8384",
                "Syncthing's GUI may be bound to 127.0.0.1; bind it to 0.0.0.0 or the Tailscale IP",
                "Or retry with a longer --timeout",
            ],
            FailureCategory::Other => &[
                "Port 8384 answered but does not look like Syncthing",
                "Check that Syncthing is up to date and its GUI is enabled",
                "Run with RUST_LOG=debug for details",
            ],
        }
    }
}

/// Failed peers sharing one remediation category.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureGroup<'a> {
    /// The category.
    pub category: FailureCategory,
    /// The peers and their outcomes, in input order.
    pub failures: Vec<(&'a Peer, &'a ProbeOutcome)>,
}

/// Group failures by category.
///
/// Groups come back in a fixed order (not listening, timed out, other) and
/// only non-empty groups are returned. Successful outcomes are ignored.
pub fn group_failures(failures: &[(Peer, ProbeOutcome)]) -> Vec<FailureGroup<'_>> {
    let order = [
        FailureCategory::NotListening,
        FailureCategory::TimedOut,
        FailureCategory::Other,
    ];

    order
        .into_iter()
        .filter_map(|category| {
            let members: Vec<_> = failures
                .iter()
                .filter(|(_, outcome)| FailureCategory::of(outcome.status()) == Some(category))
                .map(|(peer, outcome)| (peer, outcome))
                .collect();
            if members.is_empty() {
                None
            } else {
                Some(FailureGroup {
                    category,
                    failures: members,
                })
            }
        })
        .collect()
}
