//! Probe outcomes.
//!
//! A probe either succeeds with a [`PeerIdentity`] or fails with one of five
//! closed failure kinds. [`ProbeOutcome`] can only be built through
//! [`ProbeOutcome::success`] and [`ProbeOutcome::failure`], so an identity is
//! present exactly when the status is [`ProbeStatus::Success`].

use crate::PeerIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeStatus {
    /// HTTP 200 with a device identity header.
    Success,
    /// Host reachable, nothing listening on the GUI port.
    ConnectionRefused,
    /// No response within the caller's timeout.
    Timeout,
    /// HTTP 200 but the identity header was absent.
    NoIdentityHeader,
    /// Any non-200 HTTP status.
    HttpError,
    /// Any other transport-level failure.
    UnknownError,
}

impl ProbeStatus {
    /// Stable upper-case label, e.g. `CONNECTION_REFUSED`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Success => "SUCCESS",
            ProbeStatus::ConnectionRefused => "CONNECTION_REFUSED",
            ProbeStatus::Timeout => "TIMEOUT",
            ProbeStatus::NoIdentityHeader => "NO_IDENTITY_HEADER",
            ProbeStatus::HttpError => "HTTP_ERROR",
            ProbeStatus::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The failing subset of [`ProbeStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeFailure {
    /// See [`ProbeStatus::ConnectionRefused`].
    ConnectionRefused,
    /// See [`ProbeStatus::Timeout`].
    Timeout,
    /// See [`ProbeStatus::NoIdentityHeader`].
    NoIdentityHeader,
    /// See [`ProbeStatus::HttpError`].
    HttpError,
    /// See [`ProbeStatus::UnknownError`].
    UnknownError,
}

impl From<ProbeFailure> for ProbeStatus {
    fn from(failure: ProbeFailure) -> Self {
        match failure {
            ProbeFailure::ConnectionRefused => ProbeStatus::ConnectionRefused,
            ProbeFailure::Timeout => ProbeStatus::Timeout,
            ProbeFailure::NoIdentityHeader => ProbeStatus::NoIdentityHeader,
            ProbeFailure::HttpError => ProbeStatus::HttpError,
            ProbeFailure::UnknownError => ProbeStatus::UnknownError,
        }
    }
}

/// Result of probing one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    status: ProbeStatus,
    peer_identity: Option<PeerIdentity>,
    error_message: Option<String>,
}

impl ProbeOutcome {
    /// A successful probe.
    pub fn success(identity: PeerIdentity) -> Self {
        Self {
            status: ProbeStatus::Success,
            peer_identity: Some(identity),
            error_message: None,
        }
    }

    /// A failed probe with an explanatory message.
    pub fn failure(kind: ProbeFailure, message: impl Into<String>) -> Self {
        Self {
            status: kind.into(),
            peer_identity: None,
            error_message: Some(message.into()),
        }
    }

    /// The probe's classification.
    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    /// Whether the probe succeeded.
    pub fn is_success(&self) -> bool {
        self.status == ProbeStatus::Success
    }

    /// The identity, present only on success.
    pub fn peer_identity(&self) -> Option<&PeerIdentity> {
        self.peer_identity.as_ref()
    }

    /// Consume the outcome, returning the identity on success.
    pub fn into_identity(self) -> Option<PeerIdentity> {
        self.peer_identity
    }

    /// Failure detail, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}
