//! Error types for sync-client.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from talking to the overlay client or the sync daemon.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required external program is missing or not running.
    #[error("{0}")]
    MissingPrerequisite(String),

    /// The external program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program path.
        program: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The external program exited non-zero.
    #[error("{program} exited with {exit_code}: {stderr}")]
    CommandFailed {
        /// Program path.
        program: PathBuf,
        /// Exit code (-1 if killed by a signal).
        exit_code: i32,
        /// Trimmed standard error.
        stderr: String,
    },

    /// The external program did not finish in time.
    #[error("{program} did not finish within {secs}s")]
    CommandTimeout {
        /// Program path.
        program: PathBuf,
        /// Timeout that elapsed.
        secs: u64,
    },

    /// HTTP request to the daemon's control API failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON could not be decoded.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A response was well-formed but not usable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display() {
        let err = ClientError::CommandFailed {
            program: PathBuf::from("syncthing"),
            exit_code: 1,
            stderr: "no such device".into(),
        };
        assert_eq!(err.to_string(), "syncthing exited with 1: no such device");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
