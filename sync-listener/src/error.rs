//! Error types for sync-listener.

use scratch_sync_client::ClientError;

/// Errors from running the discovery listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The listen address could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Requested address.
        address: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The server stopped with an error.
    #[error("listener failed: {0}")]
    Serve(#[source] std::io::Error),

    /// Invalid listener configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The local identity could not be determined.
    #[error("identity lookup failed: {0}")]
    Identity(#[from] ClientError),
}

/// Result type alias for listener operations.
pub type Result<T> = std::result::Result<T, ListenerError>;
