//! Error types for the synchronization workflows.

use thiserror::Error;

/// Errors returned by the remote-call components.
///
/// Every variant is terminal for a run; callers decide how to report it.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The configured proxy was rejected.
    #[error("invalid proxy {proxy}: {source}")]
    Proxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
    /// Network failure or timeout before a response arrived.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The remote answered with a status outside the accepted set.
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response body was not the expected JSON shape.
    #[error("invalid JSON from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// No extensible attribute definition matched the name.
    #[error("extensible attribute '{0}' not found")]
    NotFound(String),
}

impl SyncError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
