//! Structured errors for the host bridge.
//!
//! Worker operations themselves never fail; these cover events the bridge
//! cannot accept.

/// Structured errors for the host bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The line was not a valid host event.
    #[error("INVALID_EVENT: {0}")]
    InvalidEvent(String),

    /// `activate` arrived with no installed version waiting.
    #[error("NOT_INSTALLED: no installed version to activate")]
    NotInstalled,
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::InvalidEvent(err.to_string())
    }
}
