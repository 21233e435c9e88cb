//! IPC error taxonomy

use thiserror::Error;

/// Failures setting up the cross-process channel.
///
/// Posting never errors; delivery failures are dropped by design.
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("invalid signal name: {0}")]
    InvalidSignal(String),

    #[error("failed to bind notification socket at {path}")]
    Bind {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cross-process notifications are not supported on this platform")]
    Unsupported,
}
