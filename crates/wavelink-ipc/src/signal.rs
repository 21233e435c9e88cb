//! Signal identities carried across the process boundary

use std::fmt;

use crate::error::IpcError;

/// Longest accepted signal name, in bytes. One signal is one datagram, so
/// names stay well under any conceivable datagram limit.
const MAX_NAME_LEN: usize = 64;

// ----------------------------------------------------------------------------
// Process Signal
// ----------------------------------------------------------------------------

/// Identity-only signal exchanged between cooperating processes.
///
/// A signal carries no payload; the name is the entire message. Names are
/// short, dot-separated ASCII identifiers like `capture.started`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessSignal(String);

impl ProcessSignal {
    /// The broadcast helper began capturing.
    pub const CAPTURE_STARTED: &'static str = "capture.started";
    /// The broadcast helper stopped capturing.
    pub const CAPTURE_STOPPED: &'static str = "capture.stopped";

    /// Validate and wrap a signal name.
    ///
    /// Names are non-empty, at most 64 bytes, and restricted to ASCII
    /// alphanumerics plus `.`, `-` and `_`.
    pub fn new(name: impl Into<String>) -> Result<Self, IpcError> {
        let name = name.into();
        if name.is_empty() {
            return Err(IpcError::InvalidSignal("empty name".to_string()));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(IpcError::InvalidSignal(format!(
                "name exceeds {MAX_NAME_LEN} bytes"
            )));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_')
        {
            return Err(IpcError::InvalidSignal(format!(
                "name contains invalid characters: {name}"
            )));
        }
        Ok(Self(name))
    }

    pub fn capture_started() -> Self {
        Self(Self::CAPTURE_STARTED.to_string())
    }

    pub fn capture_stopped() -> Self {
        Self(Self::CAPTURE_STOPPED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
