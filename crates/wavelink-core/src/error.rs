//! Error taxonomy for connection establishment and live transports
//!
//! Connect failures are split into a deliberately narrow retryable class and
//! everything else. Broadening the retryable class risks masking terminal
//! errors (an auth rejection retried three times is a multi-second stall),
//! so `ConnectError::is_retryable` is the single source of truth and is
//! covered by tests in the connector crate.

use core::time::Duration;

use thiserror::Error;

// ----------------------------------------------------------------------------
// Connect Errors
// ----------------------------------------------------------------------------

/// Failure to establish a signaling connection
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// The connection was reset while the transport upgrade handshake was in
    /// flight. Known transient race in upgrade handshakes; retryable.
    #[error("handshake reset before upgrade completed: {0}")]
    HandshakeReset(String),

    /// A single attempt exceeded its timeout. Retryable: the per-attempt
    /// bound exists so one slow attempt cannot consume the whole window.
    #[error("connect attempt timed out after {0:?}")]
    AttemptTimeout(Duration),

    /// The endpoint rejected the credential during the upgrade
    #[error("authentication rejected (HTTP status {status})")]
    AuthRejected { status: u16 },

    /// The endpoint host could not be resolved
    #[error("endpoint could not be resolved: {0}")]
    Dns(String),

    /// TLS negotiation failed
    #[error("TLS negotiation failed: {0}")]
    Tls(String),

    /// The server completed the handshake machinery but refused the
    /// connection with a protocol-level status
    #[error("server rejected connection (HTTP status {status}): {reason}")]
    Rejected { status: u16, reason: String },

    /// The overall connect operation was cancelled by the caller
    #[error("connect cancelled")]
    Cancelled,

    /// Any other transport-level failure during establishment
    #[error("transport failure during connect: {0}")]
    Transport(String),
}

impl ConnectError {
    /// Whether a failed attempt of this class should be retried.
    ///
    /// Only the handshake-reset race and a per-attempt timeout qualify;
    /// every other class is terminal and aborts the retry loop.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::HandshakeReset(_) | Self::AttemptTimeout(_))
    }
}

// ----------------------------------------------------------------------------
// Transport Errors
// ----------------------------------------------------------------------------

/// Failure on an already-open signaling connection
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection is closed or closing; no further frames can be sent
    #[error("connection is closed")]
    ConnectionClosed,

    /// The peer closed the connection with a non-normal close status
    #[error("server closed connection (code {code}): {reason}")]
    AbnormalClose { code: u16, reason: String },

    /// Protocol violation on the wire
    #[error("transport protocol error: {0}")]
    Protocol(String),

    /// I/O failure on the underlying socket
    #[error("transport i/o failure: {0}")]
    Io(String),
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
