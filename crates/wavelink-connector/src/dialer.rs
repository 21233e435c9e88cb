//! Dial and socket seams
//!
//! One `dial` call is one complete connect attempt: open the transport,
//! attach the credential to the handshake, and await the open acknowledgment.
//! The connector's retry loop and the connection pump are both written
//! against these traits so tests can substitute scripted implementations.

use async_trait::async_trait;
use url::Url;

use wavelink_core::{ConnectError, TransportError};

// ----------------------------------------------------------------------------
// Signal Socket
// ----------------------------------------------------------------------------

/// Raw duplex frame socket produced by a successful dial.
///
/// Exclusively owned by the `Connection` pump task; no two connections ever
/// share a socket.
#[async_trait]
pub trait SignalSocket: Send {
    /// Send one frame
    async fn send(&mut self, message: wavelink_core::TransportMessage)
        -> Result<(), TransportError>;

    /// Receive the next frame. `None` means the peer closed cleanly;
    /// `Some(Err(_))` is a mid-stream failure and terminates the socket.
    async fn recv(&mut self) -> Option<Result<wavelink_core::TransportMessage, TransportError>>;

    /// Close the socket, releasing the underlying transport
    async fn close(&mut self) -> Result<(), TransportError>;
}

// ----------------------------------------------------------------------------
// Dialer
// ----------------------------------------------------------------------------

/// Performs a single connect attempt against a signaling endpoint
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Open the transport, presenting `credential` as a bearer token during
    /// the handshake, and return the socket once the endpoint acknowledged
    /// the upgrade.
    async fn dial(
        &self,
        endpoint: &Url,
        credential: &str,
    ) -> Result<Box<dyn SignalSocket>, ConnectError>;
}
