//! Resilient signaling connector
//!
//! Establishes a duplex, message-oriented connection to a signaling endpoint,
//! retrying a bounded number of times on the narrow class of transient
//! handshake failures with capped exponential backoff. The result is a
//! [`Connection`]: one owned transport handle, a single-consumer ordered
//! message stream, suspending sends, and idempotent close.
//!
//! Reconnecting an already-open connection is deliberately out of scope;
//! once a connection fails the caller decides whether to connect again.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod connection;
pub mod connector;
pub mod dialer;
pub mod ws;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use connection::{Connection, ConnectionState, MessageStream};
pub use connector::ResilientConnector;
pub use dialer::{Dialer, SignalSocket};
pub use ws::WsDialer;
