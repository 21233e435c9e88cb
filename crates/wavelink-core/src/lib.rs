//! Shared types for the wavelink connection-resilience layer
//!
//! This crate defines the value types exchanged between the connectivity
//! monitor, the resilient connector, and their consumers: network path
//! snapshots, connectivity events, transport messages, retry policies, and
//! the error taxonomy. It carries no I/O of its own.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod error;
pub mod retry;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use error::{ConnectError, TransportError};
pub use retry::RetryPolicy;
pub use types::{
    ConnectivityEvent, InterfaceId, InterfaceKind, NetworkPathSnapshot, TransportMessage,
};
