//! Value types for network paths and signaling frames
//!
//! Newtype patterns are used for identifiers so that snapshots compare by
//! value rather than by provenance.

use core::fmt;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Interface Identity
// ----------------------------------------------------------------------------

/// Opaque identifier of a network interface as reported by the platform
/// (e.g. `en0`, `pdp_ip0`, an index rendered as text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceId(String);

impl InterfaceId {
    /// Create an interface identifier from its platform name
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InterfaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Classification of the active network interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// Wi-Fi / WLAN
    Wifi,
    /// Cellular data (LTE, 5G, ...)
    Cellular,
    /// Wired ethernet
    Wired,
    /// Loopback (simulators, tests)
    Loopback,
    /// Known interface that fits no other class
    Other,
    /// Classification not reported by the platform
    Unknown,
}

impl Default for InterfaceKind {
    fn default() -> Self {
        Self::Unknown
    }
}

// ----------------------------------------------------------------------------
// Network Path Snapshot
// ----------------------------------------------------------------------------

/// Immutable description of network reachability at a point in time.
///
/// Produced by a platform path source on every raw path update; retired as
/// soon as the monitor has compared it against the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPathSnapshot {
    /// Whether the device currently has a usable path to the network
    pub reachable: bool,
    /// Identifier of the active interface, if any
    pub interface_id: Option<InterfaceId>,
    /// Primary local address on the active interface, if known
    pub local_address: Option<String>,
    /// Classification of the active interface
    pub kind: InterfaceKind,
}

impl NetworkPathSnapshot {
    /// Snapshot for a device with no usable network path
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Snapshot for a reachable path over the given interface
    pub fn reachable_via(
        interface_id: impl Into<InterfaceId>,
        kind: InterfaceKind,
        local_address: Option<String>,
    ) -> Self {
        Self {
            reachable: true,
            interface_id: Some(interface_id.into()),
            local_address,
            kind,
        }
    }

    /// Whether two snapshots describe the same network path.
    ///
    /// Compares interface identity and primary local address only;
    /// reachability is tracked separately by the monitor.
    pub fn same_path(&self, other: &Self) -> bool {
        self.interface_id == other.interface_id && self.local_address == other.local_address
    }
}

// ----------------------------------------------------------------------------
// Connectivity Events
// ----------------------------------------------------------------------------

/// Debounced, decision-grade signal emitted by the connectivity monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectivityEvent {
    /// Overall reachability crossed the satisfied/unsatisfied boundary.
    /// Deduplicated: never emitted twice in a row with the same value.
    ReachabilityChanged(bool),
    /// The active network changed while (or shortly after) staying usable;
    /// the session layer should treat this as a migration opportunity.
    NetworkSwitched(NetworkPathSnapshot),
}

// ----------------------------------------------------------------------------
// Transport Messages
// ----------------------------------------------------------------------------

/// A discrete frame carried over the duplex signaling connection.
///
/// Frames are forwarded verbatim; this layer imposes no framing or
/// serialization semantics of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMessage {
    /// UTF-8 text frame
    Text(String),
    /// Binary frame
    Binary(Vec<u8>),
}

impl TransportMessage {
    /// Payload length in bytes
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
