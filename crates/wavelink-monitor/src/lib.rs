//! Debounced network connectivity monitor
//!
//! Converts a raw stream of platform path updates (arbitrary frequency, noisy)
//! into two low-frequency, decision-grade signals: "connectivity lost/restored"
//! and "active network changed (migration candidate)". The session layer
//! subscribes to these signals to decide whether to migrate or reconnect an
//! open signaling connection; this crate never makes that decision itself.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod machine;
pub mod monitor;
pub mod source;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::MonitorConfig;
pub use monitor::ConnectivityMonitor;
pub use source::{ChannelPathSource, PathSource};
