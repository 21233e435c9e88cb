//! Best-effort cross-process signaling
//!
//! Fire-and-forget notifications between two cooperating processes that share
//! no memory, such as a host application and its broadcast capture helper.
//! The channel carries signal identities only: no payload, no delivery
//! guarantee, no ordering across distinct signal kinds. It is suitable for
//! opportunistic UX signaling and must never be relied upon for correctness.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod error;
pub mod signal;

#[cfg(unix)]
pub mod notifier;
#[cfg(not(unix))]
#[path = "notifier_stub.rs"]
pub mod notifier;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use error::IpcError;
pub use notifier::CrossProcessNotifier;
pub use signal::ProcessSignal;
