//! Stub notifier for platforms without unix datagram sockets

use std::path::Path;

use tokio::sync::broadcast;

use crate::error::IpcError;
use crate::signal::ProcessSignal;

/// Placeholder that always fails to bind; cross-process signaling is
/// unix-only.
pub struct CrossProcessNotifier {
    received_tx: broadcast::Sender<ProcessSignal>,
}

impl CrossProcessNotifier {
    pub fn bind(_local: impl AsRef<Path>, _peer: impl AsRef<Path>) -> Result<Self, IpcError> {
        Err(IpcError::Unsupported)
    }

    pub fn post(&self, _signal: &ProcessSignal) {}

    pub fn subscribe(&self) -> broadcast::Receiver<ProcessSignal> {
        self.received_tx.subscribe()
    }

    pub async fn shutdown(&self) {}
}
