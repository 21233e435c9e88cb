//! Unix-datagram notifier
//!
//! Each process binds its own socket path and posts datagrams toward its
//! peer's path. A datagram is the signal name and nothing else. `post` never
//! suspends and never fails: if the peer is not bound or the kernel buffer is
//! full, the signal is logged at debug and dropped.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::net::UnixDatagram;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::IpcError;
use crate::signal::ProcessSignal;

/// Fan-out buffer for received signals; a lagging subscriber loses the
/// oldest, consistent with the at-most-once contract.
const SIGNAL_BUFFER: usize = 16;

/// Large enough for any valid signal name.
const DATAGRAM_BUFFER: usize = 128;

// ----------------------------------------------------------------------------
// Cross-Process Notifier
// ----------------------------------------------------------------------------

/// Best-effort signal channel between two cooperating processes
pub struct CrossProcessNotifier {
    socket: Arc<UnixDatagram>,
    peer: PathBuf,
    local: PathBuf,
    received_tx: broadcast::Sender<ProcessSignal>,
    shutdown: CancellationToken,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl CrossProcessNotifier {
    /// Bind the local socket path and start listening for peer signals.
    ///
    /// A stale socket file left by a crashed previous instance is removed
    /// before binding. The peer does not need to be bound yet; signals posted
    /// toward an absent peer are silently dropped.
    pub fn bind(
        local: impl AsRef<Path>,
        peer: impl AsRef<Path>,
    ) -> Result<Self, IpcError> {
        let local = local.as_ref().to_path_buf();
        let peer = peer.as_ref().to_path_buf();

        let _ = std::fs::remove_file(&local);
        let socket = UnixDatagram::bind(&local).map_err(|source| IpcError::Bind {
            path: local.display().to_string(),
            source,
        })?;
        let socket = Arc::new(socket);

        let (received_tx, _) = broadcast::channel(SIGNAL_BUFFER);
        let shutdown = CancellationToken::new();

        let reader = tokio::spawn(reader_loop(
            Arc::clone(&socket),
            received_tx.clone(),
            shutdown.clone(),
        ));

        Ok(Self {
            socket,
            peer,
            local,
            received_tx,
            shutdown,
            reader: Mutex::new(Some(reader)),
        })
    }

    /// Post a signal toward the peer, fire-and-forget.
    ///
    /// Never suspends and never reports failure; an unreachable peer or a
    /// full kernel buffer drops the signal.
    pub fn post(&self, signal: &ProcessSignal) {
        if let Err(err) = self
            .socket
            .try_send_to(signal.as_str().as_bytes(), &self.peer)
        {
            debug!(%signal, %err, "dropped cross-process signal");
        }
    }

    /// Subscribe to signals received from the peer
    pub fn subscribe(&self) -> broadcast::Receiver<ProcessSignal> {
        self.received_tx.subscribe()
    }

    /// Stop listening and join the reader task. Idempotent.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = match self.reader.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for CrossProcessNotifier {
    fn drop(&mut self) {
        self.shutdown.cancel();
        let _ = std::fs::remove_file(&self.local);
    }
}

// ----------------------------------------------------------------------------
// Reader Task
// ----------------------------------------------------------------------------

async fn reader_loop(
    socket: Arc<UnixDatagram>,
    received_tx: broadcast::Sender<ProcessSignal>,
    shutdown: CancellationToken,
) {
    let mut buf = [0u8; DATAGRAM_BUFFER];
    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buf) => received,
        };
        match received {
            Ok((len, _)) => {
                let parsed = std::str::from_utf8(&buf[..len])
                    .ok()
                    .and_then(|name| ProcessSignal::new(name).ok());
                match parsed {
                    // No subscribers is fine; the signal is simply dropped.
                    Some(signal) => {
                        let _ = received_tx.send(signal);
                    }
                    None => debug!("ignoring malformed signal datagram"),
                }
            }
            Err(err) => {
                debug!(%err, "notification socket read failed");
                break;
            }
        }
    }
}
