//! Connectivity monitor actor
//!
//! One task owns the debounce machine and the timer deadline; snapshots and
//! the timer firing are therefore strictly serialized, and subscribers are
//! notified over a broadcast channel after internal state has been updated,
//! never from inside a lock.

use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use wavelink_core::{ConnectivityEvent, InterfaceKind, NetworkPathSnapshot};

use crate::config::MonitorConfig;
use crate::machine::{PathMachine, TimerAction};
use crate::source::PathSource;

// ----------------------------------------------------------------------------
// Connectivity Monitor
// ----------------------------------------------------------------------------

/// Debounced monitor over a platform path source.
///
/// Explicitly constructed and injectable: callers hold a reference (usually
/// one per process), tests construct independent instances. The monitor
/// never fails; if the underlying source stops delivering updates it simply
/// goes stale, which is a documented limitation rather than an error.
pub struct ConnectivityMonitor {
    config: MonitorConfig,
    snapshot: Arc<RwLock<NetworkPathSnapshot>>,
    events_tx: broadcast::Sender<ConnectivityEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl ConnectivityMonitor {
    /// Create a stopped monitor with the given configuration
    pub fn new(config: MonitorConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_buffer);
        Self {
            config,
            snapshot: Arc::new(RwLock::new(NetworkPathSnapshot::unreachable())),
            events_tx,
            task: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    /// Start processing updates from the given source.
    ///
    /// A second call while running is a no-op.
    pub async fn start<S: PathSource>(&self, mut source: S) {
        {
            let Ok(guard) = self.task.lock() else { return };
            if guard.is_some() {
                warn!("connectivity monitor already started");
                return;
            }
        }

        let updates = source.watch().await;
        let handle = tokio::spawn(run_loop(
            updates,
            Arc::clone(&self.snapshot),
            self.events_tx.clone(),
            self.shutdown.clone(),
            self.config.clone(),
        ));

        if let Ok(mut guard) = self.task.lock() {
            if guard.is_some() {
                // Lost a start race; the first task keeps running.
                handle.abort();
            } else {
                *guard = Some(handle);
            }
        }
    }

    /// Stop the monitor and wait for its task to finish. Idempotent; a
    /// stopped monitor stays stopped.
    pub async fn stop(&self) {
        self.shutdown.cancel();
        let handle = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Subscribe to debounced connectivity events.
    ///
    /// Fan-out is by channel: every receiver sees every event emitted after
    /// it subscribed. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events_tx.subscribe()
    }

    /// Point-in-time query of the last processed snapshot. Before the first
    /// update this reports an unreachable path.
    pub fn current_snapshot(&self) -> NetworkPathSnapshot {
        self.snapshot
            .read()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }

    /// Classification of the currently active interface. Pure query; does
    /// not participate in the debounce state machine.
    pub fn active_interface_kind(&self) -> InterfaceKind {
        self.snapshot
            .read()
            .map(|snapshot| snapshot.kind)
            .unwrap_or_default()
    }
}

// ----------------------------------------------------------------------------
// Actor Loop
// ----------------------------------------------------------------------------

async fn run_loop(
    mut updates: mpsc::Receiver<NetworkPathSnapshot>,
    shared: Arc<RwLock<NetworkPathSnapshot>>,
    events_tx: broadcast::Sender<ConnectivityEvent>,
    shutdown: CancellationToken,
    config: MonitorConfig,
) {
    let mut machine = PathMachine::new();
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,

            maybe = updates.recv() => {
                let Some(next) = maybe else {
                    debug!("path source closed, monitor going stale");
                    break;
                };
                let step = machine.on_snapshot(next.clone());
                match step.timer {
                    TimerAction::Arm => {
                        deadline = Some(Instant::now() + config.debounce_window);
                    }
                    TimerAction::Disarm => deadline = None,
                    TimerAction::Keep => {}
                }
                if let Ok(mut snapshot) = shared.write() {
                    *snapshot = next;
                }
                emit(&events_tx, step.events);
            }

            _ = debounce_expired(deadline) => {
                deadline = None;
                let step = machine.on_timer_fired();
                emit(&events_tx, step.events);
            }
        }
    }
}

/// Completes when the armed deadline passes; pends forever while disarmed.
async fn debounce_expired(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn emit(events_tx: &broadcast::Sender<ConnectivityEvent>, events: Vec<ConnectivityEvent>) {
    for event in events {
        debug!(?event, "connectivity event");
        // Send only fails when nobody is subscribed; that is fine.
        let _ = events_tx.send(event);
    }
}
