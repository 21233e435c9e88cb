//! Path source seam
//!
//! The monitor observes network paths through this trait so that platform
//! glue (netlink, `NWPathMonitor` bridges, ...) stays outside the crate and
//! tests can script snapshot sequences.

use async_trait::async_trait;
use tokio::sync::mpsc;

use wavelink_core::NetworkPathSnapshot;

use crate::config::MonitorConfig;

// ----------------------------------------------------------------------------
// Path Source Trait
// ----------------------------------------------------------------------------

/// Provider of raw network path updates.
///
/// Implementations must deliver snapshots in the order observed; the monitor
/// preserves that total order when processing them. Dropping the returned
/// receiver stops the watch.
#[async_trait]
pub trait PathSource: Send + 'static {
    /// Begin watching and return the ordered snapshot stream
    async fn watch(&mut self) -> mpsc::Receiver<NetworkPathSnapshot>;
}

// ----------------------------------------------------------------------------
// Channel Source
// ----------------------------------------------------------------------------

/// Path source fed manually through a channel sender.
///
/// Used by platform bridges that receive path callbacks from foreign APIs,
/// and by tests that script snapshot sequences.
pub struct ChannelPathSource {
    rx: Option<mpsc::Receiver<NetworkPathSnapshot>>,
    tx: mpsc::Sender<NetworkPathSnapshot>,
}

impl ChannelPathSource {
    /// Create a source with the given snapshot buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self { rx: Some(rx), tx }
    }

    /// Create a source sized by the monitor's configured snapshot buffer
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.snapshot_buffer)
    }

    /// Sender half used to feed snapshots into the monitor
    pub fn sender(&self) -> mpsc::Sender<NetworkPathSnapshot> {
        self.tx.clone()
    }
}

#[async_trait]
impl PathSource for ChannelPathSource {
    async fn watch(&mut self) -> mpsc::Receiver<NetworkPathSnapshot> {
        self.rx.take().unwrap_or_else(|| {
            // A second watch gets a stream that ends immediately.
            let (_tx, rx) = mpsc::channel(1);
            rx
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
