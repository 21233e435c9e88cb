//! Monitor configuration

use core::time::Duration;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Monitor Configuration
// ----------------------------------------------------------------------------

/// Configuration for the connectivity monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// How long a reachability drop may last and still count as a network
    /// switch when the path recovers
    pub debounce_window: Duration,
    /// Buffer size of the subscriber event channel; slow subscribers that
    /// fall further behind than this miss intermediate events
    pub event_buffer: usize,
    /// Buffer size of the inbound snapshot channel, applied by
    /// `ChannelPathSource::from_config`
    pub snapshot_buffer: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // Reference tuning; empirical, kept configurable on purpose.
            debounce_window: Duration::from_secs(3),
            event_buffer: 64,
            snapshot_buffer: 32,
        }
    }
}
