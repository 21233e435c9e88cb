//! Capped exponential backoff policy for connect retries

use core::time::Duration;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Retry Policy
// ----------------------------------------------------------------------------

/// Bounded retry schedule with capped exponential backoff.
///
/// The delay before retry `attempt` (zero-based) is
/// `min(max_delay, base_delay * 2^attempt)`. With jitter enabled the delay
/// is shortened by a random fraction, so it never exceeds the cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on any single inter-attempt delay
    pub max_delay: Duration,
    /// Total connect attempts, including the first (always >= 1)
    pub max_attempts: u32,
    /// Randomize delays downward to avoid synchronized reconnect storms
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // Reference tuning; empirical, kept configurable on purpose.
        Self {
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_secs(7),
            max_attempts: 3,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given bounds. `max_attempts` is clamped to
    /// at least one so a connector always makes the initial attempt.
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts: max_attempts.max(1),
            jitter: false,
        }
    }

    /// Enable downward jitter on the computed delays
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Delay to sleep after the failed attempt with the given zero-based index
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = self.backoff(attempt);
        if self.jitter {
            // Shorten by up to 25%; the cap is never exceeded.
            use rand::Rng;
            let factor = 1.0 - rand::thread_rng().gen_range(0.0..0.25);
            delay.mul_f64(factor)
        } else {
            delay
        }
    }

    /// Deterministic backoff curve without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(30);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
