//! Bounded retry loop around a dialer
//!
//! Only establishment is retried. The per-attempt timeout is decoupled from
//! the retry budget so one slow attempt cannot consume the whole
//! reconnection window; the worst case is bounded by
//! `max_attempts * (timeout + max_delay)`, which callers can apply as an
//! outer deadline if they need one.

use core::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use wavelink_core::{ConnectError, RetryPolicy};

use crate::connection::Connection;
use crate::dialer::Dialer;
use crate::ws::WsDialer;

// ----------------------------------------------------------------------------
// Resilient Connector
// ----------------------------------------------------------------------------

/// Connector that retries transient handshake failures with capped
/// exponential backoff
pub struct ResilientConnector<D: Dialer> {
    dialer: D,
}

impl ResilientConnector<WsDialer> {
    /// Connector over the production WebSocket dialer
    pub fn websocket() -> Self {
        Self::with_dialer(WsDialer::new())
    }
}

impl Default for ResilientConnector<WsDialer> {
    fn default() -> Self {
        Self::websocket()
    }
}

impl<D: Dialer> ResilientConnector<D> {
    /// Connector over a custom dialer (tests, alternative transports)
    pub fn with_dialer(dialer: D) -> Self {
        Self { dialer }
    }

    /// The underlying dialer
    pub fn dialer(&self) -> &D {
        &self.dialer
    }

    /// Establish a connection, retrying per `policy` on transient failures.
    ///
    /// `timeout` bounds a single attempt, not the whole operation. Terminal
    /// failures (auth rejection, DNS, TLS, explicit server rejection) abort
    /// immediately without consuming further attempts; on exhaustion the
    /// last observed error is returned. Cancellation is honored at every
    /// suspension point, including the backoff sleep, and never triggers
    /// another attempt.
    pub async fn connect(
        &self,
        endpoint: &Url,
        credential: &str,
        timeout: Duration,
        policy: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Connection, ConnectError> {
        let max_attempts = policy.max_attempts.max(1);
        let mut last_error: Option<ConnectError> = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let delay = policy.delay(attempt - 1);
                debug!(attempt, ?delay, "backing off before next connect attempt");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(ConnectError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ConnectError::Cancelled),
                dialed = tokio::time::timeout(timeout, self.dialer.dial(endpoint, credential)) => {
                    match dialed {
                        Ok(inner) => inner,
                        Err(_) => Err(ConnectError::AttemptTimeout(timeout)),
                    }
                }
            };

            match result {
                Ok(socket) => {
                    info!(%endpoint, attempt, "signaling connection established");
                    return Ok(Connection::open(socket));
                }
                Err(err) if err.is_retryable() => {
                    warn!(%endpoint, attempt, %err, "transient connect failure");
                    last_error = Some(err);
                }
                Err(err) => {
                    warn!(%endpoint, attempt, %err, "terminal connect failure");
                    return Err(err);
                }
            }
        }

        // Only reachable after at least one retryable failure.
        Err(last_error.unwrap_or(ConnectError::Cancelled))
    }
}
