//! Retry-loop behavior of the resilient connector
//!
//! All tests run on a paused tokio clock, so backoff sleeps auto-advance and
//! inter-attempt delays can be asserted exactly.

mod common;

use std::time::Duration;

use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use common::{endpoint, mock_socket, DialOutcome, ScriptedDialer};
use wavelink_connector::ResilientConnector;
use wavelink_core::{ConnectError, RetryPolicy};

const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

fn reset() -> ConnectError {
    ConnectError::HandshakeReset("connection reset without closing handshake".into())
}

fn delays(times: &[tokio::time::Instant]) -> Vec<Duration> {
    times.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

#[tokio::test(start_paused = true)]
async fn retryable_failures_exhaust_attempts() {
    let dialer = ScriptedDialer::new(vec![
        DialOutcome::Fail(reset()),
        DialOutcome::Fail(reset()),
        DialOutcome::Fail(reset()),
    ]);
    let connector = ResilientConnector::with_dialer(dialer);
    let policy = RetryPolicy::new(Duration::from_millis(200), Duration::from_secs(1), 3);

    let result = connector
        .connect(
            &endpoint(),
            "token",
            ATTEMPT_TIMEOUT,
            &policy,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.unwrap_err(), reset());

    let dialer = connector.dialer();
    assert_eq!(dialer.attempts(), 3);
    assert_eq!(
        delays(&dialer.attempt_times()),
        vec![Duration::from_millis(200), Duration::from_millis(400)]
    );
}

#[tokio::test(start_paused = true)]
async fn fourth_attempt_succeeds_after_capped_backoff() {
    let (socket, _handle) = mock_socket();
    let dialer = ScriptedDialer::new(vec![
        DialOutcome::Fail(reset()),
        DialOutcome::Fail(reset()),
        DialOutcome::Fail(reset()),
        DialOutcome::Succeed(socket),
    ]);
    let connector = ResilientConnector::with_dialer(dialer);
    let policy = RetryPolicy::new(Duration::from_millis(200), Duration::from_secs(1), 4);

    let connection = assert_ok!(
        connector
            .connect(
                &endpoint(),
                "token",
                ATTEMPT_TIMEOUT,
                &policy,
                &CancellationToken::new(),
            )
            .await
    );

    let dialer = connector.dialer();
    assert_eq!(dialer.attempts(), 4);
    assert_eq!(
        delays(&dialer.attempt_times()),
        vec![
            Duration::from_millis(200),
            Duration::from_millis(400),
            Duration::from_millis(800),
        ]
    );

    connection.close().await;
}

#[tokio::test(start_paused = true)]
async fn terminal_failure_short_circuits() {
    let dialer = ScriptedDialer::new(vec![DialOutcome::Fail(ConnectError::AuthRejected {
        status: 401,
    })]);
    let connector = ResilientConnector::with_dialer(dialer);
    let policy = RetryPolicy::new(Duration::from_millis(200), Duration::from_secs(1), 5);

    let result = connector
        .connect(
            &endpoint(),
            "bad-token",
            ATTEMPT_TIMEOUT,
            &policy,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.unwrap_err(), ConnectError::AuthRejected { status: 401 });
    assert_eq!(connector.dialer().attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_backoff_stops_retrying() {
    let (socket, _handle) = mock_socket();
    let dialer = ScriptedDialer::new(vec![
        DialOutcome::Fail(reset()),
        DialOutcome::Succeed(socket),
    ]);
    let connector = std::sync::Arc::new(ResilientConnector::with_dialer(dialer));
    let policy = RetryPolicy::new(Duration::from_secs(2), Duration::from_secs(10), 3);
    let cancel = CancellationToken::new();

    let task = tokio::spawn({
        let connector = std::sync::Arc::clone(&connector);
        let cancel = cancel.clone();
        async move {
            connector
                .connect(&endpoint(), "token", ATTEMPT_TIMEOUT, &policy, &cancel)
                .await
        }
    });

    // Let the first attempt fail and the backoff sleep begin, then cancel
    // before the paused clock is allowed to advance.
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    cancel.cancel();

    let result = task.await.unwrap();
    assert_eq!(result.unwrap_err(), ConnectError::Cancelled);
    assert_eq!(connector.dialer().attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_attempt_times_out_and_retries() {
    let (socket, _handle) = mock_socket();
    let dialer = ScriptedDialer::new(vec![DialOutcome::Hang, DialOutcome::Succeed(socket)]);
    let connector = ResilientConnector::with_dialer(dialer);
    let policy = RetryPolicy::new(Duration::from_millis(100), Duration::from_secs(1), 2);

    let connection = assert_ok!(
        connector
            .connect(
                &endpoint(),
                "token",
                ATTEMPT_TIMEOUT,
                &policy,
                &CancellationToken::new(),
            )
            .await
    );

    let dialer = connector.dialer();
    assert_eq!(dialer.attempts(), 2);
    // One timed-out attempt plus one backoff delay.
    assert_eq!(
        delays(&dialer.attempt_times()),
        vec![ATTEMPT_TIMEOUT + Duration::from_millis(100)]
    );

    connection.close().await;
}

#[tokio::test(start_paused = true)]
async fn pre_cancelled_connect_makes_no_attempt() {
    let dialer = ScriptedDialer::new(vec![DialOutcome::Hang]);
    let connector = ResilientConnector::with_dialer(dialer);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = connector
        .connect(
            &endpoint(),
            "token",
            ATTEMPT_TIMEOUT,
            &RetryPolicy::default(),
            &cancel,
        )
        .await;

    assert_eq!(result.unwrap_err(), ConnectError::Cancelled);
    assert_eq!(connector.dialer().attempts(), 0);
}
