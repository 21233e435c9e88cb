//! Scripted dialer and socket doubles shared by the connector tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use wavelink_connector::{Dialer, SignalSocket};
use wavelink_core::{ConnectError, TransportError, TransportMessage};

// ----------------------------------------------------------------------------
// Mock Socket
// ----------------------------------------------------------------------------

pub struct MockSocket {
    inbound: mpsc::UnboundedReceiver<Result<TransportMessage, TransportError>>,
    sent: Arc<Mutex<Vec<TransportMessage>>>,
    closed: Arc<AtomicBool>,
    send_error: Option<TransportError>,
}

/// Test-side handle to a mock socket owned by a connection pump
#[derive(Clone)]
pub struct MockSocketHandle {
    pub inbound: mpsc::UnboundedSender<Result<TransportMessage, TransportError>>,
    pub sent: Arc<Mutex<Vec<TransportMessage>>>,
    pub closed: Arc<AtomicBool>,
}

impl MockSocketHandle {
    pub fn sent_messages(&self) -> Vec<TransportMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

pub fn mock_socket() -> (MockSocket, MockSocketHandle) {
    mock_socket_with_send_error(None)
}

pub fn mock_socket_with_send_error(
    send_error: Option<TransportError>,
) -> (MockSocket, MockSocketHandle) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let closed = Arc::new(AtomicBool::new(false));
    let socket = MockSocket {
        inbound: inbound_rx,
        sent: Arc::clone(&sent),
        closed: Arc::clone(&closed),
        send_error,
    };
    let handle = MockSocketHandle {
        inbound: inbound_tx,
        sent,
        closed,
    };
    (socket, handle)
}

#[async_trait]
impl SignalSocket for MockSocket {
    async fn send(&mut self, message: TransportMessage) -> Result<(), TransportError> {
        if let Some(err) = &self.send_error {
            return Err(err.clone());
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<TransportMessage, TransportError>> {
        self.inbound.recv().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::Release);
        self.inbound.close();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Scripted Dialer
// ----------------------------------------------------------------------------

pub enum DialOutcome {
    /// Fail the attempt with the given error
    Fail(ConnectError),
    /// Hand the pre-built socket to the connection
    Succeed(MockSocket),
    /// Never complete (exercises the per-attempt timeout)
    Hang,
}

/// Dialer that replays a script of attempt outcomes and records timing
pub struct ScriptedDialer {
    outcomes: Mutex<VecDeque<DialOutcome>>,
    attempts: AtomicU32,
    attempt_times: Mutex<Vec<tokio::time::Instant>>,
}

impl ScriptedDialer {
    pub fn new(outcomes: Vec<DialOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            attempts: AtomicU32::new(0),
            attempt_times: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Paused-clock timestamps of each attempt start
    pub fn attempt_times(&self) -> Vec<tokio::time::Instant> {
        self.attempt_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dialer for ScriptedDialer {
    async fn dial(
        &self,
        _endpoint: &Url,
        _credential: &str,
    ) -> Result<Box<dyn SignalSocket>, ConnectError> {
        self.attempts.fetch_add(1, Ordering::AcqRel);
        self.attempt_times
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(DialOutcome::Fail(err)) => Err(err),
            Some(DialOutcome::Succeed(socket)) => Ok(Box::new(socket)),
            Some(DialOutcome::Hang) | None => std::future::pending().await,
        }
    }
}

pub fn endpoint() -> Url {
    Url::parse("wss://signal.example.com/rtc").unwrap()
}
