//! Live signaling connection
//!
//! A `Connection` owns exactly one socket through a pump task. The pump
//! serializes writes, forwards received frames in order, and is the only
//! place the socket is touched, which makes close idempotent and teardown
//! race-free. Lifecycle: `Connecting → Open → {Closing → Closed, Failed}`;
//! `Closed` and `Failed` are terminal, migration is always a new connect.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use futures::Stream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use wavelink_core::{TransportError, TransportMessage};

use crate::dialer::SignalSocket;

// ----------------------------------------------------------------------------
// Connection State
// ----------------------------------------------------------------------------

/// Observable lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
    Failed,
}

/// Atomic state cell; terminal states are never left.
#[derive(Debug)]
struct StateCell(AtomicU8);

impl StateCell {
    fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    fn get(&self) -> ConnectionState {
        match self.0.load(Ordering::Acquire) {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::Closing,
            3 => ConnectionState::Closed,
            _ => ConnectionState::Failed,
        }
    }

    fn advance(&self, next: ConnectionState) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                match current {
                    // Closed (3) and Failed (4) are terminal.
                    3 | 4 => None,
                    _ => Some(next as u8),
                }
            });
    }
}

// ----------------------------------------------------------------------------
// Connection
// ----------------------------------------------------------------------------

type Inbound = Result<TransportMessage, TransportError>;
type Outbound = (TransportMessage, oneshot::Sender<Result<(), TransportError>>);

/// Buffer applied to inbound frames; bounds memory and backpressures reads.
const INBOUND_BUFFER: usize = 64;
const OUTBOUND_BUFFER: usize = 16;

/// Duplex message connection to a signaling endpoint
#[derive(Debug)]
pub struct Connection {
    outbound_tx: mpsc::Sender<Outbound>,
    incoming: Option<mpsc::Receiver<Inbound>>,
    state: Arc<StateCell>,
    close_token: CancellationToken,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Connection {
    /// Wrap a freshly dialed socket and start its pump task
    pub(crate) fn open(socket: Box<dyn SignalSocket>) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (incoming_tx, incoming_rx) = mpsc::channel(INBOUND_BUFFER);
        let state = Arc::new(StateCell::new(ConnectionState::Connecting));
        let close_token = CancellationToken::new();

        let pump = tokio::spawn(pump_loop(
            socket,
            outbound_rx,
            incoming_tx,
            Arc::clone(&state),
            close_token.clone(),
        ));

        Self {
            outbound_tx,
            incoming: Some(incoming_rx),
            state,
            close_token,
            pump: Mutex::new(Some(pump)),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Send one frame, suspending until it was written to the transport.
    ///
    /// Fails with [`TransportError::ConnectionClosed`] once the connection
    /// is closing, closed, or failed.
    pub async fn send(&self, message: TransportMessage) -> Result<(), TransportError> {
        match self.state.get() {
            ConnectionState::Open | ConnectionState::Connecting => {}
            _ => return Err(TransportError::ConnectionClosed),
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        self.outbound_tx
            .send((message, ack_tx))
            .await
            .map_err(|_| TransportError::ConnectionClosed)?;
        ack_rx.await.map_err(|_| TransportError::ConnectionClosed)?
    }

    /// Take the single-consumer message stream.
    ///
    /// Frames arrive in transport order. The stream ends with `None` after a
    /// clean close, or yields the failure once and then ends. It is not
    /// restartable: a second call returns an already-exhausted stream, and a
    /// new connection requires a new connect.
    pub fn messages(&mut self) -> MessageStream {
        MessageStream {
            rx: self.incoming.take(),
            close_token: self.close_token.clone(),
        }
    }

    /// Close the connection and release the transport. Idempotent; closing
    /// an already closed or failed connection does nothing.
    pub async fn close(&self) {
        self.close_token.cancel();
        let handle = match self.pump.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // The pump notices and tears the socket down in the background.
        self.close_token.cancel();
    }
}

// ----------------------------------------------------------------------------
// Message Stream
// ----------------------------------------------------------------------------

/// Ordered, single-consumer stream of received frames
pub struct MessageStream {
    rx: Option<mpsc::Receiver<Inbound>>,
    close_token: CancellationToken,
}

impl MessageStream {
    /// Receive the next frame; `None` once the connection closed cleanly
    pub async fn next_message(&mut self) -> Option<Result<TransportMessage, TransportError>> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Stop consuming and tear the connection down, equivalent to
    /// `Connection::close` from the consumer side
    pub fn cancel(&self) {
        self.close_token.cancel();
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        // Abandoning consumption closes the connection; an already-exhausted
        // stream (rx taken or drained) holds no claim on the transport.
        if self.rx.is_some() {
            self.close_token.cancel();
        }
    }
}

impl Stream for MessageStream {
    type Item = Result<TransportMessage, TransportError>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        match self.rx.as_mut() {
            Some(rx) => rx.poll_recv(cx),
            None => std::task::Poll::Ready(None),
        }
    }
}

// ----------------------------------------------------------------------------
// Pump Task
// ----------------------------------------------------------------------------

async fn pump_loop(
    mut socket: Box<dyn SignalSocket>,
    mut outbound_rx: mpsc::Receiver<Outbound>,
    incoming_tx: mpsc::Sender<Inbound>,
    state: Arc<StateCell>,
    close_token: CancellationToken,
) {
    state.advance(ConnectionState::Open);

    loop {
        tokio::select! {
            _ = close_token.cancelled() => {
                debug!("closing signaling connection");
                state.advance(ConnectionState::Closing);
                let _ = socket.close().await;
                state.advance(ConnectionState::Closed);
                break;
            }

            outbound = outbound_rx.recv() => match outbound {
                Some((message, ack)) => {
                    let result = tokio::select! {
                        _ = close_token.cancelled() => Err(TransportError::ConnectionClosed),
                        written = socket.send(message) => written,
                    };
                    let failure = result.as_ref().err().cloned();
                    let _ = ack.send(result);
                    match failure {
                        Some(TransportError::ConnectionClosed) => {
                            // Raced by close(); fall through to teardown.
                            state.advance(ConnectionState::Closing);
                            let _ = socket.close().await;
                            state.advance(ConnectionState::Closed);
                            break;
                        }
                        Some(err) => {
                            state.advance(ConnectionState::Failed);
                            let _ = incoming_tx.send(Err(err)).await;
                            break;
                        }
                        None => {}
                    }
                }
                None => {
                    // Connection handle dropped without close(): treat as close.
                    state.advance(ConnectionState::Closing);
                    let _ = socket.close().await;
                    state.advance(ConnectionState::Closed);
                    break;
                }
            },

            inbound = socket.recv() => match inbound {
                Some(Ok(message)) => {
                    // Forward under backpressure, but stay responsive to close.
                    let forwarded = tokio::select! {
                        _ = close_token.cancelled() => Err(()),
                        sent = incoming_tx.send(Ok(message)) => sent.map_err(|_| ()),
                    };
                    if forwarded.is_err() {
                        // Consumer gone or connection closing: tear down.
                        state.advance(ConnectionState::Closing);
                        let _ = socket.close().await;
                        state.advance(ConnectionState::Closed);
                        break;
                    }
                }
                Some(Err(err)) => {
                    debug!(%err, "signaling connection failed");
                    state.advance(ConnectionState::Failed);
                    let _ = incoming_tx.send(Err(err)).await;
                    break;
                }
                None => {
                    debug!("signaling connection closed by peer");
                    state.advance(ConnectionState::Closed);
                    break;
                }
            },
        }
    }
    // Dropping incoming_tx ends the message stream for the consumer.
}
