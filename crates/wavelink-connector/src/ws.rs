//! Production WebSocket dialer
//!
//! One dial is one upgrade handshake: resolve the host, open the socket,
//! present the credential as `Authorization: Bearer <credential>` on the
//! upgrade request, and await the server's acceptance. Frames are forwarded
//! verbatim in both directions; control frames are handled by the library.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

use wavelink_core::{ConnectError, TransportError, TransportMessage};

use crate::dialer::{Dialer, SignalSocket};

// ----------------------------------------------------------------------------
// WebSocket Dialer
// ----------------------------------------------------------------------------

/// Dialer over `tokio-tungstenite`
#[derive(Debug, Default)]
pub struct WsDialer;

impl WsDialer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dialer for WsDialer {
    async fn dial(
        &self,
        endpoint: &Url,
        credential: &str,
    ) -> Result<Box<dyn SignalSocket>, ConnectError> {
        // Resolve up front so name-resolution failures classify as DNS
        // rather than as a generic transport error.
        let host = endpoint
            .host_str()
            .ok_or_else(|| ConnectError::Dns("endpoint has no host".to_string()))?;
        let port = endpoint.port_or_known_default().unwrap_or(443);
        let mut addresses = tokio::net::lookup_host((host, port))
            .await
            .map_err(|err| ConnectError::Dns(err.to_string()))?;
        if addresses.next().is_none() {
            return Err(ConnectError::Dns(format!("no addresses for {host}")));
        }

        let mut request = endpoint
            .as_str()
            .into_client_request()
            .map_err(classify_connect_error)?;
        let mut bearer = HeaderValue::from_str(&format!("Bearer {credential}"))
            .map_err(|_| ConnectError::Transport("credential is not a valid header value".to_string()))?;
        bearer.set_sensitive(true);
        request.headers_mut().insert(header::AUTHORIZATION, bearer);

        let (stream, response) = connect_async(request)
            .await
            .map_err(classify_connect_error)?;
        debug!(status = response.status().as_u16(), "websocket upgrade accepted");

        Ok(Box::new(WsSocket { inner: stream }))
    }
}

/// Map a handshake-phase tungstenite error onto the connect taxonomy.
///
/// The retryable class stays narrow: only a reset while the upgrade was in
/// flight qualifies.
fn classify_connect_error(err: WsError) -> ConnectError {
    match err {
        WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            ConnectError::HandshakeReset("connection reset without closing handshake".to_string())
        }
        WsError::Io(io)
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted
            ) =>
        {
            ConnectError::HandshakeReset(io.to_string())
        }
        WsError::Tls(tls) => ConnectError::Tls(tls.to_string()),
        WsError::Http(response) => {
            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                ConnectError::AuthRejected {
                    status: status.as_u16(),
                }
            } else {
                ConnectError::Rejected {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("").to_string(),
                }
            }
        }
        other => ConnectError::Transport(other.to_string()),
    }
}

// ----------------------------------------------------------------------------
// WebSocket Socket
// ----------------------------------------------------------------------------

struct WsSocket {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl SignalSocket for WsSocket {
    async fn send(&mut self, message: TransportMessage) -> Result<(), TransportError> {
        let frame = match message {
            TransportMessage::Text(text) => Message::Text(text),
            TransportMessage::Binary(bytes) => Message::Binary(bytes),
        };
        self.inner.send(frame).await.map_err(classify_stream_error)
    }

    async fn recv(&mut self) -> Option<Result<TransportMessage, TransportError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(TransportMessage::Text(text))),
                Ok(Message::Binary(bytes)) => return Some(Ok(TransportMessage::Binary(bytes))),
                // Ping/pong are answered by tungstenite on the next flush.
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => continue,
                Ok(Message::Close(frame)) => {
                    return match frame {
                        Some(frame)
                            if frame.code != CloseCode::Normal && frame.code != CloseCode::Away =>
                        {
                            Some(Err(TransportError::AbnormalClose {
                                code: u16::from(frame.code),
                                reason: frame.reason.into_owned(),
                            }))
                        }
                        _ => None,
                    };
                }
                Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => return None,
                Err(err) => return Some(Err(classify_stream_error(err))),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.inner.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(err) => Err(classify_stream_error(err)),
        }
    }
}

/// Map a mid-stream tungstenite error onto the transport taxonomy
fn classify_stream_error(err: WsError) -> TransportError {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::ConnectionClosed,
        WsError::Io(io) => TransportError::Io(io.to_string()),
        WsError::Protocol(protocol) => TransportError::Protocol(protocol.to_string()),
        other => TransportError::Io(other.to_string()),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
