//! Lifecycle and message-stream behavior of an established connection

mod common;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::{endpoint, mock_socket, mock_socket_with_send_error, DialOutcome, MockSocket, ScriptedDialer};
use wavelink_connector::{Connection, ConnectionState, ResilientConnector};
use wavelink_core::{RetryPolicy, TransportError, TransportMessage};

async fn open_connection(socket: MockSocket) -> Connection {
    let connector =
        ResilientConnector::with_dialer(ScriptedDialer::new(vec![DialOutcome::Succeed(socket)]));
    connector
        .connect(
            &endpoint(),
            "token",
            Duration::from_secs(5),
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await
        .expect("scripted dial succeeds")
}

fn text(body: &str) -> TransportMessage {
    TransportMessage::Text(body.to_string())
}

#[tokio::test]
async fn messages_arrive_in_transport_order() {
    let (socket, handle) = mock_socket();
    let mut connection = open_connection(socket).await;
    let mut stream = connection.messages();

    for body in ["alpha", "beta", "gamma"] {
        handle.inbound.send(Ok(text(body))).unwrap();
    }

    assert_eq!(stream.next_message().await.unwrap().unwrap(), text("alpha"));
    assert_eq!(stream.next_message().await.unwrap().unwrap(), text("beta"));
    assert_eq!(stream.next_message().await.unwrap().unwrap(), text("gamma"));

    connection.close().await;
}

#[tokio::test]
async fn sent_messages_reach_the_socket() {
    let (socket, handle) = mock_socket();
    let connection = open_connection(socket).await;

    connection.send(text("offer")).await.unwrap();
    connection
        .send(TransportMessage::Binary(vec![0x01, 0x02]))
        .await
        .unwrap();

    assert_eq!(
        handle.sent_messages(),
        vec![text("offer"), TransportMessage::Binary(vec![0x01, 0x02])]
    );

    connection.close().await;
}

#[tokio::test]
async fn close_is_idempotent_and_releases_the_socket() {
    let (socket, handle) = mock_socket();
    let connection = open_connection(socket).await;

    connection.close().await;
    assert_eq!(connection.state(), ConnectionState::Closed);
    assert!(handle.is_closed());

    // A second close is a no-op.
    connection.close().await;
    assert_eq!(connection.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn send_after_close_fails() {
    let (socket, _handle) = mock_socket();
    let connection = open_connection(socket).await;

    connection.close().await;

    assert_eq!(
        connection.send(text("late")).await.unwrap_err(),
        TransportError::ConnectionClosed
    );
}

#[tokio::test]
async fn send_failure_marks_the_connection_failed() {
    let (socket, _handle) =
        mock_socket_with_send_error(Some(TransportError::Io("broken pipe".to_string())));
    let mut connection = open_connection(socket).await;
    let mut stream = connection.messages();

    assert_eq!(
        connection.send(text("doomed")).await.unwrap_err(),
        TransportError::Io("broken pipe".to_string())
    );

    // The failure is also surfaced on the stream, which then ends.
    assert_eq!(
        stream.next_message().await.unwrap().unwrap_err(),
        TransportError::Io("broken pipe".to_string())
    );
    assert!(stream.next_message().await.is_none());
    assert_eq!(connection.state(), ConnectionState::Failed);
}

#[tokio::test]
async fn transport_failure_yields_error_then_end() {
    let (socket, handle) = mock_socket();
    let mut connection = open_connection(socket).await;
    let mut stream = connection.messages();

    handle.inbound.send(Ok(text("last-good"))).unwrap();
    handle
        .inbound
        .send(Err(TransportError::Protocol("bad frame".to_string())))
        .unwrap();

    assert_eq!(stream.next_message().await.unwrap().unwrap(), text("last-good"));
    assert_eq!(
        stream.next_message().await.unwrap().unwrap_err(),
        TransportError::Protocol("bad frame".to_string())
    );
    assert!(stream.next_message().await.is_none());
    assert_eq!(connection.state(), ConnectionState::Failed);
}

#[tokio::test]
async fn remote_clean_close_ends_the_stream() {
    let (socket, handle) = mock_socket();
    let mut connection = open_connection(socket).await;
    let mut stream = connection.messages();

    handle.inbound.send(Ok(text("goodbye"))).unwrap();
    drop(handle);

    assert_eq!(stream.next_message().await.unwrap().unwrap(), text("goodbye"));
    assert!(stream.next_message().await.is_none());
    assert_eq!(connection.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn message_stream_is_single_consumer() {
    let (socket, handle) = mock_socket();
    let mut connection = open_connection(socket).await;
    let mut stream = connection.messages();

    // A second take yields an already-exhausted stream, and dropping it
    // must not tear down the live one.
    let mut second = connection.messages();
    assert!(second.next_message().await.is_none());
    drop(second);

    handle.inbound.send(Ok(text("still-live"))).unwrap();
    assert_eq!(stream.next_message().await.unwrap().unwrap(), text("still-live"));

    connection.close().await;
}

#[tokio::test]
async fn cancelling_the_stream_closes_the_connection() {
    let (socket, handle) = mock_socket();
    let mut connection = open_connection(socket).await;
    let mut stream = connection.messages();

    stream.cancel();

    assert!(stream.next_message().await.is_none());
    connection.close().await;
    assert_eq!(connection.state(), ConnectionState::Closed);
    assert!(handle.is_closed());
}

#[tokio::test]
async fn dropping_the_stream_closes_the_connection() {
    let (socket, handle) = mock_socket();
    let mut connection = open_connection(socket).await;

    drop(connection.messages());

    connection.close().await;
    assert_eq!(connection.state(), ConnectionState::Closed);
    assert!(handle.is_closed());
}
