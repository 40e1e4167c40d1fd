//! Transport abstraction layer for Roomchat.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the single duplex connection a chat client keeps open to its server,
//! plus the [`TransportEvent`] vocabulary the client's dispatch loop
//! consumes.
//!
//! The transport knows nothing about rooms or usernames. It moves whole
//! text frames in both directions and reports lifecycle changes.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Opaque identifier for a connection.
///
/// Only used to correlate log lines; a client normally holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle and data events surfaced by a connection.
///
/// A failed connect is reported as `Error` followed by `Closed`, never as
/// a panic, so the consumer can log and carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection reached the open state; frames may now be sent.
    Open,
    /// One complete text frame arrived from the server.
    Frame(String),
    /// Something went wrong. The string is human-readable detail.
    Error(String),
    /// The connection is gone. No further events follow.
    Closed,
}

impl TransportEvent {
    /// Maps the result of [`Connection::recv`] onto the event vocabulary.
    ///
    /// `Ok(None)` (clean close) becomes `Closed`, an error becomes
    /// `Error` with the error's display text.
    pub fn from_recv<E: fmt::Display>(result: Result<Option<String>, E>) -> Self {
        match result {
            Ok(Some(frame)) => Self::Frame(frame),
            Ok(None) => Self::Closed,
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

/// Establishes outgoing connections to a chat endpoint.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Opens one duplex connection to `url`.
    async fn connect(&self, url: &str) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive text frames.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the server.
    async fn send(&self, frame: &str) -> Result<(), Self::Error>;

    /// Receives the next frame from the server.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    /// Implementations must be cancel-safe: the dispatch loop races this
    /// against user commands inside `tokio::select!`.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_event_from_recv_frame() {
        let result: Result<Option<String>, TransportError> =
            Ok(Some("{\"username\":\"bob\"}".into()));
        assert_eq!(
            TransportEvent::from_recv(result),
            TransportEvent::Frame("{\"username\":\"bob\"}".into())
        );
    }

    #[test]
    fn test_event_from_recv_clean_close_is_closed() {
        let result: Result<Option<String>, TransportError> = Ok(None);
        assert_eq!(TransportEvent::from_recv(result), TransportEvent::Closed);
    }

    #[test]
    fn test_event_from_recv_error_carries_details() {
        let result: Result<Option<String>, TransportError> =
            Err(TransportError::ConnectionClosed("reset by peer".into()));
        match TransportEvent::from_recv(result) {
            TransportEvent::Error(details) => {
                assert!(details.contains("reset by peer"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }
}
