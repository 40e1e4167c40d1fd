//! # Roomchat
//!
//! Client-side runtime for room-based chat over a single duplex connection.
//!
//! A client keeps one connection to a chat server, sits in at most one
//! room at a time, and renders what the server sends into a [`View`] you
//! provide. The layers underneath are usable on their own:
//!
//! - [`roomchat_transport`]: the connection
//! - [`roomchat_protocol`]: JSON frames in and out
//! - [`roomchat_session`]: the room-membership state machine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomchat::prelude::*;
//!
//! # async fn demo() {
//! let client = RoomchatClient::builder()
//!     .endpoint("ws://127.0.0.1:8080/ws")
//!     .build(RecordingView::default());
//!
//! let (handle, commands) = client.command_channel();
//! let driver = async move {
//!     handle.join("lobby", "alice").await?;
//!     handle.send_message("hello", "alice").await?;
//!     handle.disconnect().await
//! };
//! let (exit, _) = tokio::join!(client.run(commands), driver);
//! assert_eq!(exit.reason, ExitReason::UserDisconnected);
//! # }
//! ```
//!
//! [`View`]: roomchat_session::View

mod client;
mod dispatch;
mod error;

pub use client::{
    ClientConfig, ClientExit, ClientHandle, DEFAULT_ENDPOINT, ExitReason,
    RoomchatClient, RoomchatClientBuilder, UserCommand,
};
pub use error::RoomchatError;

pub use roomchat_protocol;
pub use roomchat_session;
pub use roomchat_transport;

/// Everything a typical client needs, in one import.
pub mod prelude {
    pub use crate::{
        ClientConfig, ClientExit, ClientHandle, ExitReason, RoomchatClient,
        RoomchatClientBuilder, RoomchatError, UserCommand,
    };
    pub use roomchat_protocol::{
        Codec, FieldSet, IncomingEvent, JsonCodec, NoticeKind, OutgoingIntent,
    };
    pub use roomchat_session::{
        Affordance, ConnectionState, Membership, MessageClass, RecordingView,
        RenderedMessage, RoomSessionController, Session, SessionConfig,
        SessionError, SessionPhase, TransitionPolicy, View,
    };
    pub use roomchat_transport::{
        Connection, Transport, TransportError, WebSocketTransport,
    };
}
