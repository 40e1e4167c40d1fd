//! `RoomchatClient` builder, configuration, and the handle users drive it
//! through.
//!
//! This is the entry point for running a chat client. It ties together
//! all the layers: transport → protocol → session → view.

use roomchat_protocol::{Codec, FieldSet, JsonCodec};
use roomchat_session::{
    RoomSessionController, SessionConfig, TransitionPolicy, View,
};
use roomchat_transport::{Transport, TransportError, WebSocketTransport};
use tokio::sync::mpsc;

use crate::dispatch::run_dispatch;
use crate::RoomchatError;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8080/ws";

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Join `room` as `username`.
    Join { room: String, username: String },
    /// Leave the current room.
    Leave,
    /// Post `text` as `username`.
    SendMessage { text: String, username: String },
    /// Close the connection and stop the client.
    Disconnect,
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Everything the client needs to know before it connects.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The `ws://` or `wss://` URL of the chat server.
    pub endpoint: String,
    /// Room sentinel, transition policy, send strictness.
    pub session: SessionConfig,
    /// Optional fields on outgoing frames.
    pub fields: FieldSet,
    /// How many user commands may queue before `ClientHandle` calls wait.
    pub command_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            session: SessionConfig::default(),
            fields: FieldSet::default(),
            command_capacity: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a Roomchat client.
///
/// # Example
///
/// ```rust,no_run
/// use roomchat::prelude::*;
///
/// # async fn demo() {
/// let client = RoomchatClient::builder()
///     .endpoint("ws://127.0.0.1:8080/ws")
///     .transition_policy(TransitionPolicy::Confirmed)
///     .build(RecordingView::default());
///
/// let (handle, commands) = client.command_channel();
/// tokio::spawn(async move {
///     let _ = handle.join("lobby", "alice").await;
/// });
/// let exit = client.run(commands).await;
/// println!("stopped: {:?}", exit.reason);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoomchatClientBuilder {
    config: ClientConfig,
}

impl RoomchatClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing config.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Sets the server URL.
    pub fn endpoint(mut self, url: &str) -> Self {
        self.config.endpoint = url.to_string();
        self
    }

    /// Replaces the whole session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    pub fn transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.config.session.transition_policy = policy;
        self
    }

    /// Sets the "no room" sentinel.
    pub fn default_room(mut self, room: &str) -> Self {
        self.config.session.default_room = room.to_string();
        self
    }

    /// Refuse to send messages while not in a room.
    pub fn require_joined_for_send(mut self, strict: bool) -> Self {
        self.config.session.require_joined_for_send = strict;
        self
    }

    /// Sets which optional fields go onto outgoing frames.
    pub fn fields(mut self, fields: FieldSet) -> Self {
        self.config.fields = fields;
        self
    }

    pub fn command_capacity(mut self, capacity: usize) -> Self {
        // mpsc::channel panics on zero.
        self.config.command_capacity = capacity.max(1);
        self
    }

    /// Builds a WebSocket client that renders into `view`.
    pub fn build<V: View>(
        self,
        view: V,
    ) -> RoomchatClient<WebSocketTransport, JsonCodec, V> {
        self.build_with_transport(WebSocketTransport, view)
    }

    /// Builds a client over a custom transport.
    pub fn build_with_transport<T, V>(
        self,
        transport: T,
        view: V,
    ) -> RoomchatClient<T, JsonCodec, V>
    where
        T: Transport<Error = TransportError>,
        V: View,
    {
        let codec = JsonCodec::new(self.config.fields);
        RoomchatClient {
            transport,
            codec,
            endpoint: self.config.endpoint,
            command_capacity: self.config.command_capacity,
            controller: RoomSessionController::new(self.config.session, view),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomchatClient
// ---------------------------------------------------------------------------

/// Why [`RoomchatClient::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The connection never opened.
    ConnectFailed(String),
    /// The server closed the connection.
    ServerClosed,
    /// Sending or receiving failed mid-session.
    TransportError(String),
    /// A [`UserCommand::Disconnect`] was processed.
    UserDisconnected,
    /// Every [`ClientHandle`] was dropped.
    CommandsClosed,
}

/// What's left when the client stops: the final session/view state and why.
pub struct ClientExit<V: View> {
    pub controller: RoomSessionController<V>,
    pub reason: ExitReason,
}

/// A configured, not-yet-running chat client.
///
/// Call [`run()`](Self::run) to connect and start processing events.
pub struct RoomchatClient<T, C, V>
where
    T: Transport<Error = TransportError>,
    C: Codec,
    V: View,
{
    pub(crate) transport: T,
    pub(crate) codec: C,
    pub(crate) endpoint: String,
    pub(crate) command_capacity: usize,
    pub(crate) controller: RoomSessionController<V>,
}

impl RoomchatClient<WebSocketTransport, JsonCodec, roomchat_session::RecordingView> {
    /// Creates a new builder.
    pub fn builder() -> RoomchatClientBuilder {
        RoomchatClientBuilder::new()
    }
}

impl<T, C, V> RoomchatClient<T, C, V>
where
    T: Transport<Error = TransportError>,
    T::Connection: roomchat_transport::Connection<Error = TransportError>,
    C: Codec,
    V: View,
{
    /// The URL this client will dial.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The controller, for inspecting state before `run`.
    pub fn controller(&self) -> &RoomSessionController<V> {
        &self.controller
    }

    /// Creates a bounded command channel sized from the config.
    pub fn command_channel(&self) -> (ClientHandle, mpsc::Receiver<UserCommand>) {
        ClientHandle::channel(self.command_capacity)
    }

    /// Connects and processes user commands and server frames, strictly
    /// one at a time, until the connection or the command channel ends.
    ///
    /// Connection failures don't surface as an `Err`: they are fed to the
    /// controller as error and close events, and show up in
    /// [`ClientExit::reason`].
    pub async fn run(self, commands: mpsc::Receiver<UserCommand>) -> ClientExit<V> {
        let Self {
            transport,
            codec,
            endpoint,
            mut controller,
            ..
        } = self;
        tracing::info!(%endpoint, "Roomchat client starting");
        let reason =
            run_dispatch(&transport, &endpoint, &codec, &mut controller, commands)
                .await;
        tracing::info!(?reason, "Roomchat client stopped");
        ClientExit { controller, reason }
    }
}

// ---------------------------------------------------------------------------
// ClientHandle
// ---------------------------------------------------------------------------

/// A cheap, cloneable way to issue [`UserCommand`]s to a running client.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    tx: mpsc::Sender<UserCommand>,
}

impl ClientHandle {
    /// Creates a handle and the receiver to pass to [`RoomchatClient::run`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<UserCommand>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queues any command.
    ///
    /// # Errors
    /// [`RoomchatError::ClientStopped`] if the client has exited.
    pub async fn send(&self, command: UserCommand) -> Result<(), RoomchatError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| RoomchatError::ClientStopped)
    }

    pub async fn join(&self, room: &str, username: &str) -> Result<(), RoomchatError> {
        self.send(UserCommand::Join {
            room: room.to_string(),
            username: username.to_string(),
        })
        .await
    }

    pub async fn leave(&self) -> Result<(), RoomchatError> {
        self.send(UserCommand::Leave).await
    }

    pub async fn send_message(
        &self,
        text: &str,
        username: &str,
    ) -> Result<(), RoomchatError> {
        self.send(UserCommand::SendMessage {
            text: text.to_string(),
            username: username.to_string(),
        })
        .await
    }

    pub async fn disconnect(&self) -> Result<(), RoomchatError> {
        self.send(UserCommand::Disconnect).await
    }

    /// `true` once the client has stopped listening.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
