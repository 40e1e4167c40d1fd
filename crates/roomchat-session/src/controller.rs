//! The room session controller: the client's state machine.
//!
//! Every user intent and every server event passes through here. The
//! controller checks the intent against the current [`Session`], decides
//! what (if anything) to send, applies transitions, and tells the
//! [`View`] what changed.
//!
//! It does no I/O. Intent methods return the [`OutgoingIntent`] to send,
//! or a [`SessionError`] explaining why nothing should go out; the
//! caller owns the codec and the socket.
//!
//! ```text
//!   Disconnected ─connect→ Connecting ─open→ Unjoined ⇄ Joined
//!        ↑                                      │         │
//!        └──────────────────close───────────────┴─────────┘
//! ```

use roomchat_protocol::{IncomingEvent, NoticeKind, OutgoingIntent, SERVER_SENDER};

use crate::view::{joined_header, UNJOINED_HEADER};
use crate::{
    Affordance, ConnectionState, Membership, MessageClass, RenderedMessage,
    Session, SessionConfig, SessionError, TransitionPolicy, View,
};

/// Owns the [`Session`] and drives a [`View`].
///
/// Single-threaded by construction: every method takes `&mut self`, so
/// two handlers can never interleave.
pub struct RoomSessionController<V: View> {
    session: Session,
    config: SessionConfig,
    view: V,
}

impl<V: View> RoomSessionController<V> {
    /// Creates an idle controller. The view is not touched until the
    /// connection opens.
    pub fn new(config: SessionConfig, view: V) -> Self {
        Self {
            session: Session::new(config.default_room.clone()),
            config,
            view,
        }
    }

    /// Read-only access to the session record.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Consumes the controller, handing back the view.
    pub fn into_view(self) -> V {
        self.view
    }

    // =====================================================================
    // Connection lifecycle
    // =====================================================================

    /// Idle → Connecting.
    ///
    /// # Errors
    /// [`SessionError::Closed`] after close; [`SessionError::InvalidTransition`]
    /// if already connecting or open.
    pub fn connect(&mut self) -> Result<(), SessionError> {
        match self.session.connection_state {
            ConnectionState::Idle => {
                self.session.connection_state = ConnectionState::Connecting;
                tracing::debug!("connecting");
                Ok(())
            }
            ConnectionState::Closed => Err(SessionError::Closed),
            ConnectionState::Connecting | ConnectionState::Open => Err(
                SessionError::InvalidTransition("connect called twice"),
            ),
        }
    }

    /// The transport opened. Connecting → Open, and paint the unjoined view.
    pub fn on_open(&mut self) {
        if self.session.connection_state != ConnectionState::Connecting {
            tracing::debug!(
                state = ?self.session.connection_state,
                "ignoring open outside of connecting"
            );
            return;
        }
        self.session.connection_state = ConnectionState::Open;
        self.view.set_header(UNJOINED_HEADER);
        self.view.set_action_affordance(Affordance::Join);
        self.view.set_inputs_enabled(true);
        tracing::info!("connected to the server");
    }

    /// The transport reported an error. Logged only; a close follows.
    pub fn on_error(&mut self, details: &str) {
        tracing::warn!(%details, "connection error");
    }

    /// The transport closed. Any state → Closed, for good.
    ///
    /// Room and username are left as they were; nothing is cleared.
    pub fn on_close(&mut self) {
        if self.session.connection_state == ConnectionState::Closed {
            return;
        }
        self.session.connection_state = ConnectionState::Closed;
        tracing::info!(
            room = %self.session.current_room,
            "disconnected from the server"
        );
    }

    // =====================================================================
    // User intents
    // =====================================================================

    /// `true` if a join with these inputs would pass the guard.
    ///
    /// Mirrors the action button's enabled state: both fields must be
    /// non-blank after trimming.
    pub fn can_join(room: &str, username: &str) -> bool {
        !room.trim().is_empty() && !username.trim().is_empty()
    }

    /// Asks to join `room` as `username`.
    ///
    /// Under [`TransitionPolicy::Optimistic`] the view switches to the room
    /// right away; under `Confirmed` it waits for the server's `HI`.
    pub fn join(
        &mut self,
        room: &str,
        username: &str,
    ) -> Result<OutgoingIntent, SessionError> {
        self.ensure_open()?;
        if !Self::can_join(room, username) {
            return Err(SessionError::GuardRejected(
                "room and username are required",
            ));
        }
        if let Membership::Joined { room: current, .. }
        | Membership::Leaving { room: current } = &self.session.membership
        {
            return Err(SessionError::AlreadyJoined(current.clone()));
        }

        self.session.username = username.to_string();
        let intent = OutgoingIntent::Join {
            room: room.to_string(),
            username: username.to_string(),
        };

        match self.config.transition_policy {
            TransitionPolicy::Optimistic => self.enter_room(room, false),
            TransitionPolicy::Confirmed => {
                self.session.membership = Membership::Joining {
                    room: room.to_string(),
                };
            }
        }
        tracing::info!(room, username, "join requested");
        Ok(intent)
    }

    /// Asks to leave the current room.
    ///
    /// A join still waiting for `HI` can be abandoned too: the leave goes
    /// out for the pending room and the session is unjoined at once, since
    /// a server that never says `HI` won't say `BYE` either.
    pub fn leave(&mut self) -> Result<OutgoingIntent, SessionError> {
        self.ensure_open()?;
        let (room, pending) = match &self.session.membership {
            Membership::Joined { room, .. } => (room.clone(), false),
            Membership::Joining { room } => (room.clone(), true),
            Membership::Unjoined | Membership::Leaving { .. } => {
                return Err(SessionError::NotJoined);
            }
        };

        let intent = OutgoingIntent::Leave {
            room: room.clone(),
            username: self.session.username.clone(),
        };

        if pending {
            // The view never switched, so there is nothing to undo there.
            self.session.membership = Membership::Unjoined;
            self.session.pending_leaves += 1;
            tracing::info!(%room, "pending join abandoned");
            return Ok(intent);
        }

        match self.config.transition_policy {
            TransitionPolicy::Optimistic => {
                self.session.pending_leaves += 1;
                self.exit_room();
            }
            TransitionPolicy::Confirmed => {
                self.session.membership = Membership::Leaving { room: room.clone() };
            }
        }
        tracing::info!(%room, "leave requested");
        Ok(intent)
    }

    /// Posts `text` as `username` to whatever room the session is in.
    ///
    /// No transition. Unless
    /// [`require_joined_for_send`](SessionConfig::require_joined_for_send)
    /// is set, this works while unjoined too and the message is tagged
    /// with the default room.
    pub fn send_message(
        &mut self,
        text: &str,
        username: &str,
    ) -> Result<OutgoingIntent, SessionError> {
        self.ensure_open()?;
        if text.trim().is_empty() {
            return Err(SessionError::EmptySend);
        }
        if self.config.require_joined_for_send && !self.session.is_joined() {
            return Err(SessionError::NotJoined);
        }
        Ok(OutgoingIntent::Message {
            room: self.session.current_room.clone(),
            username: username.to_string(),
            text: text.to_string(),
        })
    }

    // =====================================================================
    // Server events
    // =====================================================================

    /// Routes one decoded event to the right handler.
    pub fn apply(&mut self, event: IncomingEvent) {
        match event {
            IncomingEvent::ChatMessage { username, text } => {
                self.receive_chat_message(username, text);
            }
            IncomingEvent::ServerNotice {
                kind,
                username,
                text,
            } => self.receive_server_notice(kind, username, text),
        }
    }

    /// Handles a server notice. `HI` and `BYE` move the session; the rest
    /// are rendered as informational entries.
    pub fn receive_server_notice(
        &mut self,
        kind: NoticeKind,
        username: String,
        text: String,
    ) {
        if self.session.connection_state == ConnectionState::Closed {
            tracing::debug!(%kind, "ignoring notice after close");
            return;
        }
        match kind {
            NoticeKind::Hello => self.confirm_join(),
            NoticeKind::Bye => self.confirm_leave(),
            NoticeKind::Join | NoticeKind::Leave | NoticeKind::Other(_) => {
                self.view.append_message(RenderedMessage {
                    sender: username,
                    text,
                    class: MessageClass::Server,
                    notice: Some(kind),
                });
            }
        }
    }

    /// Renders a chat message. No transition.
    pub fn receive_chat_message(&mut self, username: String, text: String) {
        if self.session.connection_state == ConnectionState::Closed {
            tracing::debug!("ignoring chat message after close");
            return;
        }
        let class = self.classify(&username);
        self.view.append_message(RenderedMessage {
            sender: username,
            text,
            class,
            notice: None,
        });
    }

    /// Styles a message by its sender.
    ///
    /// Our own name wins over the server's, so a user who calls themself
    /// "Server" sees their own messages as sent. An empty session username
    /// never matches.
    pub fn classify(&self, username: &str) -> MessageClass {
        if !self.session.username.is_empty() && username == self.session.username {
            MessageClass::Sent
        } else if username == SERVER_SENDER {
            MessageClass::Server
        } else {
            MessageClass::Received
        }
    }

    // =====================================================================
    // Transitions
    // =====================================================================

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.session.connection_state {
            ConnectionState::Open => Ok(()),
            ConnectionState::Closed => Err(SessionError::Closed),
            ConnectionState::Idle | ConnectionState::Connecting => {
                Err(SessionError::NotConnected)
            }
        }
    }

    /// `HI`: the server says we're in.
    fn confirm_join(&mut self) {
        match self.session.membership.clone() {
            Membership::Joining { room } => self.enter_room(&room, true),
            Membership::Joined { room, confirmed } => {
                if confirmed {
                    tracing::debug!(%room, "duplicate join confirmation");
                }
                // Optimistic: the view already switched. Finalize without
                // clearing messages that arrived since.
                self.session.current_room = room.clone();
                self.session.membership = Membership::Joined {
                    room: room.clone(),
                    confirmed: true,
                };
                self.view.set_header(&joined_header(&room));
                self.view.set_action_affordance(Affordance::Leave);
                self.view.set_inputs_enabled(false);
                tracing::info!(%room, "join confirmed");
            }
            membership @ (Membership::Unjoined | Membership::Leaving { .. }) => {
                tracing::warn!(
                    ?membership,
                    "join confirmation with no join outstanding"
                );
            }
        }
    }

    /// `BYE`: the server says we're out.
    ///
    /// A `BYE` first pays off a leave that was already applied locally;
    /// only an unexpected one moves the session.
    fn confirm_leave(&mut self) {
        if self.session.pending_leaves > 0 {
            self.session.pending_leaves -= 1;
            tracing::debug!(
                outstanding = self.session.pending_leaves,
                "leave acknowledged"
            );
            return;
        }
        match &self.session.membership {
            Membership::Leaving { .. } => self.exit_room(),
            Membership::Joined { room, .. } => {
                tracing::info!(%room, "removed from room by server");
                self.exit_room();
            }
            Membership::Joining { room } => {
                tracing::info!(%room, "join abandoned by server");
                self.exit_room();
            }
            Membership::Unjoined => {
                tracing::debug!("ignoring leave confirmation while unjoined");
            }
        }
    }

    fn enter_room(&mut self, room: &str, confirmed: bool) {
        self.session.current_room = room.to_string();
        self.session.membership = Membership::Joined {
            room: room.to_string(),
            confirmed,
        };
        self.view.clear_messages();
        self.view.set_header(&joined_header(room));
        self.view.set_action_affordance(Affordance::Leave);
        self.view.set_inputs_enabled(false);
        tracing::info!(room, confirmed, "joined room");
    }

    fn exit_room(&mut self) {
        let left = std::mem::replace(
            &mut self.session.current_room,
            self.config.default_room.clone(),
        );
        self.session.membership = Membership::Unjoined;
        self.view.clear_messages();
        self.view.set_header(UNJOINED_HEADER);
        self.view.set_action_affordance(Affordance::Join);
        self.view.set_inputs_enabled(true);
        tracing::info!(room = %left, "left room");
    }
}

// =========================================================================
// Tests
// =========================================================================
