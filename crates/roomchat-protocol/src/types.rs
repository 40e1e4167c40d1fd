//! Core protocol types for Roomchat's wire format.
//!
//! Two directions, two shapes:
//!
//! - **Client → server**: an [`OutgoingIntent`] (join, leave, message),
//!   serialized as a flat JSON object keyed by `action`.
//! - **Server → client**: a [`ServerFrame`] with optional `username`,
//!   `message` and `type` fields, interpreted as an [`IncomingEvent`].
//!
//! ```text
//! {"action":"join","room":"lobby","username":"alice"}        client → server
//! {"username":"Server","message":"welcome","type":"HI"}      server → client
//! ```

use serde::{Deserialize, Serialize};

use std::fmt;

/// The reserved sender name the server uses for its own notices.
///
/// A frame from this sender that also carries a `type` field is a
/// [`IncomingEvent::ServerNotice`]; without `type` it's an ordinary chat
/// message that happens to come from the server.
pub const SERVER_SENDER: &str = "Server";

// ---------------------------------------------------------------------------
// Outgoing
// ---------------------------------------------------------------------------

/// Something the user wants the server to do.
///
/// Built per user action by the session controller, handed to a
/// [`Codec`](crate::Codec), sent, and dropped. Nothing keeps these around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingIntent {
    /// Join `room` as `username`.
    Join { room: String, username: String },

    /// Leave `room`.
    Leave { room: String, username: String },

    /// Post `text` to `room`.
    Message {
        room: String,
        username: String,
        text: String,
    },
}

impl OutgoingIntent {
    /// The `action` string this intent carries on the wire.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Message { .. } => "message",
        }
    }

    /// The room this intent is addressed to.
    pub fn room(&self) -> &str {
        match self {
            Self::Join { room, .. }
            | Self::Leave { room, .. }
            | Self::Message { room, .. } => room,
        }
    }

    /// The username attached to this intent.
    pub fn username(&self) -> &str {
        match self {
            Self::Join { username, .. }
            | Self::Leave { username, .. }
            | Self::Message { username, .. } => username,
        }
    }
}

/// Which optional fields go onto outgoing frames.
///
/// Servers in the wild disagree on whether `join`/`leave` carry a
/// `username`. `action` and `room` are always present, as are all fields
/// of a `message` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet {
    /// Include `username` on `join` frames.
    pub username_on_join: bool,
    /// Include `username` on `leave` frames.
    pub username_on_leave: bool,
}

impl FieldSet {
    /// `join` and `leave` carry only `action` and `room`.
    pub fn minimal() -> Self {
        Self {
            username_on_join: false,
            username_on_leave: false,
        }
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self {
            username_on_join: true,
            username_on_leave: true,
        }
    }
}

/// The JSON shape of one client → server frame.
///
/// Field order here is the order on the wire.
#[cfg(feature = "json")]
#[derive(Debug, Serialize)]
pub(crate) struct ClientFrame<'a> {
    pub(crate) action: &'static str,
    pub(crate) room: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<&'a str>,
}

#[cfg(feature = "json")]
impl<'a> ClientFrame<'a> {
    /// Lays out `intent` according to `fields`.
    pub(crate) fn from_intent(intent: &'a OutgoingIntent, fields: FieldSet) -> Self {
        match intent {
            OutgoingIntent::Join { room, username } => Self {
                action: intent.action(),
                room: room.as_str(),
                username: fields.username_on_join.then_some(username.as_str()),
                message: None,
            },
            OutgoingIntent::Leave { room, username } => Self {
                action: intent.action(),
                room: room.as_str(),
                username: fields.username_on_leave.then_some(username.as_str()),
                message: None,
            },
            OutgoingIntent::Message {
                room,
                username,
                text,
            } => Self {
                action: intent.action(),
                room: room.as_str(),
                username: Some(username.as_str()),
                message: Some(text.as_str()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Incoming
// ---------------------------------------------------------------------------

/// The JSON shape of one server → client frame.
///
/// Every field is optional: the receiving side never assumes one is there.
/// Unknown extra fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Notice type. Only meaningful when `username` is [`SERVER_SENDER`].
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ServerFrame {
    /// A frame authored by the server with the given notice `kind`.
    pub fn notice(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            username: Some(SERVER_SENDER.to_string()),
            message: Some(message.into()),
            kind: Some(kind.as_wire().to_string()),
        }
    }

    /// A chat frame from `username`.
    pub fn chat(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            message: Some(message.into()),
            kind: None,
        }
    }
}

/// The `type` of a server notice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Someone joined the room (informational).
    Join,
    /// Someone left the room (informational).
    Leave,
    /// `"HI"`: the server confirms *our* join.
    Hello,
    /// `"BYE"`: the server confirms *our* leave.
    Bye,
    /// Any other `type`. Rendered as a plain notice, no side effects.
    Other(String),
}

impl NoticeKind {
    /// Parses a wire `type` value. Matching is case-sensitive.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "join" => Self::Join,
            "leave" => Self::Leave,
            "HI" => Self::Hello,
            "BYE" => Self::Bye,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire `type` value for this kind.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Hello => "HI",
            Self::Bye => "BYE",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// A typed view of one server frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingEvent {
    /// A message to render. `username` may be [`SERVER_SENDER`] when the
    /// server speaks without a `type`.
    ChatMessage { username: String, text: String },

    /// A server-authored notice. `HI`/`BYE` drive session transitions;
    /// the rest are informational.
    ServerNotice {
        kind: NoticeKind,
        username: String,
        text: String,
    },
}

impl From<ServerFrame> for IncomingEvent {
    fn from(frame: ServerFrame) -> Self {
        let username = frame.username.unwrap_or_default();
        let text = frame.message.unwrap_or_default();
        match frame.kind {
            // A `type` only means something coming from the server.
            Some(kind) if username == SERVER_SENDER => Self::ServerNotice {
                kind: NoticeKind::from_wire(&kind),
                username,
                text,
            },
            _ => Self::ChatMessage { username, text },
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire shapes are fixed by what the server speaks, so these tests
    //! pin the JSON our serde attributes produce and accept.

    use super::*;

    fn join(room: &str, username: &str) -> OutgoingIntent {
        OutgoingIntent::Join {
            room: room.into(),
            username: username.into(),
        }
    }

    // =====================================================================
    // OutgoingIntent / ClientFrame
    // =====================================================================

    #[test]
    fn test_intent_action_names() {
        assert_eq!(join("a", "b").action(), "join");
        let leave = OutgoingIntent::Leave {
            room: "a".into(),
            username: "b".into(),
        };
        assert_eq!(leave.action(), "leave");
        let msg = OutgoingIntent::Message {
            room: "a".into(),
            username: "b".into(),
            text: "c".into(),
        };
        assert_eq!(msg.action(), "message");
        assert_eq!(msg.room(), "a");
        assert_eq!(msg.username(), "b");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_client_frame_join_default_fields() {
        let intent = join("lobby", "alice");
        let frame = ClientFrame::from_intent(&intent, FieldSet::default());
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"action":"join","room":"lobby","username":"alice"}"#
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_client_frame_join_minimal_omits_username() {
        let intent = join("lobby", "alice");
        let frame = ClientFrame::from_intent(&intent, FieldSet::minimal());
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["action"], "join");
        assert_eq!(json["room"], "lobby");
        assert!(json.get("username").is_none());
        assert!(json.get("message").is_none());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_client_frame_message_ignores_minimal_field_set() {
        // Message frames always carry the sender.
        let intent = OutgoingIntent::Message {
            room: "lobby".into(),
            username: "alice".into(),
            text: "hi there".into(),
        };
        let frame = ClientFrame::from_intent(&intent, FieldSet::minimal());
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"action":"message","room":"lobby","username":"alice","message":"hi there"}"#
        );
    }

    // =====================================================================
    // ServerFrame → IncomingEvent
    // =====================================================================

    #[test]
    fn test_server_frame_missing_fields_default_to_empty() {
        let frame: ServerFrame = serde_json::from_str("{}").unwrap();
        assert_eq!(
            IncomingEvent::from(frame),
            IncomingEvent::ChatMessage {
                username: String::new(),
                text: String::new(),
            }
        );
    }

    #[test]
    fn test_server_frame_ignores_unknown_fields() {
        let frame: ServerFrame = serde_json::from_str(
            r#"{"username":"bob","message":"hey","color":"blue"}"#,
        )
        .unwrap();
        assert_eq!(frame, ServerFrame::chat("bob", "hey"));
    }

    #[test]
    fn test_type_from_non_server_sender_is_ignored() {
        let frame: ServerFrame = serde_json::from_str(
            r#"{"username":"mallory","message":"x","type":"HI"}"#,
        )
        .unwrap();
        assert!(matches!(
            IncomingEvent::from(frame),
            IncomingEvent::ChatMessage { .. }
        ));
    }

    #[test]
    fn test_server_without_type_is_chat_message() {
        let frame = ServerFrame {
            username: Some("Server".into()),
            message: Some("maintenance at noon".into()),
            kind: None,
        };
        assert_eq!(
            IncomingEvent::from(frame),
            IncomingEvent::ChatMessage {
                username: "Server".into(),
                text: "maintenance at noon".into(),
            }
        );
    }

    #[test]
    fn test_notice_frame_serializes_type_field() {
        let json: serde_json::Value =
            serde_json::to_value(ServerFrame::notice(NoticeKind::Hello, "welcome"))
                .unwrap();
        assert_eq!(json["username"], "Server");
        assert_eq!(json["type"], "HI");
        assert_eq!(json["message"], "welcome");
    }

    // =====================================================================
    // NoticeKind
    // =====================================================================

    #[test]
    fn test_notice_kind_from_wire_known_values() {
        assert_eq!(NoticeKind::from_wire("join"), NoticeKind::Join);
        assert_eq!(NoticeKind::from_wire("leave"), NoticeKind::Leave);
        assert_eq!(NoticeKind::from_wire("HI"), NoticeKind::Hello);
        assert_eq!(NoticeKind::from_wire("BYE"), NoticeKind::Bye);
    }

    #[test]
    fn test_notice_kind_is_case_sensitive() {
        assert_eq!(NoticeKind::from_wire("hi"), NoticeKind::Other("hi".into()));
        assert_eq!(NoticeKind::from_wire("Join"), NoticeKind::Other("Join".into()));
    }

    #[test]
    fn test_notice_kind_other_keeps_raw_value() {
        let kind = NoticeKind::from_wire("kick");
        assert_eq!(kind.as_wire(), "kick");
        assert_eq!(kind.to_string(), "kick");
    }
}
