//! The UI surface the controller drives.
//!
//! The controller never touches widgets directly. It calls the five
//! methods on [`View`], and whoever embeds the client (a terminal, a web
//! page, a test) decides what they mean.

use roomchat_protocol::NoticeKind;

/// Header text shown while not in a room.
pub const UNJOINED_HEADER: &str = "Join a room to chat";

/// Header text shown while in `room`.
pub fn joined_header(room: &str) -> String {
    format!("Connected to Room: {room}")
}

// ---------------------------------------------------------------------------
// Affordance
// ---------------------------------------------------------------------------

/// The state of the single join/leave action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affordance {
    /// Button reads "Join", green.
    #[default]
    Join,
    /// Button reads "Leave", red.
    Leave,
}

impl Affordance {
    pub fn label(self) -> &'static str {
        match self {
            Self::Join => "Join",
            Self::Leave => "Leave",
        }
    }

    /// Color token for the button background.
    pub fn color(self) -> &'static str {
        match self {
            Self::Join => "#28a745",
            Self::Leave => "#dc3545",
        }
    }
}

// ---------------------------------------------------------------------------
// MessageClass / RenderedMessage
// ---------------------------------------------------------------------------

/// How a message is styled, based on who sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// We sent it.
    Sent,
    /// The server sent it.
    Server,
    /// Someone else sent it.
    Received,
}

impl MessageClass {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Server => "server",
            Self::Received => "received",
        }
    }
}

/// One entry in the message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub sender: String,
    pub text: String,
    pub class: MessageClass,
    /// Set for informational server notices (`join`, `leave`, unknown).
    pub notice: Option<NoticeKind>,
}

impl RenderedMessage {
    /// Style classes for this entry, most general first.
    ///
    /// A `join` notice yields `["server", "join"]`; a plain chat message
    /// yields just its [`MessageClass`].
    pub fn style_classes(&self) -> Vec<&'static str> {
        let mut classes = vec![self.class.css_class()];
        match self.notice {
            Some(NoticeKind::Join) => classes.push("join"),
            Some(NoticeKind::Leave) => classes.push("leave"),
            _ => {}
        }
        classes
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// What the controller can ask of the user interface.
pub trait View {
    /// Appends one message to the bottom of the list.
    fn append_message(&mut self, message: RenderedMessage);

    /// Removes every message from the list.
    fn clear_messages(&mut self);

    /// Replaces the header line.
    fn set_header(&mut self, text: &str);

    /// Flips the join/leave button.
    fn set_action_affordance(&mut self, affordance: Affordance);

    /// Enables or disables the room and username inputs.
    fn set_inputs_enabled(&mut self, enabled: bool);
}

/// A [`View`] that just remembers what it was told.
///
/// Handy for headless embedding and for asserting side effects in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingView {
    pub messages: Vec<RenderedMessage>,
    pub header: String,
    pub affordance: Affordance,
    pub inputs_enabled: bool,
    /// How many times `clear_messages` ran.
    pub clears: usize,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            header: UNJOINED_HEADER.to_string(),
            affordance: Affordance::Join,
            inputs_enabled: true,
            clears: 0,
        }
    }
}

impl View for RecordingView {
    fn append_message(&mut self, message: RenderedMessage) {
        self.messages.push(message);
    }

    fn clear_messages(&mut self) {
        self.messages.clear();
        self.clears += 1;
    }

    fn set_header(&mut self, text: &str) {
        self.header = text.to_string();
    }

    fn set_action_affordance(&mut self, affordance: Affordance) {
        self.affordance = affordance;
    }

    fn set_inputs_enabled(&mut self, enabled: bool) {
        self.inputs_enabled = enabled;
    }
}
