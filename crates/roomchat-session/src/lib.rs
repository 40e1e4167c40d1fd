//! Client session management for Roomchat.
//!
//! This crate is the client's brain:
//!
//! 1. **Session**: who the user is, which room they're in, whether the
//!    connection is up ([`Session`], [`ConnectionState`], [`Membership`])
//! 2. **Controller**: validates user intents and applies server events
//!    ([`RoomSessionController`])
//! 3. **View**: the UI surface the controller drives ([`View`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client runtime (above)  ← feeds user commands and transport events in
//!     ↕
//! Session Layer (this crate)  ← decides what to send, what to show
//!     ↕
//! Protocol Layer (below)  ← OutgoingIntent, IncomingEvent
//! ```

mod controller;
mod error;
mod session;
mod view;

pub use controller::RoomSessionController;
pub use error::SessionError;
pub use session::{
    ConnectionState, Membership, Session, SessionConfig, SessionPhase,
    TransitionPolicy,
};
pub use view::{
    joined_header, Affordance, MessageClass, RecordingView, RenderedMessage,
    View, UNJOINED_HEADER,
};
