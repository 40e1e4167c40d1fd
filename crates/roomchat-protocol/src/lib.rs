//! Wire protocol for Roomchat.
//!
//! This crate defines the "language" the chat client and server speak:
//!
//! - **Types** ([`OutgoingIntent`], [`IncomingEvent`], [`ServerFrame`],
//!   [`NoticeKind`], [`FieldSet`]): what travels on the wire and what it
//!   means once parsed.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those are turned
//!   into and out of text frames.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! # Architecture
//!
//! ```text
//! Transport (text frames) → Protocol (IncomingEvent) → Session (state + view)
//! Session (OutgoingIntent) → Protocol (text frames) → Transport
//! ```
//!
//! The protocol layer holds no session state. It doesn't know which room
//! you're in or who you are.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    FieldSet, IncomingEvent, NoticeKind, OutgoingIntent, SERVER_SENDER,
    ServerFrame,
};
