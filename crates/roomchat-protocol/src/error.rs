//! Error types for the protocol layer.
//!
//! Each crate in Roomchat defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning intents into frames or
//! frames into events, not in networking or session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of an outgoing intent failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// An incoming frame could not be parsed.
    ///
    /// Common causes: not JSON at all, JSON that is not an object, or a
    /// known field with the wrong JSON type (e.g. `"username": 5`).
    /// The caller logs it and drops the frame; the session is untouched.
    #[cfg(feature = "json")]
    #[error("malformed frame: {0}")]
    MalformedFrame(serde_json::Error),
}
