//! Codec trait and the JSON implementation.
//!
//! A codec turns [`OutgoingIntent`]s into frames and frames into
//! [`IncomingEvent`]s. The session controller never sees JSON; the
//! transport never sees intents. The codec is the only place that knows
//! both.

use crate::{IncomingEvent, OutgoingIntent, ProtocolError};
#[cfg(feature = "json")]
use crate::types::{ClientFrame, FieldSet, ServerFrame};

/// Encodes outgoing intents and decodes incoming frames.
///
/// `Send + Sync + 'static` so a codec can live inside the client's
/// dispatch task for as long as the connection does.
pub trait Codec: Send + Sync + 'static {
    /// Serializes an intent into one text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode_intent(&self, intent: &OutgoingIntent) -> Result<String, ProtocolError>;

    /// Parses one text frame into a typed event.
    ///
    /// # Errors
    /// Returns `ProtocolError::MalformedFrame` if the frame is not a JSON
    /// object or a known field has the wrong type. Callers drop the frame
    /// and keep going.
    fn decode_event(&self, frame: &str) -> Result<IncomingEvent, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that speaks the JSON chat protocol.
///
/// The [`FieldSet`] decides which optional fields go on outgoing frames;
/// decoding is the same regardless.
///
/// ## Example
///
/// ```rust
/// use roomchat_protocol::{Codec, IncomingEvent, JsonCodec, OutgoingIntent};
///
/// let codec = JsonCodec::default();
///
/// let frame = codec
///     .encode_intent(&OutgoingIntent::Join {
///         room: "lobby".into(),
///         username: "alice".into(),
///     })
///     .unwrap();
/// assert_eq!(frame, r#"{"action":"join","room":"lobby","username":"alice"}"#);
///
/// let event = codec.decode_event(r#"{"username":"bob","message":"hey"}"#).unwrap();
/// assert!(matches!(event, IncomingEvent::ChatMessage { .. }));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    fields: FieldSet,
}

#[cfg(feature = "json")]
impl JsonCodec {
    /// Creates a codec that lays out outgoing frames per `fields`.
    pub fn new(fields: FieldSet) -> Self {
        Self { fields }
    }

    /// The field set in use.
    pub fn fields(&self) -> FieldSet {
        self.fields
    }
}

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode_intent(&self, intent: &OutgoingIntent) -> Result<String, ProtocolError> {
        let frame = ClientFrame::from_intent(intent, self.fields);
        serde_json::to_string(&frame).map_err(ProtocolError::Encode)
    }

    fn decode_event(&self, frame: &str) -> Result<IncomingEvent, ProtocolError> {
        let value: serde_json::Value =
            serde_json::from_str(frame).map_err(ProtocolError::MalformedFrame)?;
        // Derived struct deserializers also accept sequences; frames are
        // objects only.
        if !value.is_object() {
            return Err(ProtocolError::MalformedFrame(serde::de::Error::custom(
                "expected a JSON object",
            )));
        }
        let parsed: ServerFrame =
            serde_json::from_value(value).map_err(ProtocolError::MalformedFrame)?;
        Ok(parsed.into())
    }
}
