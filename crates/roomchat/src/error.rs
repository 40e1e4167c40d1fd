//! Unified error type for the Roomchat client.

use roomchat_protocol::ProtocolError;
use roomchat_session::SessionError;
use roomchat_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `roomchat` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RoomchatError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, malformed frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level refusal (guard, empty send, not joined).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The client's dispatch loop has exited; commands go nowhere.
    #[error("client is no longer running")]
    ClientStopped,
}
