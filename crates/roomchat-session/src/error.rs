//! Error types for the session layer.

/// Why the controller refused to produce an intent.
///
/// None of these are fatal. The dispatch loop logs them at debug level
/// and carries on; the page stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A join was attempted with a blank room or username.
    ///
    /// The UI normally prevents this by disabling the action button
    /// (see [`can_join`](crate::RoomSessionController::can_join)).
    #[error("guard rejected: {0}")]
    GuardRejected(&'static str),

    /// A message with blank text was submitted.
    #[error("message text is empty")]
    EmptySend,

    /// The connection is not open yet.
    #[error("not connected")]
    NotConnected,

    /// A leave (or, in strict mode, a message) was attempted without
    /// being in a room.
    #[error("not in a room")]
    NotJoined,

    /// A join was attempted while already in a room.
    #[error("already in room {0}")]
    AlreadyJoined(String),

    /// The lifecycle call doesn't fit the current connection state,
    /// e.g. `connect` twice.
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    /// The connection has closed. Nothing more can happen in this session.
    #[error("session closed")]
    Closed,
}
