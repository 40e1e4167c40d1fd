//! Session types: the single record of "who am I and where am I".
//!
//! One [`Session`] exists per client for its whole lifetime. It is owned
//! by the [`RoomSessionController`](crate::RoomSessionController) and only
//! changes through its methods; everything else gets read-only access.

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// When a join or leave takes effect locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Switch rooms as soon as the intent is sent; the server's `HI`/`BYE`
    /// then marks the switch confirmed.
    #[default]
    Optimistic,

    /// Send the intent, then wait. The room only changes when the server's
    /// `HI`/`BYE` arrives.
    Confirmed,
}

/// Configuration for session behavior.
///
/// Sensible defaults are provided; override only what you need:
///
/// ```rust
/// use roomchat_session::{SessionConfig, TransitionPolicy};
///
/// let config = SessionConfig {
///     transition_policy: TransitionPolicy::Confirmed,
///     ..SessionConfig::default()
/// };
/// assert_eq!(config.default_room, "global");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The sentinel room identifier meaning "not in any room".
    ///
    /// Messages sent while unjoined are tagged with this value.
    /// Default: `"global"`.
    pub default_room: String,

    /// Optimistic or confirmed room transitions. Default: optimistic.
    pub transition_policy: TransitionPolicy,

    /// Refuse to send messages unless joined to a real room.
    ///
    /// Default: `false`, which lets messages go out tagged with the
    /// sentinel room.
    pub require_joined_for_send: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_room: "global".to_string(),
            transition_policy: TransitionPolicy::Optimistic,
            require_joined_for_send: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionState / Membership
// ---------------------------------------------------------------------------

/// Lifecycle of the one connection a session rides on.
///
/// ```text
///   Idle ──(connect)──→ Connecting ──(open)──→ Open
///     │                     │                   │
///     └─────────────────────┴──────(close)──────┴──→ Closed
/// ```
///
/// `Closed` is terminal: a session never reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, `connect` not called yet.
    Idle,
    /// Dialing the endpoint.
    Connecting,
    /// Frames may flow both ways.
    Open,
    /// The connection is gone for good.
    Closed,
}

/// Where the session stands with respect to rooms.
///
/// `Joining` and `Leaving` only occur under
/// [`TransitionPolicy::Confirmed`], while the server's answer is pending.
/// Optimistic leaves go straight to `Unjoined` and are tracked in
/// [`Session::pending_leaves`] until their `BYE` arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// Not in any room.
    Unjoined,
    /// Join sent, waiting for `HI`.
    Joining { room: String },
    /// In `room`. `confirmed` flips to `true` when `HI` arrives.
    Joined { room: String, confirmed: bool },
    /// Leave sent, waiting for `BYE`. Still routing to `room` meanwhile.
    Leaving { room: String },
}

/// Coarse state of the whole client, in the terms a user would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not connected: either never connected, or closed.
    Disconnected,
    /// Waiting for the connection to open.
    Connecting,
    /// Connected, not in a room.
    Unjoined,
    /// Connected and in a room.
    Joined,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The client's session record.
#[derive(Debug, Clone)]
pub struct Session {
    /// Room that outgoing messages are tagged with. Holds the sentinel
    /// default room when not joined.
    pub(crate) current_room: String,

    /// Name used on the last join. Empty before the first one.
    pub(crate) username: String,

    pub(crate) connection_state: ConnectionState,

    pub(crate) membership: Membership,

    /// Leaves already applied locally whose `BYE` hasn't arrived yet.
    pub(crate) pending_leaves: u32,
}

impl Session {
    /// A fresh, idle session sitting in `default_room`.
    pub fn new(default_room: impl Into<String>) -> Self {
        Self {
            current_room: default_room.into(),
            username: String::new(),
            connection_state: ConnectionState::Idle,
            membership: Membership::Unjoined,
            pending_leaves: 0,
        }
    }

    /// The room outgoing messages are tagged with.
    pub fn current_room(&self) -> &str {
        &self.current_room
    }

    /// The username from the most recent join (empty before any join).
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    /// How many `BYE`s are still owed for leaves the session has already
    /// acted on.
    pub fn pending_leaves(&self) -> u32 {
        self.pending_leaves
    }

    /// `true` while in a room, confirmed or not.
    pub fn is_joined(&self) -> bool {
        matches!(
            self.membership,
            Membership::Joined { .. } | Membership::Leaving { .. }
        )
    }

    /// Collapses connection state and membership into one [`SessionPhase`].
    pub fn phase(&self) -> SessionPhase {
        match self.connection_state {
            ConnectionState::Idle | ConnectionState::Closed => {
                SessionPhase::Disconnected
            }
            ConnectionState::Connecting => SessionPhase::Connecting,
            ConnectionState::Open if self.is_joined() => SessionPhase::Joined,
            ConnectionState::Open => SessionPhase::Unjoined,
        }
    }
}
