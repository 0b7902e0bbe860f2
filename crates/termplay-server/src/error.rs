//! Server error types.
//!
//! Nothing in this crate is fatal to the process. Rejections are scoped to a
//! single request, and every other failure is scoped to one lobby, match or
//! session.

/// A lobby request that was rejected.
///
/// The `Display` string is exactly what the requester sees in its
/// `LobbyError` event. State is unchanged when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// The session already hosts or joined a lobby, or is playing a match.
    #[error("Already in a lobby")]
    AlreadyInLobby,

    /// No active lobby has this code.
    #[error("Lobby not found")]
    NotFound,

    /// The lobby already has a joiner.
    #[error("Lobby is full")]
    Full,

    /// The host tried to join its own lobby.
    #[error("Cannot join your own lobby")]
    OwnLobby,

    /// Every candidate code collided with an active lobby.
    ///
    /// Transient: codes are freed as lobbies go away.
    #[error("Could not allocate a lobby code")]
    CodeSpaceExhausted,
}

/// Errors from talking to the coordinator task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// The inbound queue is full; the message was dropped.
    ///
    /// Transient - the caller may retry after the coordinator catches up.
    #[error("coordinator queue is full")]
    QueueFull,

    /// The coordinator loop has exited (shutdown or all handles dropped).
    #[error("coordinator has stopped")]
    Stopped,
}

/// Invalid coordinator configuration.
///
/// Fatal at startup. Fix configuration and restart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);
