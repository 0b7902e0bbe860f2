//! Core error types.

use crate::ids::GameId;

/// Errors from constructing a game instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// No constructor is registered for this game id.
    ///
    /// Fatal for the match start that asked for it; the lobby is discarded.
    #[error("unknown game: {0}")]
    UnknownGame(GameId),

    /// The constructor ran but could not build a playable instance.
    #[error("failed to construct game {game_id}: {reason}")]
    Construction {
        /// Game that failed to construct
        game_id: GameId,
        /// Error message
        reason: String,
    },
}

/// The entropy source could not produce random bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entropy source unavailable: {0}")]
pub struct EntropyError(pub String);
