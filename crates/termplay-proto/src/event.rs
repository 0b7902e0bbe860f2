//! Events pushed to sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use termplay_core::{GameId, JoinCode, MatchId, PlayerSlot, SessionId, SnapshotPayload};

/// Why a match (or a lobby that never became one) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The game reported game-over.
    Completed,
    /// A participant left or hung up; the other one wins.
    Disconnect,
    /// The host cancelled or left the lobby before a match existed.
    HostLeft,
    /// The match hit its configured tick cap without finishing.
    Stalled,
    /// The coordinator shut down underneath the match.
    Shutdown,
}

impl EndReason {
    /// Display string, also used in persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Disconnect => "disconnect",
            Self::HostLeft => "host_left",
            Self::Stalled => "stalled",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a session needs to render or react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Your lobby exists; share `code` with your opponent.
    LobbyCreated {
        /// Join code
        code: JoinCode,
        /// Game the lobby will start
        game_id: GameId,
    },

    /// A lobby request was rejected or a lobby went away.
    LobbyError {
        /// Human-readable reason
        message: String,
    },

    /// You are paired.
    LobbyJoined {
        /// Lobby code
        code: JoinCode,
        /// Your seat
        side: PlayerSlot,
        /// The other participant
        opponent_id: SessionId,
    },

    /// Your joiner left the lobby.
    LobbyPlayerLeft {
        /// Lobby code
        code: JoinCode,
    },

    /// A match started and you are seated in it.
    MatchStarted {
        /// Match to address inputs to
        match_id: MatchId,
        /// Your seat
        side: PlayerSlot,
        /// Lobby code, for display
        code: JoinCode,
    },

    /// A match ended. `match_id` is `None` when the lobby ended before a
    /// match was created.
    MatchEnded {
        /// Match that ended
        match_id: Option<MatchId>,
        /// Why it ended
        reason: EndReason,
        /// Winning seat, `None` for no winner
        winner: Option<PlayerSlot>,
        /// Host's final score
        score1: i32,
        /// Joiner's final score
        score2: i32,
    },

    /// Authoritative state after a tick. Identical for both participants.
    Snapshot {
        /// Match the snapshot belongs to
        match_id: MatchId,
        /// Tick number, starting at 1
        tick: u64,
        /// Game-defined encoded state
        payload: SnapshotPayload,
    },
}

impl Event {
    /// Shorthand for a [`Event::LobbyError`].
    pub fn lobby_error(message: impl Into<String>) -> Self {
        Self::LobbyError { message: message.into() }
    }

    /// Whether this is a per-tick snapshot (as opposed to a lifecycle event).
    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot { .. })
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LobbyCreated { .. } => "lobby_created",
            Self::LobbyError { .. } => "lobby_error",
            Self::LobbyJoined { .. } => "lobby_joined",
            Self::LobbyPlayerLeft { .. } => "lobby_player_left",
            Self::MatchStarted { .. } => "match_started",
            Self::MatchEnded { .. } => "match_ended",
            Self::Snapshot { .. } => "snapshot",
        }
    }
}
