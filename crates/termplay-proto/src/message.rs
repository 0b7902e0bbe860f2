//! Messages consumed by the coordinator.

use serde::{Deserialize, Serialize};
use termplay_core::{GameId, InputFlags, JoinCode, MatchId, PlayerSlot, SessionId};

/// A client action (or a transport notice) addressed to the coordinator.
///
/// Messages are processed strictly in enqueue order by a single actor loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Host a new lobby for `game_id`.
    CreateLobby {
        /// Requesting session
        session_id: SessionId,
        /// Game to play once paired
        game_id: GameId,
    },

    /// Join the lobby behind `code` (case-insensitive).
    JoinLobby {
        /// Requesting session
        session_id: SessionId,
        /// Lobby code as typed by the user
        code: JoinCode,
    },

    /// Host withdraws their lobby.
    CancelLobby {
        /// Requesting session (must be the host)
        session_id: SessionId,
        /// Lobby to cancel
        code: JoinCode,
    },

    /// Host or joiner leaves a lobby.
    LeaveLobby {
        /// Requesting session
        session_id: SessionId,
        /// Lobby being left
        code: JoinCode,
    },

    /// A participant abandons a running match.
    LeaveMatch {
        /// Requesting session
        session_id: SessionId,
        /// Match being left
        match_id: MatchId,
    },

    /// Input for the next tick of a match.
    PlayerInput {
        /// Target match
        match_id: MatchId,
        /// Seat the input belongs to
        player: PlayerSlot,
        /// Actions held
        input: InputFlags,
    },

    /// Reserved for rematch negotiation. Currently ignored.
    ReadyForRematch {
        /// Requesting session
        session_id: SessionId,
        /// Match that just ended
        match_id: MatchId,
    },

    /// The transport lost this session.
    SessionDisconnected {
        /// Session that went away
        session_id: SessionId,
    },
}

impl Message {
    /// Session the message originates from, if it names one.
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::CreateLobby { session_id, .. }
            | Self::JoinLobby { session_id, .. }
            | Self::CancelLobby { session_id, .. }
            | Self::LeaveLobby { session_id, .. }
            | Self::LeaveMatch { session_id, .. }
            | Self::ReadyForRematch { session_id, .. }
            | Self::SessionDisconnected { session_id } => Some(session_id),
            Self::PlayerInput { .. } => None,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateLobby { .. } => "create_lobby",
            Self::JoinLobby { .. } => "join_lobby",
            Self::CancelLobby { .. } => "cancel_lobby",
            Self::LeaveLobby { .. } => "leave_lobby",
            Self::LeaveMatch { .. } => "leave_match",
            Self::PlayerInput { .. } => "player_input",
            Self::ReadyForRematch { .. } => "ready_for_rematch",
            Self::SessionDisconnected { .. } => "session_disconnected",
        }
    }
}
