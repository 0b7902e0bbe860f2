//! Match result persistence.
//!
//! The coordinator hands one [`MatchRecord`] per terminated match to a
//! [`ResultSink`]. Persistence is best-effort: the coordinator calls the sink
//! from a blocking task and only logs failures, so a slow or broken sink never
//! delays the `MatchEnded` notification.

mod chaotic;
mod error;
mod memory;
mod redb;

pub use chaotic::ChaoticResultSink;
pub use error::StorageError;
pub use memory::MemoryResultSink;
use serde::{Deserialize, Serialize};
use termplay_core::{GameId, JoinCode, PlayerSlot, SessionId};

pub use self::redb::RedbResultSink;
use crate::online_match::MatchResult;

/// Flattened, serialization-friendly outcome of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Match identity
    pub match_id: String,
    /// Game kind that was played
    pub game_id: String,
    /// Lobby code the match came from
    pub code: String,
    /// Host session
    pub player1: String,
    /// Joiner session
    pub player2: String,
    /// [`termplay_proto::EndReason`] display string
    pub reason: String,
    /// 0 = no winner, 1 = host, 2 = joiner
    pub winner: u8,
    /// Host's final score
    pub score1: i32,
    /// Joiner's final score
    pub score2: i32,
    /// Ticks simulated
    pub ticks: u64,
    /// Simulated duration in milliseconds, from ticks and tick rate
    pub duration_ms: u64,
}

impl MatchRecord {
    /// Flatten a match result together with the match's metadata.
    pub fn from_result(
        result: &MatchResult,
        game_id: &GameId,
        code: &JoinCode,
        player1: &SessionId,
        player2: &SessionId,
        tick_rate_hz: u32,
    ) -> Self {
        Self {
            match_id: result.match_id.to_string(),
            game_id: game_id.to_string(),
            code: code.to_string(),
            player1: player1.to_string(),
            player2: player2.to_string(),
            reason: result.reason.as_str().to_string(),
            winner: result.winner.map_or(0, PlayerSlot::number),
            score1: result.score1,
            score2: result.score2,
            ticks: result.ticks,
            duration_ms: result.ticks.saturating_mul(1000) / u64::from(tick_rate_hz.max(1)),
        }
    }
}

/// Destination for completed-match records.
///
/// Must be Clone (shared with blocking persistence tasks), Send + Sync, and
/// synchronous. Implementations share internal state via Arc, so clones
/// write to the same underlying store.
pub trait ResultSink: Clone + Send + Sync + 'static {
    /// Persist one record. Called at most once per match.
    fn save_match_result(&self, record: &MatchRecord) -> Result<(), StorageError>;
}

/// Sink that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResultSink;

impl ResultSink for NoopResultSink {
    fn save_match_result(&self, _record: &MatchRecord) -> Result<(), StorageError> {
        Ok(())
    }
}
