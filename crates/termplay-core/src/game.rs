//! Game capability consumed by the match loop.
//!
//! A concrete game is a deterministic state machine stepped once per tick
//! with both players' inputs. The coordinator never looks inside a game: it
//! resets it, steps it, asks whether it is over, and forwards its snapshot
//! bytes to clients untouched. Only the game and its client-side renderer
//! agree on what a snapshot contains.

use std::{
    collections::HashMap,
    fmt,
    ops::{BitOr, BitOrAssign},
};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{
    error::GameError,
    ids::{GameId, PlayerSlot},
};

/// Set of actions a player holds during one tick.
///
/// Inputs buffered between two ticks merge with `|`, so a short press that
/// arrives together with a later one is never lost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputFlags(u16);

impl InputFlags {
    /// No action.
    pub const NONE: Self = Self(0);
    /// Up / paddle up.
    pub const UP: Self = Self(1 << 0);
    /// Down / paddle down.
    pub const DOWN: Self = Self(1 << 1);
    /// Left.
    pub const LEFT: Self = Self(1 << 2);
    /// Right.
    pub const RIGHT: Self = Self(1 << 3);
    /// Primary action (fire, serve, confirm).
    pub const PRIMARY: Self = Self(1 << 4);
    /// Secondary action.
    pub const SECONDARY: Self = Self(1 << 5);

    /// Build from raw bits. Unknown bits are kept so newer clients can carry
    /// game-specific actions.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True when no action is held.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every action in `other` is held.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for InputFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for InputFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Both players' inputs for a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiInput {
    /// Host's actions
    pub player1: InputFlags,
    /// Joiner's actions
    pub player2: InputFlags,
}

impl MultiInput {
    /// Actions held by `slot`.
    pub fn get(&self, slot: PlayerSlot) -> InputFlags {
        match slot {
            PlayerSlot::One => self.player1,
            PlayerSlot::Two => self.player2,
        }
    }

    /// Merge `input` into `slot`'s actions.
    pub fn merge(&mut self, slot: PlayerSlot, input: InputFlags) {
        match slot {
            PlayerSlot::One => self.player1 |= input,
            PlayerSlot::Two => self.player2 |= input,
        }
    }
}

/// Parameters handed to [`Game::reset`] at match start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Playfield width in terminal cells
    pub width: u16,
    /// Playfield height in terminal cells
    pub height: u16,
    /// Steps per second the match loop will drive
    pub tick_rate_hz: u32,
    /// Seed for the game's own RNG
    pub seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { width: 80, height: 24, tick_rate_hz: 60, seed: 0 }
    }
}

/// Outcome of one [`Game::step_multi`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Play continues
    Continue,
    /// This step ended the game; [`Game::is_game_over`] now returns true
    Finished,
}

/// Serialized game state at one tick.
///
/// Opaque to the coordinator. Cloning is cheap (reference counted), so the
/// same payload is handed to both participants.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotPayload(Bytes);

impl SnapshotPayload {
    /// Wrap already-encoded bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for an empty payload.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SnapshotPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotPayload({} bytes)", self.0.len())
    }
}

/// A deterministic two-player game.
///
/// # Invariants
///
/// - Given the same [`RuntimeConfig`] and the same sequence of inputs, the
///   game produces the same sequence of snapshots.
/// - Once [`Game::is_game_over`] returns true it keeps returning true.
pub trait Game: Send + 'static {
    /// Start over with fresh state.
    fn reset(&mut self, config: &RuntimeConfig);

    /// Advance exactly one step with both players' inputs.
    fn step_multi(&mut self, input: MultiInput) -> StepResult;

    /// Serialize current state for clients.
    fn snapshot(&self) -> SnapshotPayload;

    /// Whether the game has reached a terminal state.
    fn is_game_over(&self) -> bool;

    /// Winning seat, `None` for a draw or an unfinished game.
    fn winner(&self) -> Option<PlayerSlot>;

    /// Host's score.
    fn score1(&self) -> i32;

    /// Joiner's score.
    fn score2(&self) -> i32;
}

/// Builds game instances by id.
pub trait GameFactory: Send + Sync + 'static {
    /// Construct a fresh (not yet reset) game.
    fn create(&self, game_id: &GameId) -> Result<Box<dyn Game>, GameError>;
}

impl<F> GameFactory for F
where
    F: Fn(&GameId) -> Result<Box<dyn Game>, GameError> + Send + Sync + 'static,
{
    fn create(&self, game_id: &GameId) -> Result<Box<dyn Game>, GameError> {
        self(game_id)
    }
}

type Constructor = Box<dyn Fn() -> Box<dyn Game> + Send + Sync>;

/// Table of game constructors keyed by id.
#[derive(Default)]
pub struct GameRegistry {
    constructors: HashMap<GameId, Constructor>,
}

impl GameRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for `game_id`.
    pub fn register<F>(&mut self, game_id: impl Into<GameId>, constructor: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Game> + Send + Sync + 'static,
    {
        self.constructors.insert(game_id.into(), Box::new(constructor));
        self
    }

    /// Whether `game_id` can be constructed.
    pub fn contains(&self, game_id: &GameId) -> bool {
        self.constructors.contains_key(game_id)
    }

    /// Registered ids, sorted.
    pub fn available(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.constructors.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl GameFactory for GameRegistry {
    fn create(&self, game_id: &GameId) -> Result<Box<dyn Game>, GameError> {
        self.constructors
            .get(game_id)
            .map(|constructor| constructor())
            .ok_or_else(|| GameError::UnknownGame(game_id.clone()))
    }
}

impl fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRegistry").field("games", &self.available()).finish()
    }
}
