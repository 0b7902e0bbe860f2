//! Core types for termplay online play.
//!
//! Everything here is pure: no runtime, no I/O. The server crate wires these
//! types to tokio tasks and channels; games and tests depend only on this
//! crate.
//!
//! # Components
//!
//! - [`Environment`]: time, entropy and wall clock, injectable for tests
//! - [`Game`]: the capability a concrete game supplies to the match loop
//! - [`GameFactory`] / [`GameRegistry`]: construct games by [`GameId`]
//! - Identifiers: [`SessionId`], [`MatchId`], [`GameId`], [`JoinCode`],
//!   [`PlayerSlot`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod game;
pub mod ids;

pub use env::Environment;
pub use error::{EntropyError, GameError};
pub use game::{
    Game, GameFactory, GameRegistry, InputFlags, MultiInput, RuntimeConfig, SnapshotPayload,
    StepResult,
};
pub use ids::{GameId, JoinCode, MatchId, PlayerSlot, SessionId};
