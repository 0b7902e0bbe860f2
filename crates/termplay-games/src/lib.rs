//! Reference games for termplay online play.
//!
//! Games plug into the server through [`termplay_core::Game`] and a
//! [`termplay_core::GameRegistry`]. The coordinator never looks inside a
//! snapshot, so each game ships its own decoder for clients.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod duel;

pub use duel::{DuelGame, DuelSnapshot, decode_snapshot, duel_registry};
