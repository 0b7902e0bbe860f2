//! Deterministic simulation harness for termplay testing.
//!
//! Provides a manually advanced [`Environment`](termplay_core::Environment),
//! scripted join-code sources, the reference duel game plus a factory that
//! always fails, and helpers that wire a coordinator to in-memory sessions.
//!
//! Timing inside a match still runs on tokio's clock; pair these helpers with
//! `#[tokio::test(start_paused = true)]` to make tick timing deterministic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codes;
pub mod games;
pub mod scenario;
pub mod sim_env;

pub use codes::{FixedCodes, PoolCodes};
pub use games::{DuelGame, DuelSnapshot, decode_snapshot, duel_registry, failing_factory};
pub use scenario::{SimServer, next_event, next_lifecycle_event, wait_until};
pub use sim_env::{SimEnv, SimInstant};
