//! Online play server for termplay.
//!
//! Pairs two connected sessions through a short join code and runs the game
//! they chose as an authoritative, fixed-rate simulation, pushing the same
//! snapshot to both players every tick.
//!
//! # Architecture
//!
//! ```text
//! transport ──► SessionRegistry ◄── Coordinator (actor) ──► OnlineMatch (task per match)
//!     ▲                                  │                        │
//!     └──────── SessionHandle ◄──────────┴──── events ◄───────────┘
//! ```
//!
//! - [`SessionHandle`]: non-blocking, drop-oldest event buffer per client
//! - [`Coordinator`]: serialized lobby and match state machine
//! - [`OnlineMatch`]: tick loop with OR-merged inputs and disconnect
//!   detection
//! - [`ResultSink`]: best-effort persistence of finished matches
//!
//! The transport itself (sockets, terminal UI) is out of scope; anything
//! that can register a [`SessionHandle`] and submit [`termplay_proto::Message`]s
//! can drive the coordinator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod lobby;
pub mod online_match;
pub mod registry;
pub mod session;
pub mod storage;
pub mod system_env;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, CoordinatorHandle, LOBBY_EXPIRED, LobbyInfo};
pub use error::{ConfigError, CoordinatorError, LobbyError};
pub use lobby::{CodeSource, EntropyCodes, Lobby, encode_code, generate_unique_code};
pub use online_match::{MatchHandle, MatchResult, MatchSetup, OnlineMatch};
pub use registry::SessionRegistry;
pub use session::SessionHandle;
pub use storage::{
    ChaoticResultSink, MatchRecord, MemoryResultSink, NoopResultSink, RedbResultSink,
    ResultSink, StorageError,
};
pub use system_env::SystemEnv;
