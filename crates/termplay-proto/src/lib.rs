//! Coordinator messages and session events.
//!
//! Two closed vocabularies: [`Message`] flows from clients into the
//! coordinator, [`Event`] flows from the coordinator and match loops back to
//! each session. Both are plain enums so every consumer matches exhaustively;
//! adding a variant breaks every handler that forgot about it.
//!
//! The [`codec`] module encodes either vocabulary as CBOR for transports that
//! need bytes. Snapshot payloads stay opaque bytes inside the encoding.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod errors;
pub mod event;
pub mod message;

pub use codec::{decode_event, decode_message, encode_event, encode_message};
pub use errors::ProtocolError;
pub use event::{EndReason, Event};
pub use message::Message;
