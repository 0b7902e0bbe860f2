//! CBOR encoding for the wire vocabulary.
//!
//! CBOR is self-describing (field names embedded) and compact, and carries
//! snapshot payloads as a byte string without re-encoding them. There is no
//! framing here; transports delimit messages themselves.

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    errors::{ProtocolError, Result},
    event::Event,
    message::Message,
};

/// Encode an event for a session transport.
pub fn encode_event(event: &Event) -> Result<Vec<u8>> {
    encode(event)
}

/// Decode an event received from the server.
pub fn decode_event(bytes: &[u8]) -> Result<Event> {
    decode(bytes)
}

/// Encode a coordinator message.
pub fn encode_message(message: &Message) -> Result<Vec<u8>> {
    encode(message)
}

/// Decode a coordinator message received from a client.
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    decode(bytes)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf)
        .map_err(|e| ProtocolError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::de::from_reader(bytes).map_err(|e| ProtocolError::CborDecode(e.to_string()))
}
