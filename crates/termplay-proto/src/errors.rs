//! Protocol error types.

/// Errors from encoding or decoding the wire vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// CBOR serialization failed.
    ///
    /// Indicates a bug (every vocabulary type is serializable).
    #[error("CBOR encoding failed: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed.
    ///
    /// The peer sent malformed bytes or an unknown variant. Fatal for that
    /// frame, not for the connection.
    #[error("CBOR decoding failed: {0}")]
    CborDecode(String),
}

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;
