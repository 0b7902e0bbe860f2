//! Result sink error types

use thiserror::Error;

/// Errors from persisting or reading match records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error (file system, database, injected fault)
    #[error("I/O error: {0}")]
    Io(String),
}
