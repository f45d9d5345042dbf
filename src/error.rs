//! Chronicle - Custom Error Types
//! Defines the error hierarchy for the record store.

use thiserror::Error;

use crate::types::RecordId;

/// Custom Result type for the Chronicle store.
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Error types for the Chronicle record store.
#[derive(Error, Debug)]
pub enum ChronicleError {
    /// I/O errors from journal file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data corruption detected (CRC mismatch in the journal).
    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// Read of a record id no write has ever succeeded for.
    /// The message doubles as the client-facing error body.
    #[error("record of id {0} does not exist")]
    RecordNotFound(RecordId),

    /// Malformed patch reached the store (non-string, non-null value).
    #[error("invalid patch: {0}")]
    InvalidPatch(String),
}
