//! Error types for surfride-common.

use thiserror::Error;

/// Common error type for Surfride operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at offset {offset}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Invalid magic bytes encountered.
    #[error("invalid magic at offset {offset}: expected {expected:02x?}, got {actual:02x?}")]
    InvalidMagic {
        offset: usize,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// A four-character code was not exactly four bytes long.
    #[error("invalid type tag {0:?}: expected exactly 4 bytes")]
    InvalidTag(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error at offset {offset}: {source}")]
    Utf8 {
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
