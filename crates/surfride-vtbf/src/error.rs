//! Error types for VTBF decoding and encoding.

use surfride_common::TypeTag;
use thiserror::Error;

use crate::property::PropertyType;

/// Errors that can occur when reading or writing VTBF files.
///
/// Every error is terminal for the file being processed; nothing is retried
/// or partially recovered.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (bad UTF-8, bad tags).
    #[error("{0}")]
    Common(#[from] surfride_common::Error),

    /// The magic prefix or the fixed header constant did not match.
    #[error("malformed header at offset {offset}: expected {expected:02x?}, got {actual:02x?}")]
    MalformedHeader {
        offset: usize,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// A chunk did not start with the `vtc0` marker.
    #[error("malformed chunk marker at offset {offset}: got {actual:02x?}")]
    MalformedChunkMarker { offset: usize, actual: [u8; 4] },

    /// The file ended in the middle of a header or chunk.
    #[error("truncated file at offset {offset}: needed {needed} bytes but only {available} available")]
    TruncatedFile {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A type byte that the codec cannot represent.
    #[error("unsupported encoding for property {code:#04x} (type byte {type_byte:#04x}): {reason}")]
    UnsupportedPropertyEncoding {
        code: u8,
        type_byte: u8,
        reason: &'static str,
    },

    /// A property code that is not in the property table.
    #[error("unknown property code {code:#04x} in {tag} chunk at offset {offset}")]
    UnknownPropertyCode { tag: TypeTag, code: u8, offset: usize },

    /// An array-record chunk whose property count does not split evenly into its records.
    #[error("inconsistent record count in {tag} chunk: {property_count} properties across {record_count} records")]
    InconsistentRecordCount {
        tag: TypeTag,
        property_count: usize,
        record_count: usize,
    },

    /// An array-record chunk whose sentinel-delimited region cannot be located or parsed.
    #[error("malformed record list in {tag} chunk at offset {offset}: {reason}")]
    MalformedRecordList {
        tag: TypeTag,
        offset: usize,
        reason: &'static str,
    },

    /// Declared child counts do not match the number of chunks that follow.
    #[error("unbalanced child count at node {index}: {reason}")]
    UnbalancedChildCount { index: usize, reason: String },

    /// An array-record node declared children, which cannot be attached to a list.
    #[error("{tag} record list at node {index} declares {child_count} children")]
    ChildrenOnRecordList {
        index: usize,
        tag: TypeTag,
        child_count: u16,
    },

    /// A key in the tree is neither a known property nor a child kind.
    #[error("unknown property name {0:?}")]
    UnknownPropertyName(String),

    /// A tree value does not fit the declared type of its property.
    #[error("property {property}: expected {expected} value, got {actual}")]
    ValueMismatch {
        property: String,
        expected: PropertyType,
        actual: String,
    },

    /// An integer does not fit the byte width of its property.
    #[error("property {property}: value {value} does not fit in {width} bytes")]
    ValueOutOfRange {
        property: String,
        value: i64,
        width: usize,
    },

    /// A list value whose encoding (tuple or repetition) cannot be decided from the table.
    #[error("property {0}: list value is ambiguous between a tuple and repeated entries")]
    AmbiguousListEncoding(String),

    /// An AnsiString longer than its 1-byte length prefix allows.
    #[error("property {property}: string of {len} bytes exceeds the 255-byte limit")]
    StringTooLong { property: String, len: usize },

    /// A count that does not fit its on-disk field.
    #[error("{what} count {count} exceeds the format limit of {limit}")]
    CountOverflow {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    /// The tree does not have the shape produced by decoding.
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// A code table was built with a duplicate key on one of its sides.
    #[error("duplicate {table} table entry: {key}")]
    DuplicateTableEntry { table: &'static str, key: String },

    /// An error that occurred while processing a specific chunk.
    #[error("chunk {index} ({tag}): {source}")]
    Chunk {
        index: usize,
        tag: TypeTag,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Return the innermost error, looking through [`Error::Chunk`] wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Chunk { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Map a reader error, reporting short reads as a truncated file and
    /// magic mismatches as a malformed header.
    pub(crate) fn framing(err: surfride_common::Error) -> Self {
        match err {
            surfride_common::Error::UnexpectedEof {
                offset,
                needed,
                available,
            } => Error::TruncatedFile {
                offset,
                needed,
                available,
            },
            surfride_common::Error::InvalidMagic {
                offset,
                expected,
                actual,
            } => Error::MalformedHeader {
                offset,
                expected,
                actual,
            },
            other => Error::Common(other),
        }
    }

    /// Apply [`Error::framing`] to a wrapped reader error.
    pub(crate) fn truncated(self) -> Self {
        match self {
            Error::Common(inner) => Error::framing(inner),
            other => other,
        }
    }

    pub(crate) fn in_chunk(self, index: usize, tag: TypeTag) -> Self {
        Error::Chunk {
            index,
            tag,
            source: Box::new(self),
        }
    }
}

/// Result type for VTBF operations.
pub type Result<T> = std::result::Result<T, Error>;
