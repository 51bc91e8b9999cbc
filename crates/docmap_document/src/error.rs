//! Error types for the document crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding, decoding or parsing documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// NaN values cannot be encoded deterministically.
    #[error("NaN values are forbidden")]
    NaNForbidden,

    /// Indefinite-length items are forbidden.
    #[error("indefinite-length items are forbidden")]
    IndefiniteLengthForbidden,

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Input continued after the top-level document.
    #[error("{count} trailing bytes after document")]
    TrailingBytes {
        /// Number of unread bytes.
        count: usize,
    },

    /// Invalid CBOR structure.
    #[error("invalid CBOR structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },

    /// Unsupported CBOR type.
    #[error("unsupported CBOR type: {type_name}")]
    UnsupportedType {
        /// Name of the unsupported type.
        type_name: String,
    },

    /// Integer does not fit in an `i64`.
    #[error("integer overflow")]
    IntegerOverflow,

    /// Declared length exceeds the decoder limit.
    #[error("size limit exceeded: claimed {claimed}, max allowed {max_allowed}")]
    SizeLimitExceeded {
        /// Length claimed by the input.
        claimed: u64,
        /// Maximum length the decoder accepts.
        max_allowed: u64,
    },

    /// Containers are nested deeper than the decoder allows.
    #[error("nesting deeper than {max_depth} levels")]
    NestingTooDeep {
        /// Maximum supported depth.
        max_depth: usize,
    },

    /// Malformed object id.
    #[error("invalid object id: {message}")]
    InvalidObjectId {
        /// Description of the problem.
        message: String,
    },
}

impl CodecError {
    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid object id error.
    pub fn invalid_object_id(message: impl Into<String>) -> Self {
        Self::InvalidObjectId {
            message: message.into(),
        }
    }
}
