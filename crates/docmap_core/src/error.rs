//! Error types for docmap core.

use docmap_document::CodecError;
use thiserror::Error;

/// Result type for mapping operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors that can occur while mapping documents and entities.
///
/// Every variant aborts the top-level conversion; no partially populated
/// entity is returned.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The target entity could not be created.
    #[error("cannot instantiate entity {type_name}: {reason}")]
    EntityInstantiation {
        /// Entity type name.
        type_name: String,
        /// Why instantiation failed.
        reason: String,
    },

    /// A declared type has no resolution strategy.
    #[error("unresolvable type {type_name}: {reason}")]
    UnresolvableType {
        /// Declared type name.
        type_name: String,
        /// Why it could not be resolved.
        reason: String,
    },

    /// The type is not registered as a mappable entity.
    #[error("type {type_name} is not registered as a mappable entity")]
    UnsupportedType {
        /// Type name.
        type_name: String,
    },

    /// No converter is registered for the encountered pair.
    #[error("no converter from {source_type} to {target_type} at `{path}`")]
    NoConverterFound {
        /// Field path of the value.
        path: String,
        /// Source representation.
        source_type: String,
        /// Target type.
        target_type: String,
    },

    /// A converter produced a value of the wrong type.
    #[error("type mismatch at `{path}`: expected {expected}, {detail}")]
    TypeMismatch {
        /// Field path of the value.
        path: String,
        /// The declared type.
        expected: String,
        /// What was produced instead.
        detail: String,
    },

    /// A converter accepted the pair but cannot represent this value.
    #[error("invalid value at `{path}` for {target_type}: {reason}")]
    InvalidValue {
        /// Field path of the value.
        path: String,
        /// Target type.
        target_type: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two properties of one entity share a name.
    #[error("duplicate property `{property}` on {type_name}")]
    DuplicateProperty {
        /// Entity type name.
        type_name: String,
        /// The repeated property name.
        property: String,
    },

    /// Nested conversion went deeper than the configured maximum.
    #[error("conversion at `{path}` exceeds maximum depth {max_depth}")]
    DepthExceeded {
        /// Field path where the limit was hit.
        path: String,
        /// Configured maximum depth.
        max_depth: usize,
    },

    /// Document wire format error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl MapperError {
    /// Creates an entity instantiation error.
    pub fn entity_instantiation(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EntityInstantiation {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unresolvable type error.
    pub fn unresolvable_type(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvableType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Creates a missing converter error.
    pub fn no_converter(
        path: impl Into<String>,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self::NoConverterFound {
            path: path.into(),
            source_type: source_type.into(),
            target_type: target_type.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            detail: detail.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(
        path: impl Into<String>,
        target_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            path: path.into(),
            target_type: target_type.into(),
            reason: reason.into(),
        }
    }
}
