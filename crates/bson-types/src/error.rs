//! Error types for BSON conversions.
//!
//! Every conversion step returns these errors instead of falling back to a
//! default value; the first error aborts the whole top-level call.

use thiserror::Error;
use variant_core::{Kind, TypeMismatch};

/// Errors that can occur while converting between dynamic values and BSON.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A native value of one kind was requested from a value of another kind.
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    /// No mapping or coercion exists for the value.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// An extension payload could not be deserialized.
    #[error("Malformed extension payload ({serializer}): {message}")]
    MalformedExtensionPayload {
        serializer: &'static str,
        message: String,
    },

    /// An extension value could not be serialized.
    #[error("Extension serialization failed ({serializer}): {message}")]
    ExtensionSerialization {
        serializer: &'static str,
        message: String,
    },

    /// The raw BSON reader reported a structural fault.
    #[error("BSON format error: {0}")]
    UnderlyingFormat(#[from] bson::raw::Error),

    /// The top-level value handed to the encoder is not a document.
    #[error("Top-level value must be a document, got {0}")]
    NotADocument(Kind),

    /// A key or regex component contains an interior NUL byte.
    #[error("{context} contains an interior NUL byte: {value:?}")]
    InvalidCString {
        context: &'static str,
        value: String,
    },

    /// A UUID binary does not hold exactly 16 bytes.
    #[error("UUID binary must be 16 bytes, got {0}")]
    InvalidUuid(usize),

    /// Containers nest deeper than the configured maximum.
    #[error("Nesting exceeds maximum depth {0}")]
    DepthLimitExceeded(usize),

    /// A binary sub-kind outside the user-defined range `0x80..=0xFF`.
    #[error("Binary subtype 0x{0:02x} is not in the user-defined range")]
    InvalidUserSubtype(u8),
}

impl ConversionError {
    /// Unsupported dynamic kind on the encode side.
    pub(crate) fn unsupported_kind(kind: Kind) -> Self {
        Self::UnsupportedType(format!("no document mapping for {kind}"))
    }

    /// Unsupported BSON element type on the decode side.
    pub(crate) fn unsupported_element(element_type: bson::spec::ElementType) -> Self {
        Self::UnsupportedType(format!(
            "element type {element_type:?} (0x{:02x})",
            element_type as u8
        ))
    }
}

/// Result type for BSON conversions.
pub type Result<T> = std::result::Result<T, ConversionError>;
