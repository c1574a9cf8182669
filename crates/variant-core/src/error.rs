//! Error types for the dynamic value model.

use crate::types::Kind;
use thiserror::Error;

/// A native value was requested from a dynamic value of another kind, or a
/// coercion target is not reachable from the stored kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Type mismatch: expected {expected}, got {actual}")]
pub struct TypeMismatch {
    /// The requested kind.
    pub expected: Kind,
    /// The kind actually stored.
    pub actual: Kind,
}

impl TypeMismatch {
    /// Create a new type mismatch error.
    pub fn new(expected: Kind, actual: Kind) -> Self {
        Self { expected, actual }
    }
}

/// Errors that can occur while building an [`ObjectId`](crate::ObjectId).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    /// The input is not valid hexadecimal.
    #[error("Invalid object id hex: {0}")]
    InvalidHex(String),

    /// The input decodes to something other than 12 bytes.
    #[error("Object id must be 12 bytes, got {0}")]
    InvalidLength(usize),
}
