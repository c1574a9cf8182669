//! Kind tags for dynamic values.
//!
//! This module defines `Kind`, the discriminant of every `DynamicValue`
//! variant. Converters dispatch on it, coercion targets are expressed with it,
//! and the extension registry records the payload kind it expects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`DynamicValue`](crate::DynamicValue).
///
/// Kinds fall into three groups:
///
/// 1. **Document-native**: kinds with a direct BSON counterpart
///    (`Null` through `MaxKey`).
/// 2. **Host-only**: kinds with no BSON shape that travel through the
///    extension codec (`Date`, `Time`, `Extension`).
/// 3. **Coercible**: kinds the encoder maps onto a document-native kind,
///    either directly (`UInt32`, `StringList`) or through the coercion table
///    (`UInt64`, `Int16`, `Char`, `Pairs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    // Document-native
    /// Absent value
    Null,
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit IEEE 754 floating point
    Double,
    /// UTF-8 string
    String,
    /// UTC timestamp with millisecond precision
    DateTime,
    /// Raw generic bytes
    Bytes,
    /// Typed binary wrapper
    Binary,
    /// UUID (128-bit)
    Uuid,
    /// Ordered sequence
    Array,
    /// Ordered mapping with unique keys
    Document,
    /// 12-byte object identifier
    ObjectId,
    /// Regular expression
    Regex,
    /// JavaScript code
    Code,
    /// JavaScript code with a scope document
    CodeWithScope,
    /// Lower sentinel key
    MinKey,
    /// Upper sentinel key
    MaxKey,

    // Host-only
    /// Calendar date
    Date,
    /// Wall-clock time
    Time,
    /// Application-defined opaque value
    Extension,

    // Coercible
    /// 32-bit unsigned integer
    #[serde(rename = "uint32")]
    UInt32,
    /// 64-bit unsigned integer
    #[serde(rename = "uint64")]
    UInt64,
    /// 16-bit signed integer
    Int16,
    /// Single Unicode scalar value
    Char,
    /// List of strings
    StringList,
    /// Key/value pairs that may repeat keys
    Pairs,
}

impl Kind {
    /// Stable lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Double => "double",
            Self::String => "string",
            Self::DateTime => "date_time",
            Self::Bytes => "bytes",
            Self::Binary => "binary",
            Self::Uuid => "uuid",
            Self::Array => "array",
            Self::Document => "document",
            Self::ObjectId => "object_id",
            Self::Regex => "regex",
            Self::Code => "code",
            Self::CodeWithScope => "code_with_scope",
            Self::MinKey => "min_key",
            Self::MaxKey => "max_key",
            Self::Date => "date",
            Self::Time => "time",
            Self::Extension => "extension",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Int16 => "int16",
            Self::Char => "char",
            Self::StringList => "string_list",
            Self::Pairs => "pairs",
        }
    }

    /// Whether values of this kind have no BSON shape and must go through
    /// the extension codec.
    pub fn is_host_only(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Extension)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
