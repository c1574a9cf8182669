//! Value representations for the variant-bson converter.
//!
//! This module defines `DynamicValue`, the host-side tree that the converter
//! turns into BSON documents and back, together with the native-value
//! extraction interface used by the converter and by applications.

use crate::error::TypeMismatch;
use crate::types::Kind;
use crate::wrappers::{Code, CodeWithScope, Extension, MaxKey, MinKey, ObjectId, OpaqueBinary, Regex};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered mapping with unique keys.
///
/// Inserting an existing key replaces its value and keeps the key's first
/// position.
pub type Map = IndexMap<String, DynamicValue>;

/// Dynamically-typed value.
///
/// `DynamicValue` holds any value the application may store in a document.
/// Most variants have a direct BSON counterpart; `Date`, `Time` and
/// `Extension` travel as opaque payloads, and the remaining host kinds are
/// coerced onto a document-native kind when encoded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum DynamicValue {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit floating point
    Double(f64),

    /// String value
    String(String),

    /// UTC date/time; documents keep millisecond precision
    DateTime(DateTime<Utc>),

    /// Raw generic bytes
    Bytes(Vec<u8>),

    /// Binary data with a named sub-kind
    Binary(OpaqueBinary),

    /// UUID value
    Uuid(Uuid),

    /// Array of values
    #[serde(deserialize_with = "crate::nesting::nested")]
    Array(Vec<DynamicValue>),

    /// Ordered map of values
    #[serde(deserialize_with = "crate::nesting::nested")]
    Document(Map),

    /// Object identifier
    ObjectId(ObjectId),

    /// Regular expression
    Regex(Regex),

    /// JavaScript code
    Code(Code),

    /// JavaScript code with scope
    CodeWithScope(CodeWithScope),

    /// Lower sentinel
    MinKey(MinKey),

    /// Upper sentinel
    MaxKey(MaxKey),

    /// Calendar date without time zone
    Date(NaiveDate),

    /// Wall-clock time without date
    Time(NaiveTime),

    /// Application-defined opaque value
    Extension(Extension),

    /// 32-bit unsigned integer
    UInt32(u32),

    /// 64-bit unsigned integer
    UInt64(u64),

    /// 16-bit signed integer
    Int16(i16),

    /// Single character
    Char(char),

    /// List of strings
    StringList(Vec<String>),

    /// Key/value pairs in assignment order; keys may repeat
    #[serde(deserialize_with = "crate::nesting::nested")]
    Pairs(Vec<(String, DynamicValue)>),
}

impl DynamicValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Int32(_) => Kind::Int32,
            Self::Int64(_) => Kind::Int64,
            Self::Double(_) => Kind::Double,
            Self::String(_) => Kind::String,
            Self::DateTime(_) => Kind::DateTime,
            Self::Bytes(_) => Kind::Bytes,
            Self::Binary(_) => Kind::Binary,
            Self::Uuid(_) => Kind::Uuid,
            Self::Array(_) => Kind::Array,
            Self::Document(_) => Kind::Document,
            Self::ObjectId(_) => Kind::ObjectId,
            Self::Regex(_) => Kind::Regex,
            Self::Code(_) => Kind::Code,
            Self::CodeWithScope(_) => Kind::CodeWithScope,
            Self::MinKey(_) => Kind::MinKey,
            Self::MaxKey(_) => Kind::MaxKey,
            Self::Date(_) => Kind::Date,
            Self::Time(_) => Kind::Time,
            Self::Extension(_) => Kind::Extension,
            Self::UInt32(_) => Kind::UInt32,
            Self::UInt64(_) => Kind::UInt64,
            Self::Int16(_) => Kind::Int16,
            Self::Char(_) => Kind::Char,
            Self::StringList(_) => Kind::StringList,
            Self::Pairs(_) => Kind::Pairs,
        }
    }

    /// Create a string value.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create a document value from key/value pairs.
    ///
    /// A repeated key keeps its first position and its last value.
    pub fn document<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynamicValue)>,
    {
        Self::Document(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create an array value.
    pub fn array(values: impl IntoIterator<Item = DynamicValue>) -> Self {
        Self::Array(values.into_iter().collect())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(i) => Some(*i),
            Self::Int32(i) => Some(*i as i64),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&Vec<DynamicValue>> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get this value as a document.
    pub fn as_document(&self) -> Option<&Map> {
        match self {
            Self::Document(map) => Some(map),
            _ => None,
        }
    }

    /// Extract the native value of kind `T`.
    ///
    /// Unlike coercion this never converts between kinds.
    pub fn extract<T: FromDynamic>(&self) -> Result<T, TypeMismatch> {
        T::from_dynamic(self)
    }
}

/// Native types that can be extracted from a [`DynamicValue`] of one exact
/// kind.
pub trait FromDynamic: Sized {
    /// The kind this type is stored as.
    const KIND: Kind;

    /// Extract the native value, failing when the stored kind differs.
    fn from_dynamic(value: &DynamicValue) -> Result<Self, TypeMismatch>;
}

macro_rules! impl_from_dynamic {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromDynamic for $ty {
                const KIND: Kind = Kind::$variant;

                fn from_dynamic(value: &DynamicValue) -> Result<Self, TypeMismatch> {
                    match value {
                        DynamicValue::$variant(v) => Ok(v.clone()),
                        other => Err(TypeMismatch::new(Self::KIND, other.kind())),
                    }
                }
            }

            impl From<$ty> for DynamicValue {
                fn from(value: $ty) -> Self {
                    DynamicValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_dynamic! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    String => String,
    DateTime<Utc> => DateTime,
    Vec<u8> => Bytes,
    OpaqueBinary => Binary,
    Uuid => Uuid,
    Vec<DynamicValue> => Array,
    Map => Document,
    ObjectId => ObjectId,
    Regex => Regex,
    Code => Code,
    CodeWithScope => CodeWithScope,
    MinKey => MinKey,
    MaxKey => MaxKey,
    NaiveDate => Date,
    NaiveTime => Time,
    Extension => Extension,
    u32 => UInt32,
    u64 => UInt64,
    i16 => Int16,
    char => Char,
    Vec<String> => StringList,
    Vec<(String, DynamicValue)> => Pairs,
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::String(value.to_string())
    }
}
