//! Wrapper types for BSON kinds that have no plain Rust counterpart.
//!
//! Each wrapper has value equality, a `Display` rendering used in logs, and
//! serde support so the value can ride inside an extension payload.

use crate::error::ObjectIdError;
use crate::values::{DynamicValue, Map};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named binary sub-kinds carried by [`OpaqueBinary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryKind {
    /// Generic bytes; decodes back as [`DynamicValue::Bytes`].
    #[default]
    Unknown,
    /// Function body
    Function,
    /// MD5 digest
    Md5,
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            Self::Function => f.write_str("Function"),
            Self::Md5 => f.write_str("Md5"),
        }
    }
}

/// Binary payload tagged with a named sub-kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpaqueBinary {
    /// Binary sub-kind
    pub kind: BinaryKind,
    /// Payload bytes
    pub bytes: Vec<u8>,
}

impl OpaqueBinary {
    /// Create a new binary wrapper.
    pub fn new(kind: BinaryKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
        }
    }

    /// Create an MD5 digest wrapper.
    pub fn md5(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(BinaryKind::Md5, bytes)
    }

    /// Create a function body wrapper.
    pub fn function(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(BinaryKind::Function, bytes)
    }
}

impl fmt::Display for OpaqueBinary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueBinary({}, data size {})", self.kind, self.bytes.len())
    }
}

/// 12-byte object identifier with its embedded creation time.
///
/// The first four bytes of an object id are a big-endian Unix timestamp in
/// seconds; `time` caches that value. Equality compares the bytes only.
/// Only the bytes are serialized; the time is derived again on load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "[u8; 12]", into = "[u8; 12]")]
pub struct ObjectId {
    bytes: [u8; 12],
    time: DateTime<Utc>,
}

impl ObjectId {
    /// Create an object id from its raw bytes, deriving the cached time.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        let secs = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let time = DateTime::from_timestamp(i64::from(secs), 0).unwrap_or_default();
        Self { bytes, time }
    }

    /// Parse an object id from 24 hexadecimal characters.
    pub fn from_hex(hex: &str) -> Result<Self, ObjectIdError> {
        let decoded = hex::decode(hex).map_err(|_| ObjectIdError::InvalidHex(hex.to_string()))?;
        let bytes: [u8; 12] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| ObjectIdError::InvalidLength(decoded.len()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Raw identifier bytes.
    pub fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Lowercase hexadecimal rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Creation time embedded in the identifier, at second precision.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.time
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<ObjectId> for [u8; 12] {
    fn from(oid: ObjectId) -> Self {
        oid.bytes
    }
}

impl PartialEq for ObjectId {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for ObjectId {}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjectId({}, {})",
            self.to_hex(),
            self.time.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Regular expression with its option flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Regex {
    /// Pattern source
    pub pattern: String,
    /// Option flags such as `i` or `m`
    pub options: String,
}

impl Regex {
    /// Create a new regular expression.
    pub fn new(pattern: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            options: options.into(),
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Regex({:?}, {:?})", self.pattern, self.options)
    }
}

/// JavaScript source code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Code {
    pub source: String,
}

impl Code {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({:?})", self.source)
    }
}

/// JavaScript source code bound to a scope document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeWithScope {
    /// Code source
    pub source: String,
    /// Variables visible to the code
    #[serde(deserialize_with = "crate::nesting::nested")]
    pub scope: Map,
}

impl CodeWithScope {
    pub fn new(source: impl Into<String>, scope: Map) -> Self {
        Self {
            source: source.into(),
            scope,
        }
    }
}

impl fmt::Display for CodeWithScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeWithScope({:?}, scope...)", self.source)
    }
}

/// Sentinel that compares lower than every other BSON value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinKey;

impl fmt::Display for MinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MinKey()")
    }
}

/// Sentinel that compares higher than every other BSON value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaxKey;

impl fmt::Display for MaxKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MaxKey()")
    }
}

/// Application-defined value with no document-native shape.
///
/// `type_name` identifies the application type and must be registered with
/// the converter before encoding; `payload` holds the value's contents and
/// may nest documents, arrays and other extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    /// Registered application type name
    pub type_name: String,
    /// Value contents
    #[serde(deserialize_with = "crate::nesting::nested")]
    pub payload: Box<DynamicValue>,
}

impl Extension {
    /// Create a new extension value.
    pub fn new(type_name: impl Into<String>, payload: DynamicValue) -> Self {
        Self {
            type_name: type_name.into(),
            payload: Box::new(payload),
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extension({}, {})", self.type_name, self.payload.kind())
    }
}
