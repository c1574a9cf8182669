//! Extension codec: host-only values carried as BSON binary payloads.
//!
//! BSON has no notion of calendar dates, wall-clock times or application
//! types. Such values are serialized by an [`ExtensionSerializer`] and stored
//! as a binary value with a user-defined sub-kind; decoding reverses the
//! process. The codec never interprets the payload bytes itself.
//!
//! The module also maps the named binary sub-kinds of
//! [`OpaqueBinary`](variant_core::OpaqueBinary) to and from BSON sub-kinds.

use crate::config::ConversionConfig;
use crate::error::{ConversionError, Result};
use crate::registry;
use bincode::Options;
use bson::spec::BinarySubtype;
use std::fmt;
use tracing::trace;
use variant_core::{nesting, BinaryKind, DynamicValue, Extension, TypeMismatch};

/// General-purpose byte serializer for extension payloads.
///
/// `deserialize(serialize(v))` must reconstruct a value equal to `v` for
/// every value the application stores as an extension.
pub trait ExtensionSerializer: Send + Sync + fmt::Debug {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Serialize a host value to bytes.
    fn serialize(&self, value: &DynamicValue) -> Result<Vec<u8>>;

    /// Reconstruct a host value from bytes produced by [`serialize`](Self::serialize).
    fn deserialize(&self, bytes: &[u8]) -> Result<DynamicValue>;
}

/// Compact binary serializer (bincode, fixed-width integers).
///
/// Payloads larger than the configured limit are rejected in both
/// directions, and trailing bytes after a value are an error.
#[derive(Debug, Clone, Copy)]
pub struct BincodeSerializer {
    limit: u64,
}

impl BincodeSerializer {
    pub const NAME: &'static str = "bincode";

    /// Create a serializer that rejects payloads over `limit` bytes.
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_limit(self.limit)
    }
}

impl ExtensionSerializer for BincodeSerializer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn serialize(&self, value: &DynamicValue) -> Result<Vec<u8>> {
        self.options()
            .serialize(value)
            .map_err(|e| ConversionError::ExtensionSerialization {
                serializer: Self::NAME,
                message: e.to_string(),
            })
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<DynamicValue> {
        self.options()
            .deserialize(bytes)
            .map_err(|e| ConversionError::MalformedExtensionPayload {
                serializer: Self::NAME,
                message: e.to_string(),
            })
    }
}

/// Human-readable JSON serializer.
///
/// Non-finite doubles have no JSON representation and fail to round-trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ExtensionSerializer for JsonSerializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn serialize(&self, value: &DynamicValue) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| ConversionError::ExtensionSerialization {
            serializer: self.name(),
            message: e.to_string(),
        })
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<DynamicValue> {
        serde_json::from_slice(bytes).map_err(|e| ConversionError::MalformedExtensionPayload {
            serializer: self.name(),
            message: e.to_string(),
        })
    }
}

/// Serialize a host-only value into an extension payload.
pub fn serialize_opaque(value: &DynamicValue, config: &ConversionConfig) -> Result<Vec<u8>> {
    let bytes = config.serializer.serialize(value)?;
    trace!(
        "Serialized {} extension payload with {}: {} bytes",
        value.kind(),
        config.serializer.name(),
        bytes.len()
    );
    Ok(bytes)
}

/// Reconstruct a host-only value from an extension payload.
///
/// Containers inside the payload may nest at most `config.max_depth` deep.
pub fn deserialize_opaque(bytes: &[u8], config: &ConversionConfig) -> Result<DynamicValue> {
    let value =
        nesting::with_max_depth(config.max_depth, || config.serializer.deserialize(bytes))?;
    trace!(
        "Deserialized {} bytes with {} into {}",
        bytes.len(),
        config.serializer.name(),
        value.kind()
    );
    Ok(value)
}

/// Check that an extension's type name is registered and that its payload
/// has the registered kind, if one was given.
pub fn validate_extension(ext: &Extension) -> Result<()> {
    let registered = registry::lookup(&ext.type_name).ok_or_else(|| {
        ConversionError::UnsupportedType(format!("unregistered extension type {}", ext.type_name))
    })?;
    if let Some(expected) = registered.payload_kind {
        let actual = ext.payload.kind();
        if actual != expected {
            return Err(TypeMismatch::new(expected, actual).into());
        }
    }
    Ok(())
}

/// BSON sub-kind for a named binary kind.
pub fn binary_kind_to_subtype(kind: BinaryKind) -> BinarySubtype {
    match kind {
        BinaryKind::Unknown => BinarySubtype::Generic,
        BinaryKind::Function => BinarySubtype::Function,
        BinaryKind::Md5 => BinarySubtype::Md5,
    }
}

/// Named binary kind for a BSON sub-kind, if it has one.
pub fn subtype_to_binary_kind(subtype: BinarySubtype) -> Option<BinaryKind> {
    match subtype {
        BinarySubtype::Function => Some(BinaryKind::Function),
        BinarySubtype::Md5 => Some(BinaryKind::Md5),
        _ => None,
    }
}
