//! variant-bson
//!
//! Converts dynamically-typed value trees to and from BSON documents.
//!
//! # Features
//!
//! - Order preserving: document fields and array elements keep their order
//! - Width preserving: Int32 stays Int32, Int64 stays Int64
//! - BSON-specific kinds: object ids, regexes, code, code-with-scope, min/max keys
//! - Host-only values (dates, times, application types) carried as extension payloads
//!
//! # Error conventions
//!
//! Every conversion comes in two forms. The fail-fast form returns a
//! [`Result`] and surfaces the first [`ConversionError`] unchanged. The
//! fail-soft form (`*_soft`) returns the converted value together with a
//! success flag; on failure the value is empty (or `Null`), the flag is
//! `false`, and the error is logged at `debug`.
//!
//! # Example
//!
//! ```rust
//! use variant_bson::{from_document, to_document, DynamicValue};
//!
//! let value = DynamicValue::document([
//!     ("b", DynamicValue::Int32(1)),
//!     ("a", DynamicValue::string("x")),
//! ]);
//! let doc = to_document(&value).unwrap();
//! let back = from_document(&doc).unwrap();
//! assert_eq!(DynamicValue::Document(back), value);
//! ```

use bson::raw::{RawBsonRef, RawDocument, RawDocumentBuf};
use tracing::debug;

pub use bson_types::{
    init, register_extension_type, BincodeSerializer, ConversionConfig, ConversionError,
    Decoder, Encoder, ExtensionSerializer, JsonSerializer, Result,
};
pub use variant_core::{
    BinaryKind, Code, CodeWithScope, DynamicValue, Extension, FromDynamic, Kind, Map, MaxKey,
    MinKey, ObjectId, OpaqueBinary, Regex, TypeMismatch,
};

/// Converter bound to one [`ConversionConfig`].
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConversionConfig,
}

impl Converter {
    /// Create a converter with the given configuration.
    pub fn new(config: ConversionConfig) -> Self {
        init();
        Self { config }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Encode a document value.
    pub fn to_document(&self, value: &DynamicValue) -> Result<RawDocumentBuf> {
        Encoder::new(&self.config).encode_document(value)
    }

    /// Decode a document.
    pub fn from_document(&self, document: &RawDocument) -> Result<Map> {
        Decoder::new(&self.config).decode_document(document)
    }

    /// Decode a document from its serialized bytes.
    pub fn from_slice(&self, bytes: &[u8]) -> Result<Map> {
        let document = RawDocument::from_bytes(bytes)?;
        self.from_document(document)
    }

    /// Decode a parsed [`bson::Document`].
    pub fn from_bson_document(&self, document: &bson::Document) -> Result<Map> {
        let raw = RawDocumentBuf::from_document(document)?;
        self.from_document(&raw)
    }

    /// Decode a single element.
    pub fn from_value(&self, value: RawBsonRef<'_>) -> Result<DynamicValue> {
        Decoder::new(&self.config).decode_value(value)
    }

    /// Fail-soft [`to_document`](Self::to_document).
    pub fn to_document_soft(&self, value: &DynamicValue) -> (RawDocumentBuf, bool) {
        soften("to_document", self.to_document(value), RawDocumentBuf::new)
    }

    /// Fail-soft [`from_document`](Self::from_document).
    pub fn from_document_soft(&self, document: &RawDocument) -> (Map, bool) {
        soften("from_document", self.from_document(document), Map::new)
    }

    /// Fail-soft [`from_slice`](Self::from_slice).
    pub fn from_slice_soft(&self, bytes: &[u8]) -> (Map, bool) {
        soften("from_slice", self.from_slice(bytes), Map::new)
    }

    /// Fail-soft [`from_value`](Self::from_value).
    pub fn from_value_soft(&self, value: RawBsonRef<'_>) -> (DynamicValue, bool) {
        soften("from_value", self.from_value(value), || DynamicValue::Null)
    }
}

fn soften<T>(operation: &str, result: Result<T>, empty: impl FnOnce() -> T) -> (T, bool) {
    match result {
        Ok(value) => (value, true),
        Err(e) => {
            debug!("{operation} failed: {e}");
            (empty(), false)
        }
    }
}

/// Encode a document value with the default configuration.
pub fn to_document(value: &DynamicValue) -> Result<RawDocumentBuf> {
    Converter::default().to_document(value)
}

/// Decode a document with the default configuration.
pub fn from_document(document: &RawDocument) -> Result<Map> {
    Converter::default().from_document(document)
}

/// Decode serialized document bytes with the default configuration.
pub fn from_slice(bytes: &[u8]) -> Result<Map> {
    Converter::default().from_slice(bytes)
}

/// Decode a parsed [`bson::Document`] with the default configuration.
pub fn from_bson_document(document: &bson::Document) -> Result<Map> {
    Converter::default().from_bson_document(document)
}

/// Decode a single element with the default configuration.
pub fn from_value(value: RawBsonRef<'_>) -> Result<DynamicValue> {
    Converter::default().from_value(value)
}

/// Fail-soft [`to_document`].
pub fn to_document_soft(value: &DynamicValue) -> (RawDocumentBuf, bool) {
    Converter::default().to_document_soft(value)
}

/// Fail-soft [`from_document`].
pub fn from_document_soft(document: &RawDocument) -> (Map, bool) {
    Converter::default().from_document_soft(document)
}

/// Fail-soft [`from_slice`].
pub fn from_slice_soft(bytes: &[u8]) -> (Map, bool) {
    Converter::default().from_slice_soft(bytes)
}

/// Fail-soft [`from_value`].
pub fn from_value_soft(value: RawBsonRef<'_>) -> (DynamicValue, bool) {
    Converter::default().from_value_soft(value)
}
