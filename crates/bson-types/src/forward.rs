//! Forward conversion: DynamicValue → BSON document.
//!
//! The encoder walks the value tree depth-first. Every nested document or
//! array is finished before its parent, moved into the per-call
//! [`BufferArena`], and referenced from the parent through a `RawBsonRef`
//! view. Host-only values go through the extension codec and coercible kinds
//! through the coercion table. The first failure aborts the whole call.
//!
//! Document fields are appended by reference, so a field's bytes are copied
//! once, straight into the parent buffer. `RawArrayBuf` only accepts owned
//! values, so array elements take one extra owned copy before being written.

use crate::arena::BufferArena;
use crate::config::ConversionConfig;
use crate::error::{ConversionError, Result};
use crate::extension::{binary_kind_to_subtype, serialize_opaque, validate_extension};
use crate::registry;
use bson::raw::{
    RawArrayBuf, RawBinaryRef, RawBsonRef, RawDocumentBuf, RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
};
use bson::spec::BinarySubtype;
use bson::DateTime as BsonDateTime;
use tracing::{debug, trace};
use variant_core::{DynamicValue, Kind, Map};

/// Coercion targets, in priority order, for kinds with no direct mapping.
pub const COERCION_ORDER: [Kind; 5] = [
    Kind::Document,
    Kind::Array,
    Kind::Int64,
    Kind::Int32,
    Kind::String,
];

/// Encoder from dynamic values to BSON documents.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'c> {
    config: &'c ConversionConfig,
}

impl<'c> Encoder<'c> {
    /// Create an encoder using `config`.
    pub fn new(config: &'c ConversionConfig) -> Self {
        registry::init();
        Self { config }
    }

    /// Encode a top-level value, which must be a [`DynamicValue::Document`].
    pub fn encode_document(&self, value: &DynamicValue) -> Result<RawDocumentBuf> {
        match value {
            DynamicValue::Document(map) => self.encode_map(map),
            other => Err(ConversionError::NotADocument(other.kind())),
        }
    }

    /// Encode an ordered map into a self-owned BSON document.
    pub fn encode_map(&self, map: &Map) -> Result<RawDocumentBuf> {
        let arena = BufferArena::new();
        let document = self.build_document(map, &arena, 0)?;
        let stats = arena.stats();
        debug!(
            "Encoded document with {} fields into {} bytes (arena: {} buffers, {} values, {} documents, {} arrays)",
            map.len(),
            document.as_bytes().len(),
            stats.buffers,
            stats.values,
            stats.documents,
            stats.arrays
        );
        Ok(document)
    }

    /// Encode a single value into a view whose storage lives in `arena` or in
    /// `value` itself.
    pub fn encode_value<'a>(
        &self,
        value: &'a DynamicValue,
        arena: &'a BufferArena,
    ) -> Result<RawBsonRef<'a>> {
        self.encode_at(value, arena, 0)
    }

    fn encode_at<'a>(
        &self,
        value: &'a DynamicValue,
        arena: &'a BufferArena,
        depth: usize,
    ) -> Result<RawBsonRef<'a>> {
        let encoded = match value {
            // Scalars
            DynamicValue::Null => RawBsonRef::Null,
            DynamicValue::Bool(b) => RawBsonRef::Boolean(*b),
            DynamicValue::Int32(i) => RawBsonRef::Int32(*i),
            DynamicValue::Int64(i) => RawBsonRef::Int64(*i),
            DynamicValue::UInt32(u) => RawBsonRef::Int64(i64::from(*u)),
            DynamicValue::Double(f) => RawBsonRef::Double(*f),
            DynamicValue::String(s) => RawBsonRef::String(s.as_str()),
            // BSON keeps millisecond precision
            DynamicValue::DateTime(dt) => RawBsonRef::DateTime(BsonDateTime::from_chrono(*dt)),

            // Binary types
            DynamicValue::Bytes(bytes) => RawBsonRef::Binary(RawBinaryRef {
                subtype: BinarySubtype::Generic,
                bytes,
            }),
            DynamicValue::Binary(bin) => RawBsonRef::Binary(RawBinaryRef {
                subtype: binary_kind_to_subtype(bin.kind),
                bytes: &bin.bytes,
            }),
            DynamicValue::Uuid(u) => RawBsonRef::Binary(RawBinaryRef {
                subtype: BinarySubtype::Uuid,
                bytes: u.as_bytes(),
            }),

            // Containers
            DynamicValue::Array(values) => {
                let array = self.build_array(values, arena, depth + 1)?;
                RawBsonRef::Array(arena.alloc_array(array))
            }
            DynamicValue::StringList(list) => {
                check_depth(depth + 1, self.config.max_depth)?;
                let mut array = RawArrayBuf::new();
                for s in list {
                    array.push(s.as_str());
                }
                RawBsonRef::Array(arena.alloc_array(array))
            }
            DynamicValue::Document(map) => {
                let document = self.build_document(map, arena, depth + 1)?;
                RawBsonRef::Document(arena.alloc_document(document))
            }

            // BSON-specific kinds
            DynamicValue::ObjectId(oid) => {
                RawBsonRef::ObjectId(bson::oid::ObjectId::from_bytes(oid.bytes()))
            }
            DynamicValue::Regex(re) => {
                check_cstring("Regex pattern", &re.pattern)?;
                check_cstring("Regex options", &re.options)?;
                RawBsonRef::RegularExpression(RawRegexRef {
                    pattern: &re.pattern,
                    options: &re.options,
                })
            }
            DynamicValue::Code(code) => RawBsonRef::JavaScriptCode(&code.source),
            DynamicValue::CodeWithScope(cws) => {
                let scope = self.build_document(&cws.scope, arena, depth + 1)?;
                RawBsonRef::JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef {
                    code: &cws.source,
                    scope: arena.alloc_document(scope),
                })
            }
            DynamicValue::MinKey(_) => RawBsonRef::MinKey,
            DynamicValue::MaxKey(_) => RawBsonRef::MaxKey,

            // Host-only kinds travel as extension payloads
            DynamicValue::Date(_) | DynamicValue::Time(_) => self.encode_extension(value, arena)?,
            DynamicValue::Extension(ext) => {
                validate_extension(ext)?;
                self.encode_extension(value, arena)?
            }

            // Everything else goes through the coercion table
            DynamicValue::UInt64(_)
            | DynamicValue::Int16(_)
            | DynamicValue::Char(_)
            | DynamicValue::Pairs(_) => self.encode_coerced(value, arena, depth)?,
        };
        Ok(encoded)
    }

    fn build_document<'a>(
        &self,
        map: &'a Map,
        arena: &'a BufferArena,
        depth: usize,
    ) -> Result<RawDocumentBuf> {
        check_depth(depth, self.config.max_depth)?;
        let mut document = RawDocumentBuf::new();
        for (key, value) in map {
            check_cstring("Document key", key)?;
            let view = self.encode_at(value, arena, depth)?;
            document.append_ref(key, view);
        }
        Ok(document)
    }

    fn build_array<'a>(
        &self,
        values: &'a [DynamicValue],
        arena: &'a BufferArena,
        depth: usize,
    ) -> Result<RawArrayBuf> {
        check_depth(depth, self.config.max_depth)?;
        let mut array = RawArrayBuf::new();
        for value in values {
            let view = self.encode_at(value, arena, depth)?;
            array.push(view.to_raw_bson());
        }
        Ok(array)
    }

    fn encode_extension<'a>(
        &self,
        value: &'a DynamicValue,
        arena: &'a BufferArena,
    ) -> Result<RawBsonRef<'a>> {
        let bytes = arena.alloc_bytes(serialize_opaque(value, self.config)?);
        Ok(RawBsonRef::Binary(RawBinaryRef {
            subtype: self.config.user_binary_subtype(),
            bytes,
        }))
    }

    fn encode_coerced<'a>(
        &self,
        value: &'a DynamicValue,
        arena: &'a BufferArena,
        depth: usize,
    ) -> Result<RawBsonRef<'a>> {
        let target = COERCION_ORDER
            .iter()
            .copied()
            .find(|kind| value.can_coerce_to(*kind))
            .ok_or_else(|| ConversionError::unsupported_kind(value.kind()))?;
        trace!("Coercing {} to {target}", value.kind());
        let coerced = arena.alloc_value(value.coerce_to(target)?);
        self.encode_at(coerced, arena, depth)
    }
}

fn check_depth(depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        return Err(ConversionError::DepthLimitExceeded(max_depth));
    }
    Ok(())
}

/// Keys and regex components are NUL-terminated in BSON.
fn check_cstring(context: &'static str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(ConversionError::InvalidCString {
            context,
            value: value.to_string(),
        });
    }
    Ok(())
}
