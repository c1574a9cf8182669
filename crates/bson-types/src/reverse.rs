//! Reverse conversion: BSON document → DynamicValue.
//!
//! The decoder walks the raw element iterators of a document and builds an
//! owned value tree. Nothing in the result borrows from the input bytes.
//!
//! The top-level document sits at depth 0 and every nested document, array
//! or code scope one level deeper; passing `max_depth` aborts the call.

use crate::config::ConversionConfig;
use crate::error::{ConversionError, Result};
use crate::extension::{deserialize_opaque, subtype_to_binary_kind};
use crate::registry;
use bson::raw::{RawArray, RawBinaryRef, RawBsonRef, RawDocument};
use bson::spec::BinarySubtype;
use tracing::{debug, trace};
use variant_core::{
    Code, CodeWithScope, DynamicValue, Map, MaxKey, MinKey, ObjectId, OpaqueBinary, Regex,
};

/// Decoder from BSON documents to dynamic values.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'c> {
    config: &'c ConversionConfig,
}

impl<'c> Decoder<'c> {
    /// Create a decoder using `config`.
    pub fn new(config: &'c ConversionConfig) -> Self {
        registry::init();
        Self { config }
    }

    /// Decode a document into an ordered map.
    pub fn decode_document(&self, document: &RawDocument) -> Result<Map> {
        let map = self.decode_map(document, 0)?;
        debug!(
            "Decoded {} bytes into document with {} fields",
            document.as_bytes().len(),
            map.len()
        );
        Ok(map)
    }

    /// Decode a single element.
    pub fn decode_value(&self, value: RawBsonRef<'_>) -> Result<DynamicValue> {
        self.decode_at(value, 0)
    }

    fn decode_at(&self, value: RawBsonRef<'_>, depth: usize) -> Result<DynamicValue> {
        let decoded = match value {
            // Scalars
            RawBsonRef::Null | RawBsonRef::Undefined => DynamicValue::Null,
            RawBsonRef::Boolean(b) => DynamicValue::Bool(b),
            RawBsonRef::Int32(i) => DynamicValue::Int32(i),
            RawBsonRef::Int64(i) => DynamicValue::Int64(i),
            RawBsonRef::Double(f) => DynamicValue::Double(f),
            RawBsonRef::String(s) => DynamicValue::String(s.to_string()),
            RawBsonRef::DateTime(dt) => DynamicValue::DateTime(dt.to_chrono()),

            RawBsonRef::Binary(bin) => self.decode_binary(bin)?,

            // Containers
            RawBsonRef::Array(array) => DynamicValue::Array(self.decode_array(array, depth + 1)?),
            RawBsonRef::Document(document) => {
                DynamicValue::Document(self.decode_map(document, depth + 1)?)
            }

            // BSON-specific kinds
            RawBsonRef::ObjectId(oid) => DynamicValue::ObjectId(ObjectId::from_bytes(oid.bytes())),
            RawBsonRef::RegularExpression(re) => {
                DynamicValue::Regex(Regex::new(re.pattern, re.options))
            }
            RawBsonRef::JavaScriptCode(source) => DynamicValue::Code(Code::new(source)),
            RawBsonRef::JavaScriptCodeWithScope(cws) => DynamicValue::CodeWithScope(
                CodeWithScope::new(cws.code, self.decode_map(cws.scope, depth + 1)?),
            ),
            RawBsonRef::MinKey => DynamicValue::MinKey(MinKey),
            RawBsonRef::MaxKey => DynamicValue::MaxKey(MaxKey),

            // Timestamp, Symbol, Decimal128, DbPointer
            other => return Err(ConversionError::unsupported_element(other.element_type())),
        };
        Ok(decoded)
    }

    fn decode_map(&self, document: &RawDocument, depth: usize) -> Result<Map> {
        self.check_depth(depth)?;
        let mut map = Map::new();
        for element in document {
            let (key, value) = element?;
            // Duplicate keys keep the first position and the last value
            map.insert(key.to_string(), self.decode_at(value, depth)?);
        }
        Ok(map)
    }

    fn decode_array(&self, array: &RawArray, depth: usize) -> Result<Vec<DynamicValue>> {
        self.check_depth(depth)?;
        let mut values = Vec::new();
        for element in array {
            values.push(self.decode_at(element?, depth)?);
        }
        Ok(values)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(ConversionError::DepthLimitExceeded(self.config.max_depth));
        }
        Ok(())
    }

    fn decode_binary(&self, bin: RawBinaryRef<'_>) -> Result<DynamicValue> {
        match bin.subtype {
            BinarySubtype::Generic | BinarySubtype::BinaryOld => {
                Ok(DynamicValue::Bytes(bin.bytes.to_vec()))
            }
            BinarySubtype::Uuid | BinarySubtype::UuidOld => {
                let bytes: [u8; 16] = bin
                    .bytes
                    .try_into()
                    .map_err(|_| ConversionError::InvalidUuid(bin.bytes.len()))?;
                Ok(DynamicValue::Uuid(uuid::Uuid::from_bytes(bytes)))
            }
            BinarySubtype::UserDefined(subtype) if subtype == self.config.user_subtype => {
                trace!("Decoding {} byte extension payload", bin.bytes.len());
                deserialize_opaque(bin.bytes, self.config)
            }
            subtype => match subtype_to_binary_kind(subtype) {
                Some(kind) => Ok(DynamicValue::Binary(OpaqueBinary::new(kind, bin.bytes))),
                None => Err(ConversionError::UnsupportedType(format!(
                    "binary subtype {subtype:?}"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::raw::{RawBson, RawDocumentBuf, RawJavaScriptCodeWithScope};
    use bson::{rawdoc, Binary, DateTime as BsonDateTime};
    use chrono::{Datelike, NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use variant_core::BinaryKind;

    fn decode(document: &RawDocument) -> Result<Map> {
        let config = ConversionConfig::default();
        Decoder::new(&config).decode_document(document)
    }

    #[test]
    fn test_scalar_conversion() {
        let doc = rawdoc! {
            "null": RawBson::Null,
            "undefined": RawBson::Undefined,
            "bool": true,
            "int": 42i32,
            "bigint": 42i64,
            "double": 2.5,
            "text": "hello",
        };
        let map = decode(&doc).unwrap();

        assert!(matches!(map["null"], DynamicValue::Null));
        assert!(matches!(map["undefined"], DynamicValue::Null));
        assert!(matches!(map["bool"], DynamicValue::Bool(true)));
        assert!(matches!(map["int"], DynamicValue::Int32(42)));
        assert!(matches!(map["bigint"], DynamicValue::Int64(42)));
        assert_eq!(map["double"], DynamicValue::Double(2.5));
        assert_eq!(map["text"], DynamicValue::string("hello"));
    }

    #[test]
    fn test_datetime_conversion() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let doc = rawdoc! { "at": BsonDateTime::from_chrono(dt) };
        let map = decode(&doc).unwrap();
        if let DynamicValue::DateTime(back) = &map["at"] {
            assert_eq!(back.year(), 2024);
            assert_eq!(*back, dt);
        } else {
            panic!("Expected DateTime");
        }
    }

    #[test]
    fn test_binary_subtypes() {
        let doc = rawdoc! {
            "generic": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
            "old": Binary { subtype: BinarySubtype::BinaryOld, bytes: vec![4] },
            "md5": Binary { subtype: BinarySubtype::Md5, bytes: vec![0xAB; 16] },
            "func": Binary { subtype: BinarySubtype::Function, bytes: b"f".to_vec() },
            "uuid": Binary { subtype: BinarySubtype::Uuid, bytes: vec![7; 16] },
        };
        let map = decode(&doc).unwrap();

        assert_eq!(map["generic"], DynamicValue::Bytes(vec![1, 2, 3]));
        assert_eq!(map["old"], DynamicValue::Bytes(vec![4]));
        if let DynamicValue::Binary(bin) = &map["md5"] {
            assert_eq!(bin.kind, BinaryKind::Md5);
            assert_eq!(bin.bytes.len(), 16);
        } else {
            panic!("Expected Binary");
        }
        assert!(matches!(
            &map["func"],
            DynamicValue::Binary(OpaqueBinary { kind: BinaryKind::Function, .. })
        ));
        assert_eq!(map["uuid"], DynamicValue::Uuid(uuid::Uuid::from_bytes([7; 16])));
    }

    #[test]
    fn test_uuid_wrong_length() {
        let doc = rawdoc! {
            "uuid": Binary { subtype: BinarySubtype::Uuid, bytes: vec![1; 15] },
        };
        assert!(matches!(decode(&doc), Err(ConversionError::InvalidUuid(15))));
    }

    #[test]
    fn test_unknown_user_subtype_unsupported() {
        let doc = rawdoc! {
            "x": Binary { subtype: BinarySubtype::UserDefined(0x90), bytes: vec![1] },
        };
        assert!(matches!(decode(&doc), Err(ConversionError::UnsupportedType(_))));
    }

    #[test]
    fn test_extension_payload() {
        let config = ConversionConfig::default();
        let date = DynamicValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let bytes = config.serializer.serialize(&date).unwrap();
        let doc = rawdoc! {
            "d": Binary { subtype: BinarySubtype::UserDefined(0x80), bytes },
        };
        let map = Decoder::new(&config).decode_document(&doc).unwrap();
        assert_eq!(map["d"], date);

        let bad = rawdoc! {
            "d": Binary { subtype: BinarySubtype::UserDefined(0x80), bytes: vec![0xff; 3] },
        };
        assert!(matches!(
            decode(&bad),
            Err(ConversionError::MalformedExtensionPayload { .. })
        ));
    }

    #[test]
    fn test_bson_specific_kinds() {
        let oid = bson::oid::ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let mut doc = rawdoc! {
            "id": oid,
            "re": bson::Regex { pattern: "^a".to_string(), options: "im".to_string() },
            "code": RawBson::JavaScriptCode("return 1;".to_string()),
            "min": RawBson::MinKey,
            "max": RawBson::MaxKey,
        };
        doc.append(
            "scoped",
            RawBson::JavaScriptCodeWithScope(RawJavaScriptCodeWithScope {
                code: "return x;".to_string(),
                scope: rawdoc! { "x": 1i32 },
            }),
        );
        let map = decode(&doc).unwrap();

        if let DynamicValue::ObjectId(id) = &map["id"] {
            assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
            assert_eq!(id.timestamp().timestamp(), 0x507f1f77);
        } else {
            panic!("Expected ObjectId");
        }
        assert_eq!(map["re"], DynamicValue::Regex(Regex::new("^a", "im")));
        assert_eq!(map["code"], DynamicValue::Code(Code::new("return 1;")));
        if let DynamicValue::CodeWithScope(cws) = &map["scoped"] {
            assert_eq!(cws.source, "return x;");
            assert_eq!(cws.scope["x"], DynamicValue::Int32(1));
        } else {
            panic!("Expected CodeWithScope");
        }
        assert!(matches!(map["min"], DynamicValue::MinKey(_)));
        assert!(matches!(map["max"], DynamicValue::MaxKey(_)));
    }

    #[test]
    fn test_nested_order_preserved() {
        let doc = rawdoc! {
            "b": 1i32,
            "a": { "y": [3i32, "s", { "k": false }], "x": 2i32 },
            "c": 3i32,
        };
        let map = decode(&doc).unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);

        let inner = map["a"].as_document().unwrap();
        let inner_keys: Vec<&str> = inner.keys().map(String::as_str).collect();
        assert_eq!(inner_keys, vec!["y", "x"]);
        assert_eq!(
            inner["y"],
            DynamicValue::array([
                DynamicValue::Int32(3),
                DynamicValue::string("s"),
                DynamicValue::document([("k", DynamicValue::Bool(false))]),
            ])
        );
    }

    #[test]
    fn test_unsupported_elements_carry_tag() {
        let doc = rawdoc! {
            "ts": bson::Timestamp { time: 1, increment: 2 },
        };
        match decode(&doc) {
            Err(ConversionError::UnsupportedType(message)) => {
                assert!(message.contains("Timestamp"), "{message}");
                assert!(message.contains("0x11"), "{message}");
            }
            other => panic!("Expected UnsupportedType, got {other:?}"),
        }

        let doc = rawdoc! { "dec": bson::Decimal128::from_bytes([0; 16]) };
        assert!(matches!(decode(&doc), Err(ConversionError::UnsupportedType(_))));
    }

    #[test]
    fn test_corrupt_element_type() {
        let mut bytes = rawdoc! { "a": 1i32 }.into_bytes();
        bytes[4] = 0x55;
        let doc = RawDocument::from_bytes(&bytes).unwrap();
        assert!(matches!(
            decode(doc),
            Err(ConversionError::UnderlyingFormat(_))
        ));
    }

    /// `levels` documents nested under key "a", written directly as bytes.
    fn nested_document_bytes(levels: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(levels * 8 + 5);
        for i in 0..levels {
            let len = (5 + 8 * (levels - i)) as i32;
            bytes.extend_from_slice(&len.to_le_bytes());
            bytes.extend_from_slice(&[0x03, b'a', 0x00]);
        }
        bytes.extend_from_slice(&5i32.to_le_bytes());
        bytes.push(0x00);
        bytes.extend(std::iter::repeat(0x00).take(levels));
        bytes
    }

    #[test]
    fn test_nested_document_bytes_layout() {
        let bytes = nested_document_bytes(1);
        assert_eq!(bytes, rawdoc! { "a": {} }.into_bytes());
    }

    #[test]
    fn test_depth_limit() {
        let config = ConversionConfig::default().with_max_depth(100);
        let decoder = Decoder::new(&config);

        let at_limit = nested_document_bytes(100);
        let doc = RawDocument::from_bytes(&at_limit).unwrap();
        assert!(decoder.decode_document(doc).is_ok());

        let deep = nested_document_bytes(50_000);
        let doc = RawDocument::from_bytes(&deep).unwrap();
        assert!(matches!(
            decoder.decode_document(doc),
            Err(ConversionError::DepthLimitExceeded(100))
        ));
    }

    #[test]
    fn test_depth_counts_arrays_and_scopes() {
        let config = ConversionConfig::default().with_max_depth(1);
        let decoder = Decoder::new(&config);

        let doc = rawdoc! { "a": [[1i32]] };
        assert!(matches!(
            decoder.decode_document(&doc),
            Err(ConversionError::DepthLimitExceeded(1))
        ));

        let mut doc = RawDocumentBuf::new();
        doc.append(
            "f",
            RawBson::JavaScriptCodeWithScope(RawJavaScriptCodeWithScope {
                code: "x".to_string(),
                scope: rawdoc! { "inner": {} },
            }),
        );
        assert!(decoder.decode_document(&doc).is_err());
        assert!(decoder.decode_document(&rawdoc! { "a": [1i32] }).is_ok());
    }

    #[test]
    fn test_owned_result_outlives_input() {
        let map = {
            let doc: RawDocumentBuf = rawdoc! { "s": "owned" };
            decode(&doc).unwrap()
        };
        assert_eq!(map["s"], DynamicValue::string("owned"));
    }
}
