use bson::raw::{RawBson, RawBsonRef};
use bson::rawdoc;
use bson::spec::BinarySubtype;
use std::thread;
use variant_bson::{
    from_document_soft, from_slice, from_slice_soft, from_value, from_value_soft, init,
    to_document, to_document_soft, BincodeSerializer, ConversionError, DynamicValue, Extension,
    ExtensionSerializer, Kind,
};

/// `levels` documents, each the only field `a` of its parent.
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
fn test_fail_soft_returns_empty_document() {
    let value = DynamicValue::document([
        ("ok", DynamicValue::Int32(1)),
        (
            "bad",
            DynamicValue::Extension(Extension::new("failures.NotRegistered", DynamicValue::Null)),
        ),
    ]);

    let (doc, ok) = to_document_soft(&value);
    assert!(!ok);
    assert_eq!(doc.as_bytes().len(), 5);

    // The fail-fast form reports the same failure
    assert!(matches!(
        to_document(&value),
        Err(ConversionError::UnsupportedType(_))
    ));
}

#[test]
fn test_fail_soft_success_flag() {
    let (doc, ok) = to_document_soft(&DynamicValue::document([("a", DynamicValue::Bool(true))]));
    assert!(ok);
    let (map, ok) = from_document_soft(&doc);
    assert!(ok);
    assert_eq!(map["a"], DynamicValue::Bool(true));
}

#[test]
fn test_non_document_top_level() {
    assert!(matches!(
        to_document(&DynamicValue::array([])),
        Err(ConversionError::NotADocument(Kind::Array))
    ));
    let (_, ok) = to_document_soft(&DynamicValue::string("nope"));
    assert!(!ok);
}

#[test]
fn test_truncated_bytes() {
    let doc = rawdoc! { "name": "Alice", "age": 30i32 };
    let bytes = doc.as_bytes();
    let truncated = &bytes[..bytes.len() - 3];

    assert!(matches!(
        from_slice(truncated),
        Err(ConversionError::UnderlyingFormat(_))
    ));

    let (map, ok) = from_slice_soft(truncated);
    assert!(!ok);
    assert!(map.is_empty());
}

#[test]
fn test_unsupported_element_carries_tag() {
    let doc = rawdoc! { "sym": bson::RawBson::Symbol("s".to_string()) };
    let err = variant_bson::from_document(&doc).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Symbol"), "{message}");
    assert!(message.contains("0x0e"), "{message}");
}

#[test]
fn test_from_value() {
    assert_eq!(from_value(RawBsonRef::Int64(7)).unwrap(), DynamicValue::Int64(7));

    let (value, ok) = from_value_soft(RawBsonRef::Symbol("s"));
    assert!(!ok);
    assert!(value.is_null());
}

#[test]
fn test_concurrent_init() {
    let handles: Vec<_> = (0..32)
        .map(|_| {
            thread::spawn(|| {
                init();
                let value = DynamicValue::document([(
                    "code",
                    DynamicValue::Extension(Extension::new(
                        "bson.Code",
                        DynamicValue::Code(variant_bson::Code::new("x")),
                    )),
                )]);
                to_document(&value).is_ok()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_deeply_nested_document_fails_soft() {
    let bytes = nested_document_bytes(50_000);
    assert!(matches!(
        from_slice(&bytes),
        Err(ConversionError::DepthLimitExceeded(100))
    ));

    let (map, ok) = from_slice_soft(&bytes);
    assert!(!ok);
    assert!(map.is_empty());

    assert!(from_slice(&nested_document_bytes(50)).is_ok());
}

#[test]
fn test_deeply_nested_extension_payload_fails_soft() {
    let serializer = BincodeSerializer::new(u64::MAX);
    let one = serializer
        .serialize(&DynamicValue::array([DynamicValue::Null]))
        .unwrap();
    let null = serializer.serialize(&DynamicValue::Null).unwrap();
    let mut payload = one[..one.len() - null.len()].repeat(20_000);
    payload.extend_from_slice(&null);

    let doc = rawdoc! {
        "v": RawBson::Binary(bson::Binary {
            subtype: BinarySubtype::UserDefined(0x80),
            bytes: payload,
        }),
    };
    let (map, ok) = from_document_soft(&doc);
    assert!(!ok);
    assert!(map.is_empty());
}
