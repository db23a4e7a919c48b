use std::io::Cursor;

use kingdom_core::reader::LittleEndianReader;
use kingdom_core::serialization::error::ParseError;
use kingdom_core::serialization::primitives::{
    MAX_STRING_LEN, Primitive, decode_primitive, encode_length_prefixed_string,
    encode_string_length, read_length_prefixed_string, read_string_length,
};
use kingdom_core::serialization::wire::PrimitiveType;

fn reader(bytes: &[u8]) -> LittleEndianReader<Cursor<&[u8]>> {
    LittleEndianReader::new(Cursor::new(bytes))
}

#[test]
fn wrapping_constructors_mask_out_of_range_values() {
    assert_eq!(Primitive::int8(300), Primitive::SByte(44));
    assert_eq!(Primitive::int8(-200), Primitive::SByte(56));
    assert_eq!(Primitive::uint8(300), Primitive::Byte(44));
    assert_eq!(Primitive::uint8(-1), Primitive::Byte(255));
    assert_eq!(Primitive::int16(0x12345), Primitive::Int16(0x2345));
    assert_eq!(Primitive::uint16(-1), Primitive::UInt16(65535));
    assert_eq!(Primitive::int32(1 << 40), Primitive::Int32(0));
    assert_eq!(Primitive::uint32(-1), Primitive::UInt32(u32::MAX));
    assert_eq!(Primitive::uint64(-1), Primitive::UInt64(u64::MAX));
}

#[test]
fn in_range_values_are_unchanged() {
    assert_eq!(Primitive::int8(-128), Primitive::SByte(-128));
    assert_eq!(Primitive::int8(127), Primitive::SByte(127));
    assert_eq!(Primitive::int32(i32::MIN as i64), Primitive::Int32(i32::MIN));
    assert_eq!(Primitive::int64(i64::MAX), Primitive::Int64(i64::MAX));
}

#[test]
fn fixed_width_encode_is_little_endian() {
    let encoded = Primitive::Int32(0x0102_0304)
        .to_bytes()
        .expect("i32 encodes");
    assert_eq!(encoded, vec![0x04, 0x03, 0x02, 0x01]);

    let encoded = Primitive::UInt16(0xABCD).to_bytes().expect("u16 encodes");
    assert_eq!(encoded, vec![0xCD, 0xAB]);

    assert_eq!(
        Primitive::Boolean(true).to_bytes().expect("bool encodes"),
        vec![1]
    );
}

#[test]
fn extreme_values_survive_decode() {
    let cases: Vec<(PrimitiveType, Primitive)> = vec![
        (PrimitiveType::Int16, Primitive::Int16(i16::MIN)),
        (PrimitiveType::Int32, Primitive::Int32(i32::MAX)),
        (PrimitiveType::Int64, Primitive::Int64(i64::MIN)),
        (PrimitiveType::UInt64, Primitive::UInt64(u64::MAX)),
        (PrimitiveType::Double, Primitive::Double(f64::MIN_POSITIVE)),
        (PrimitiveType::TimeSpan, Primitive::TimeSpan(-1)),
        (PrimitiveType::DateTime, Primitive::DateTime(u64::MAX)),
    ];
    for (kind, value) in cases {
        let bytes = value.to_bytes().expect("encodes");
        let mut r = reader(&bytes);
        let decoded = decode_primitive(kind, &mut r).expect("decodes");
        assert_eq!(decoded, value);
    }
}

#[test]
fn decode_null_primitive_kind_fails() {
    let mut r = reader(&[0]);
    let err = decode_primitive(PrimitiveType::Null, &mut r).expect_err("null is not a value");
    assert!(matches!(err, ParseError::Unsupported(_)));
}

#[test]
fn truncated_primitive_is_fatal() {
    let mut r = reader(&[0x01, 0x02]);
    let err = decode_primitive(PrimitiveType::Int32, &mut r).expect_err("short read");
    assert!(matches!(err, ParseError::Truncated { .. }));
}

#[test]
fn length_prefix_layout_at_boundaries() {
    assert_eq!(encode_string_length(0).expect("0"), vec![0x00]);
    assert_eq!(encode_string_length(127).expect("127"), vec![0x7F]);
    assert_eq!(encode_string_length(128).expect("128"), vec![0x80, 0x01]);
    assert_eq!(
        encode_string_length(MAX_STRING_LEN).expect("16383"),
        vec![0xFF, 0x7F]
    );

    let err = encode_string_length(MAX_STRING_LEN + 1).expect_err("over the cap");
    assert!(matches!(err, ParseError::StringTooLong(16384)));
}

#[test]
fn length_prefix_round_trips() {
    for len in [0usize, 1, 127, 128, 300, 16383] {
        let encoded = encode_string_length(len).expect("encodes");
        let mut r = reader(&encoded);
        assert_eq!(read_string_length(&mut r).expect("decodes"), len);
    }
}

#[test]
fn second_prefix_byte_with_continuation_bit_is_rejected() {
    let mut r = reader(&[0x80, 0x80]);
    let err = read_string_length(&mut r).expect_err("third prefix byte is not allowed");
    assert!(matches!(err, ParseError::BadLengthPrefix));
}

#[test]
fn strings_round_trip_including_multibyte() {
    for value in ["", "Porthaven", "ker\u{e4}j\u{e4}", "\u{1F3F0} keep"] {
        let encoded = encode_length_prefixed_string(value).expect("encodes");
        let mut r = reader(&encoded);
        assert_eq!(read_length_prefixed_string(&mut r).expect("decodes"), value);
    }
}

#[test]
fn invalid_utf8_string_is_fatal() {
    let mut r = reader(&[0x02, 0xFF, 0xFE]);
    let err = read_length_prefixed_string(&mut r).expect_err("bad payload");
    assert!(matches!(err, ParseError::InvalidUtf8 { .. }));
}

#[test]
fn truncated_string_payload_is_fatal() {
    let mut r = reader(&[0x05, b'a', b'b']);
    let err = read_length_prefixed_string(&mut r).expect_err("short payload");
    assert!(matches!(err, ParseError::Truncated { .. }));
}

#[test]
fn char_decodes_by_lead_byte_width() {
    for value in ['A', '\u{e9}', '\u{20AC}', '\u{1F3F0}'] {
        let bytes = Primitive::Char(value).to_bytes().expect("encodes");
        let mut r = reader(&bytes);
        let decoded = decode_primitive(PrimitiveType::Char, &mut r).expect("decodes");
        assert_eq!(decoded, Primitive::Char(value));
    }
}
