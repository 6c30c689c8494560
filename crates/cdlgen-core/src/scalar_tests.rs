use crate::fill::{FILL_FLOAT, default_fill};
use crate::scalar::{normalize_opaque, opaque_bytes};
use crate::{ConvertError, NcType, Scalar};

fn representative(t: NcType) -> Scalar {
    match t {
        NcType::Char => Scalar::Char(b'A'),
        NcType::Byte => Scalar::Byte(-5),
        NcType::Short => Scalar::Short(-300),
        NcType::Int => Scalar::Int(70_000),
        NcType::Float => Scalar::Float(2.5),
        NcType::Double => Scalar::Double(-1.25),
        NcType::UByte => Scalar::UByte(200),
        NcType::UShort => Scalar::UShort(60_000),
        NcType::UInt => Scalar::UInt(4_000_000_000),
        NcType::Int64 => Scalar::Int64(-5_000_000_000),
        NcType::UInt64 => Scalar::UInt64(10_000_000_000),
        NcType::String => Scalar::string("42"),
        other => panic!("no representative for {other}"),
    }
}

#[test]
fn widening_round_trips_are_lossless() {
    let pairs = [
        (NcType::Byte, NcType::Short),
        (NcType::Byte, NcType::Int64),
        (NcType::Short, NcType::Int),
        (NcType::Int, NcType::Int64),
        (NcType::Int, NcType::Double),
        (NcType::UByte, NcType::UShort),
        (NcType::UShort, NcType::UInt),
        (NcType::UInt, NcType::UInt64),
        (NcType::UInt, NcType::Int64),
        (NcType::Float, NcType::Double),
        (NcType::Char, NcType::Int),
        (NcType::Int64, NcType::String),
    ];
    for (src, dst) in pairs {
        let value = representative(src);
        let there = value.convert(dst).unwrap();
        assert_eq!(there.nctype(), dst);
        assert_eq!(there.convert(src).unwrap(), value, "{src} -> {dst} -> {src}");
    }
}

#[test]
fn narrowing_truncates_like_c() {
    assert_eq!(Scalar::Int(300).convert(NcType::Byte).unwrap(), Scalar::Byte(44));
    assert_eq!(Scalar::Int(-1).convert(NcType::UShort).unwrap(), Scalar::UShort(65535));
    assert_eq!(Scalar::Double(3.9).convert(NcType::Int).unwrap(), Scalar::Int(3));
}

#[test]
fn strings_parse_as_numbers() {
    assert_eq!(Scalar::string(" 17 ").convert(NcType::Short).unwrap(), Scalar::Short(17));
    assert_eq!(Scalar::string("1.5").convert(NcType::Float).unwrap(), Scalar::Float(1.5));
    assert_eq!(Scalar::string("2.0").convert(NcType::Int).unwrap(), Scalar::Int(2));
    assert_eq!(Scalar::string("xyz").convert(NcType::Char).unwrap(), Scalar::Char(b'x'));
    assert_eq!(Scalar::string("").convert(NcType::Char).unwrap(), Scalar::Char(0));

    let err = Scalar::string("abc").convert(NcType::Int).unwrap_err();
    insta::assert_snapshot!(err, @r#"cannot convert "abc" to int"#);
}

#[test]
fn opaque_conversions() {
    assert_eq!(Scalar::Int(255).convert(NcType::Opaque).unwrap(), Scalar::Opaque("ff".into()));
    assert_eq!(
        Scalar::Opaque("0102".into()).convert(NcType::Int).unwrap(),
        Scalar::Int(258)
    );
    assert_eq!(
        Scalar::string("0xABcd").convert(NcType::Opaque).unwrap(),
        Scalar::Opaque("abcd".into())
    );
    assert!(matches!(
        Scalar::string("0xZZ").convert(NcType::Opaque),
        Err(ConvertError::BadString { .. })
    ));
}

#[test]
fn opaque_normalization_pads_right_and_truncates() {
    assert_eq!(normalize_opaque("ab", 3), "ab0000");
    assert_eq!(normalize_opaque("0123456789", 2), "0123");
    assert_eq!(opaque_bytes("00ff10").unwrap(), vec![0x00, 0xff, 0x10]);
    assert!(opaque_bytes("abc").is_err());
}

#[test]
fn fill_values_are_fixed() {
    assert_eq!(default_fill(NcType::Byte), Some(Scalar::Byte(-127)));
    assert_eq!(default_fill(NcType::Int), Some(Scalar::Int(-2147483647)));
    assert_eq!(default_fill(NcType::UInt64), Some(Scalar::UInt64(18446744073709551614)));
    assert_eq!(default_fill(NcType::String), Some(Scalar::string(b"\0".to_vec())));
    assert_eq!(default_fill(NcType::Opaque), Some(Scalar::Opaque("00".into())));
    assert_eq!(default_fill(NcType::Compound), None);
    assert_eq!(FILL_FLOAT.to_bits(), 0x7cf0_0000);
}

#[test]
fn compound_targets_are_rejected() {
    let err = Scalar::Int(1).convert(NcType::Compound).unwrap_err();
    insta::assert_snapshot!(err, @"cannot convert int to compound");
}
