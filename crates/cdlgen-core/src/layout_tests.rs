use crate::NcType;
use crate::layout::{VlenRepr, alignment, native_size, padding};

#[test]
fn alignments_match_native_type_alignment() {
    assert_eq!(alignment(NcType::Char), 1);
    assert_eq!(alignment(NcType::Byte), 1);
    assert_eq!(alignment(NcType::Short), std::mem::align_of::<i16>());
    assert_eq!(alignment(NcType::Int), std::mem::align_of::<i32>());
    assert_eq!(alignment(NcType::Double), std::mem::align_of::<f64>());
    assert_eq!(alignment(NcType::Int64), std::mem::align_of::<i64>());
    assert_eq!(alignment(NcType::String), std::mem::align_of::<*const u8>());
}

#[test]
fn opaque_and_vlen_use_their_own_probes() {
    assert_eq!(alignment(NcType::Opaque), alignment(NcType::UByte));
    assert_eq!(alignment(NcType::Vlen), std::mem::align_of::<VlenRepr>());
}

#[test]
fn native_sizes() {
    assert_eq!(native_size(NcType::Short), Some(2));
    assert_eq!(native_size(NcType::UInt64), Some(8));
    assert_eq!(native_size(NcType::Vlen), Some(std::mem::size_of::<VlenRepr>()));
    assert_eq!(native_size(NcType::Compound), None);
}

#[test]
fn padding_rounds_up_to_alignment() {
    assert_eq!(padding(0, 8), 0);
    assert_eq!(padding(1, 4), 3);
    assert_eq!(padding(6, 2), 0);
    assert_eq!(padding(5, 1), 0);
}
