//! Default fill values.
//!
//! These are a public contract and must match the netCDF library bit for bit.

use crate::NcType;
use crate::scalar::Scalar;

pub const FILL_BYTE: i8 = -127;
pub const FILL_CHAR: u8 = 0;
pub const FILL_SHORT: i16 = -32767;
pub const FILL_INT: i32 = -2147483647;
pub const FILL_FLOAT: f32 = 9.969_209_968_386_869e36;
pub const FILL_DOUBLE: f64 = 9.969_209_968_386_869e36;
pub const FILL_UBYTE: u8 = 255;
pub const FILL_USHORT: u16 = 65535;
pub const FILL_UINT: u32 = 4_294_967_295;
pub const FILL_INT64: i64 = -9_223_372_036_854_775_806;
pub const FILL_UINT64: u64 = 18_446_744_073_709_551_614;
pub const FILL_STRING: &[u8] = b"\0";
/// Two zero nibbles; widened to the opaque's full size on emission.
pub const FILL_OPAQUE: &str = "00";

/// Default value for a primitive or opaque type code.
///
/// Returns `None` for classes whose default is structural (compound, vlen)
/// or derived from a basetype (enum).
pub fn default_fill(typecode: NcType) -> Option<Scalar> {
    Some(match typecode {
        NcType::Byte => Scalar::Byte(FILL_BYTE),
        NcType::Char => Scalar::Char(FILL_CHAR),
        NcType::Short => Scalar::Short(FILL_SHORT),
        NcType::Int => Scalar::Int(FILL_INT),
        NcType::Float => Scalar::Float(FILL_FLOAT),
        NcType::Double => Scalar::Double(FILL_DOUBLE),
        NcType::UByte => Scalar::UByte(FILL_UBYTE),
        NcType::UShort => Scalar::UShort(FILL_USHORT),
        NcType::UInt => Scalar::UInt(FILL_UINT),
        NcType::Int64 => Scalar::Int64(FILL_INT64),
        NcType::UInt64 => Scalar::UInt64(FILL_UINT64),
        NcType::String => Scalar::String(FILL_STRING.to_vec()),
        NcType::Opaque => Scalar::Opaque(FILL_OPAQUE.to_string()),
        NcType::Nat | NcType::Vlen | NcType::Enum | NcType::Compound => return None,
    })
}
