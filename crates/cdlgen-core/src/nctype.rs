//! netCDF type codes.

use std::fmt;

use serde::Serialize;

/// Type code of a value or type node.
///
/// Discriminants match the netCDF C library's `nc_type` numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum NcType {
    /// Not-a-type: typecode not yet assigned.
    Nat = 0,
    Byte = 1,
    Char = 2,
    Short = 3,
    Int = 4,
    Float = 5,
    Double = 6,
    UByte = 7,
    UShort = 8,
    UInt = 9,
    Int64 = 10,
    UInt64 = 11,
    String = 12,
    Vlen = 13,
    Opaque = 14,
    Enum = 15,
    Compound = 16,
}

impl NcType {
    /// All primitive type codes in numbering order.
    pub const PRIMITIVES: [NcType; 12] = [
        NcType::Byte,
        NcType::Char,
        NcType::Short,
        NcType::Int,
        NcType::Float,
        NcType::Double,
        NcType::UByte,
        NcType::UShort,
        NcType::UInt,
        NcType::Int64,
        NcType::UInt64,
        NcType::String,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            NcType::Byte
                | NcType::Char
                | NcType::Short
                | NcType::Int
                | NcType::Float
                | NcType::Double
                | NcType::UByte
                | NcType::UShort
                | NcType::UInt
                | NcType::Int64
                | NcType::UInt64
                | NcType::String
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            NcType::Byte
                | NcType::Short
                | NcType::Int
                | NcType::UByte
                | NcType::UShort
                | NcType::UInt
                | NcType::Int64
                | NcType::UInt64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, NcType::Float | NcType::Double)
    }

    /// Types representable in the classic (netCDF-3) data model.
    pub fn is_classic(self) -> bool {
        matches!(
            self,
            NcType::Byte | NcType::Char | NcType::Short | NcType::Int | NcType::Float | NcType::Double
        )
    }

    /// CDL keyword for primitives, class keyword for user types.
    pub fn cdl_name(self) -> &'static str {
        match self {
            NcType::Nat => "nat",
            NcType::Byte => "byte",
            NcType::Char => "char",
            NcType::Short => "short",
            NcType::Int => "int",
            NcType::Float => "float",
            NcType::Double => "double",
            NcType::UByte => "ubyte",
            NcType::UShort => "ushort",
            NcType::UInt => "uint",
            NcType::Int64 => "int64",
            NcType::UInt64 => "uint64",
            NcType::String => "string",
            NcType::Vlen => "vlen",
            NcType::Opaque => "opaque",
            NcType::Enum => "enum",
            NcType::Compound => "compound",
        }
    }

    /// The `NC_*` constant name used in generated C.
    pub fn nc_name(self) -> &'static str {
        match self {
            NcType::Nat => "NC_NAT",
            NcType::Byte => "NC_BYTE",
            NcType::Char => "NC_CHAR",
            NcType::Short => "NC_SHORT",
            NcType::Int => "NC_INT",
            NcType::Float => "NC_FLOAT",
            NcType::Double => "NC_DOUBLE",
            NcType::UByte => "NC_UBYTE",
            NcType::UShort => "NC_USHORT",
            NcType::UInt => "NC_UINT",
            NcType::Int64 => "NC_INT64",
            NcType::UInt64 => "NC_UINT64",
            NcType::String => "NC_STRING",
            NcType::Vlen => "NC_VLEN",
            NcType::Opaque => "NC_OPAQUE",
            NcType::Enum => "NC_ENUM",
            NcType::Compound => "NC_COMPOUND",
        }
    }

    /// C type used to declare a value of this primitive.
    pub fn c_type(self) -> Option<&'static str> {
        Some(match self {
            NcType::Char => "char",
            NcType::Byte => "signed char",
            NcType::Short => "short",
            NcType::Int => "int",
            NcType::Float => "float",
            NcType::Double => "double",
            NcType::UByte => "unsigned char",
            NcType::UShort => "unsigned short",
            NcType::UInt => "unsigned int",
            NcType::Int64 => "signed long long",
            NcType::UInt64 => "unsigned long long",
            NcType::String => "char*",
            _ => return None,
        })
    }

    /// Suffix of the `nc_put_att_*` function family.
    pub fn c_put_suffix(self) -> Option<&'static str> {
        Some(match self {
            NcType::Char => "text",
            NcType::Byte => "schar",
            NcType::Short => "short",
            NcType::Int => "int",
            NcType::Float => "float",
            NcType::Double => "double",
            NcType::UByte => "ubyte",
            NcType::UShort => "ushort",
            NcType::UInt => "uint",
            NcType::Int64 => "longlong",
            NcType::UInt64 => "ulonglong",
            NcType::String => "string",
            _ => return None,
        })
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cdl_name())
    }
}
