//! Native sizes and struct alignments of primitive values.
//!
//! Alignments are probed once from real `#[repr(C)]` layouts: for each
//! primitive, the offset a field of that type receives right after a single
//! `char` field. This reproduces what the platform C compiler does when the
//! netCDF library reads a compound value out of memory.

use std::ffi::c_void;
use std::mem::{offset_of, size_of};
use std::sync::LazyLock;

use crate::NcType;

#[allow(dead_code)]
#[repr(C)]
struct Probe<T> {
    _c: u8,
    value: T,
}

/// In-memory form of a vlen instance: `nc_vlen_t`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VlenRepr {
    pub len: usize,
    pub p: *const c_void,
}

/// Probed alignment per alignment key.
#[derive(Clone, Copy, Debug)]
pub struct AlignmentTable {
    char_: usize,
    byte: usize,
    short: usize,
    int: usize,
    float: usize,
    double: usize,
    ubyte: usize,
    ushort: usize,
    uint: usize,
    int64: usize,
    uint64: usize,
    pointer: usize,
    vlen: usize,
}

impl AlignmentTable {
    fn probe() -> Self {
        Self {
            char_: offset_of!(Probe<u8>, value),
            byte: offset_of!(Probe<i8>, value),
            short: offset_of!(Probe<i16>, value),
            int: offset_of!(Probe<i32>, value),
            float: offset_of!(Probe<f32>, value),
            double: offset_of!(Probe<f64>, value),
            ubyte: offset_of!(Probe<u8>, value),
            ushort: offset_of!(Probe<u16>, value),
            uint: offset_of!(Probe<u32>, value),
            int64: offset_of!(Probe<i64>, value),
            uint64: offset_of!(Probe<u64>, value),
            pointer: offset_of!(Probe<*const u8>, value),
            vlen: offset_of!(Probe<VlenRepr>, value),
        }
    }

    /// Alignment keyed by type code.
    ///
    /// Opaque uses the unsigned-byte probe and vlen the `{len, ptr}` probe.
    pub fn get(&self, typecode: NcType) -> usize {
        match typecode {
            NcType::Char => self.char_,
            NcType::Byte => self.byte,
            NcType::Short => self.short,
            NcType::Int => self.int,
            NcType::Float => self.float,
            NcType::Double => self.double,
            NcType::UByte | NcType::Opaque => self.ubyte,
            NcType::UShort => self.ushort,
            NcType::UInt => self.uint,
            NcType::Int64 => self.int64,
            NcType::UInt64 => self.uint64,
            NcType::String => self.pointer,
            NcType::Vlen => self.vlen,
            NcType::Nat | NcType::Enum | NcType::Compound => {
                panic!("alignment of {typecode} depends on its basetype or fields")
            }
        }
    }
}

static ALIGNMENTS: LazyLock<AlignmentTable> = LazyLock::new(AlignmentTable::probe);

/// The process-wide probed alignment table.
pub fn alignments() -> &'static AlignmentTable {
    &ALIGNMENTS
}

/// Shorthand for `alignments().get(typecode)`.
pub fn alignment(typecode: NcType) -> usize {
    ALIGNMENTS.get(typecode)
}

/// Native in-memory size of a primitive or vlen value.
///
/// Strings are `char*` pointers. Returns `None` for user types whose size is
/// declared (opaque) or computed (enum, compound).
pub fn native_size(typecode: NcType) -> Option<usize> {
    Some(match typecode {
        NcType::Char | NcType::Byte | NcType::UByte => 1,
        NcType::Short | NcType::UShort => 2,
        NcType::Int | NcType::UInt | NcType::Float => 4,
        NcType::Double | NcType::Int64 | NcType::UInt64 => 8,
        NcType::String => size_of::<*const u8>(),
        NcType::Vlen => size_of::<VlenRepr>(),
        NcType::Nat | NcType::Opaque | NcType::Enum | NcType::Compound => return None,
    })
}

/// Bytes needed to move `offset` up to the next multiple of `align`.
pub fn padding(offset: usize, align: usize) -> usize {
    if align <= 1 {
        return 0;
    }
    let rem = offset % align;
    if rem == 0 { 0 } else { align - rem }
}
