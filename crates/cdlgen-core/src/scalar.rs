//! Primitive values and C-style conversion between them.
//!
//! Conversion follows the rules a C compiler applies to casts between the
//! corresponding C types, extended with text and opaque forms:
//! - numeric to numeric: `as` casts (truncating, wrapping or saturating)
//! - char to/from integers: by code
//! - string to number: parse the trimmed text
//! - number to string: decimal text
//! - opaque to/from integers: big-endian hex nibbles

use serde::Serialize;

use crate::NcType;

/// A primitive constant value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Scalar {
    Char(u8),
    Byte(i8),
    Short(i16),
    Int(i32),
    Float(f32),
    Double(f64),
    UByte(u8),
    UShort(u16),
    UInt(u32),
    Int64(i64),
    UInt64(u64),
    /// Raw bytes; not NUL-terminated.
    String(Vec<u8>),
    /// Lowercase hex nibbles without a `0x` prefix.
    Opaque(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("cannot convert {from} to {to}")]
    Unsupported { from: NcType, to: NcType },
    #[error("cannot convert \"{text}\" to {to}")]
    BadString { text: String, to: NcType },
    #[error("malformed opaque constant 0x{0}")]
    BadOpaque(String),
}

/// Intermediate numeric form wide enough for every integer kind.
#[derive(Clone, Copy, Debug)]
enum Num {
    Int(i128),
    Float(f64),
}

impl Scalar {
    pub fn nctype(&self) -> NcType {
        match self {
            Scalar::Char(_) => NcType::Char,
            Scalar::Byte(_) => NcType::Byte,
            Scalar::Short(_) => NcType::Short,
            Scalar::Int(_) => NcType::Int,
            Scalar::Float(_) => NcType::Float,
            Scalar::Double(_) => NcType::Double,
            Scalar::UByte(_) => NcType::UByte,
            Scalar::UShort(_) => NcType::UShort,
            Scalar::UInt(_) => NcType::UInt,
            Scalar::Int64(_) => NcType::Int64,
            Scalar::UInt64(_) => NcType::UInt64,
            Scalar::String(_) => NcType::String,
            Scalar::Opaque(_) => NcType::Opaque,
        }
    }

    pub fn string(text: impl Into<Vec<u8>>) -> Self {
        Scalar::String(text.into())
    }

    /// True for values that can appear in character data.
    pub fn is_charlike(&self) -> bool {
        matches!(
            self,
            Scalar::Char(_) | Scalar::Byte(_) | Scalar::UByte(_) | Scalar::String(_)
        )
    }

    /// Convert to the primitive (or opaque) type `to`.
    pub fn convert(&self, to: NcType) -> Result<Scalar, ConvertError> {
        if self.nctype() == to {
            return Ok(self.clone());
        }
        if !to.is_primitive() && to != NcType::Opaque {
            return Err(ConvertError::Unsupported {
                from: self.nctype(),
                to,
            });
        }
        match self {
            Scalar::String(bytes) => convert_text(bytes, to),
            Scalar::Opaque(hex) if to == NcType::String => Ok(Scalar::String(hex.clone().into())),
            _ => Ok(from_num(self.num()?, to)),
        }
    }

    fn num(&self) -> Result<Num, ConvertError> {
        Ok(match *self {
            Scalar::Char(v) => Num::Int(v as i128),
            Scalar::Byte(v) => Num::Int(v as i128),
            Scalar::Short(v) => Num::Int(v as i128),
            Scalar::Int(v) => Num::Int(v as i128),
            Scalar::UByte(v) => Num::Int(v as i128),
            Scalar::UShort(v) => Num::Int(v as i128),
            Scalar::UInt(v) => Num::Int(v as i128),
            Scalar::Int64(v) => Num::Int(v as i128),
            Scalar::UInt64(v) => Num::Int(v as i128),
            Scalar::Float(v) => Num::Float(v as f64),
            Scalar::Double(v) => Num::Float(v),
            Scalar::Opaque(ref hex) => Num::Int(opaque_value(hex)? as i128),
            Scalar::String(_) => unreachable!("strings convert through convert_text"),
        })
    }
}

fn from_num(num: Num, to: NcType) -> Scalar {
    match num {
        Num::Int(v) => match to {
            NcType::Char => Scalar::Char(v as u8),
            NcType::Byte => Scalar::Byte(v as i8),
            NcType::Short => Scalar::Short(v as i16),
            NcType::Int => Scalar::Int(v as i32),
            NcType::Float => Scalar::Float(v as f32),
            NcType::Double => Scalar::Double(v as f64),
            NcType::UByte => Scalar::UByte(v as u8),
            NcType::UShort => Scalar::UShort(v as u16),
            NcType::UInt => Scalar::UInt(v as u32),
            NcType::Int64 => Scalar::Int64(v as i64),
            NcType::UInt64 => Scalar::UInt64(v as u64),
            NcType::String => Scalar::String(v.to_string().into_bytes()),
            NcType::Opaque => Scalar::Opaque(opaque_hex(v as u64)),
            _ => unreachable!("non-primitive targets are rejected before conversion"),
        },
        Num::Float(v) => match to {
            NcType::Char => Scalar::Char(v as u8),
            NcType::Byte => Scalar::Byte(v as i8),
            NcType::Short => Scalar::Short(v as i16),
            NcType::Int => Scalar::Int(v as i32),
            NcType::Float => Scalar::Float(v as f32),
            NcType::Double => Scalar::Double(v),
            NcType::UByte => Scalar::UByte(v as u8),
            NcType::UShort => Scalar::UShort(v as u16),
            NcType::UInt => Scalar::UInt(v as u32),
            NcType::Int64 => Scalar::Int64(v as i64),
            NcType::UInt64 => Scalar::UInt64(v as u64),
            NcType::String => Scalar::String(v.to_string().into_bytes()),
            NcType::Opaque => Scalar::Opaque(opaque_hex(v as i64 as u64)),
            _ => unreachable!("non-primitive targets are rejected before conversion"),
        },
    }
}

fn convert_text(bytes: &[u8], to: NcType) -> Result<Scalar, ConvertError> {
    let text = String::from_utf8_lossy(bytes);
    let bad = || ConvertError::BadString {
        text: text.to_string(),
        to,
    };
    match to {
        NcType::Char => Ok(Scalar::Char(bytes.first().copied().unwrap_or(0))),
        NcType::String => Ok(Scalar::String(bytes.to_vec())),
        NcType::Opaque => {
            let hex = text.trim();
            let hex = hex
                .strip_prefix("0x")
                .or_else(|| hex.strip_prefix("0X"))
                .unwrap_or(hex);
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(bad());
            }
            Ok(Scalar::Opaque(hex.to_ascii_lowercase()))
        }
        _ => {
            let trimmed = text.trim();
            if to.is_integer()
                && let Ok(v) = trimmed.parse::<i128>()
            {
                return Ok(from_num(Num::Int(v), to));
            }
            trimmed
                .parse::<f64>()
                .map(|v| from_num(Num::Float(v), to))
                .map_err(|_| bad())
        }
    }
}

fn opaque_hex(value: u64) -> String {
    let hex = format!("{value:x}");
    if hex.len() % 2 == 1 {
        format!("0{hex}")
    } else {
        hex
    }
}

/// Integer value of an opaque constant; only the low 16 nibbles are kept.
fn opaque_value(hex: &str) -> Result<u64, ConvertError> {
    let tail = &hex[hex.len().saturating_sub(16)..];
    if tail.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(tail, 16).map_err(|_| ConvertError::BadOpaque(hex.to_string()))
}

/// Widen or truncate an opaque constant to exactly `2 * size` nibbles.
///
/// Short constants are zero-padded on the right.
pub fn normalize_opaque(hex: &str, size: usize) -> String {
    let nibbles = 2 * size;
    let mut out: String = hex.chars().take(nibbles).collect();
    while out.len() < nibbles {
        out.push('0');
    }
    out
}

/// Decode hex nibbles into bytes, two nibbles per byte.
pub fn opaque_bytes(hex: &str) -> Result<Vec<u8>, ConvertError> {
    let digits = hex.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(ConvertError::BadOpaque(hex.to_string()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| ConvertError::BadOpaque(hex.to_string()))
        })
        .collect()
}
