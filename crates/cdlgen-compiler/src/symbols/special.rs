//! Special (storage-control) attributes of a variable.

use std::rc::Rc;

use cdlgen_core::{NcType, Scalar};

use crate::data::{Constant, Datalist, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    FillValue,
    Storage,
    ChunkSizes,
    Fletcher32,
    DeflateLevel,
    Shuffle,
    Endianness,
    NoFill,
}

impl SpecialKind {
    pub fn name(self) -> &'static str {
        match self {
            SpecialKind::FillValue => "_FillValue",
            SpecialKind::Storage => "_Storage",
            SpecialKind::ChunkSizes => "_ChunkSizes",
            SpecialKind::Fletcher32 => "_Fletcher32",
            SpecialKind::DeflateLevel => "_DeflateLevel",
            SpecialKind::Shuffle => "_Shuffle",
            SpecialKind::Endianness => "_Endianness",
            SpecialKind::NoFill => "_NoFill",
        }
    }
}

/// Recognise a reserved attribute name.
pub fn special_kind(name: &str) -> Option<SpecialKind> {
    Some(match name {
        "_FillValue" => SpecialKind::FillValue,
        "_Storage" => SpecialKind::Storage,
        "_ChunkSizes" => SpecialKind::ChunkSizes,
        "_Fletcher32" => SpecialKind::Fletcher32,
        "_DeflateLevel" => SpecialKind::DeflateLevel,
        "_Shuffle" => SpecialKind::Shuffle,
        "_Endianness" => SpecialKind::Endianness,
        "_NoFill" => SpecialKind::NoFill,
        _ => return None,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Storage {
    Contiguous,
    Chunked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name}: expected {expected}")]
pub struct SpecialValueError {
    pub name: &'static str,
    pub expected: &'static str,
}

/// Per-variable special settings.
#[derive(Clone, Debug, Default)]
pub struct Special {
    /// Validated user `_FillValue`: one instance of the variable's basetype.
    pub fill_value: Option<Rc<Datalist>>,
    pub storage: Option<Storage>,
    pub chunk_sizes: Option<Vec<usize>>,
    pub fletcher32: Option<bool>,
    pub deflate_level: Option<i32>,
    pub shuffle: Option<bool>,
    pub endianness: Option<Endianness>,
    pub no_fill: Option<bool>,
}

impl Special {
    /// True if any storage flag is set.
    pub fn has_flags(&self) -> bool {
        self.storage.is_some()
            || self.chunk_sizes.is_some()
            || self.fletcher32.is_some()
            || self.deflate_level.is_some()
            || self.shuffle.is_some()
            || self.endianness.is_some()
            || self.no_fill.is_some()
    }

    /// Parse a special attribute value into its flag.
    pub fn set(&mut self, kind: SpecialKind, data: &Datalist) -> Result<(), SpecialValueError> {
        let err = |expected| SpecialValueError {
            name: kind.name(),
            expected,
        };
        match kind {
            SpecialKind::FillValue => return Err(err("an ordinary attribute")),
            SpecialKind::Storage => {
                self.storage = Some(match single_text(data).as_deref() {
                    Some("contiguous") => Storage::Contiguous,
                    Some("chunked") => Storage::Chunked,
                    _ => return Err(err("contiguous or chunked")),
                });
            }
            SpecialKind::ChunkSizes => {
                let sizes = data
                    .iter()
                    .map(|c| int_value(c).and_then(|v| usize::try_from(v).ok()).filter(|&v| v > 0))
                    .collect::<Option<Vec<_>>>()
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| err("a list of positive integers"))?;
                self.chunk_sizes = Some(sizes);
                self.storage = Some(Storage::Chunked);
            }
            SpecialKind::Fletcher32 => {
                self.fletcher32 = Some(single_bool(data).ok_or_else(|| err("true or false"))?)
            }
            SpecialKind::Shuffle => {
                self.shuffle = Some(single_bool(data).ok_or_else(|| err("true or false"))?)
            }
            SpecialKind::NoFill => {
                self.no_fill = Some(single_bool(data).ok_or_else(|| err("true or false"))?)
            }
            SpecialKind::DeflateLevel => {
                let level = single(data)
                    .and_then(int_value)
                    .and_then(|v| i32::try_from(v).ok())
                    .filter(|v| (0..=9).contains(v))
                    .ok_or_else(|| err("a deflate level between 0 and 9"))?;
                self.deflate_level = Some(level);
            }
            SpecialKind::Endianness => {
                self.endianness = Some(match single_text(data).as_deref() {
                    Some("little") => Endianness::Little,
                    Some("big") => Endianness::Big,
                    _ => return Err(err("little or big")),
                });
            }
        }
        Ok(())
    }

    /// Flags rendered back as ordinary attributes: `(kind, type, value)`.
    ///
    /// `_ChunkSizes` supersedes `_Storage`. Text values are typed `char`.
    pub fn demoted(&self) -> Vec<(SpecialKind, NcType, Datalist)> {
        let text = |s: &str| Datalist::from(vec![Constant::string(s)]);
        let flag = |b: bool| text(if b { "true" } else { "false" });
        let mut out = Vec::new();

        if let Some(sizes) = &self.chunk_sizes {
            let list = sizes.iter().map(|&s| Constant::int(s as i32)).collect();
            out.push((SpecialKind::ChunkSizes, NcType::Int, list));
        } else if let Some(storage) = self.storage {
            let name = match storage {
                Storage::Chunked => "chunked",
                Storage::Contiguous => "contiguous",
            };
            out.push((SpecialKind::Storage, NcType::Char, text(name)));
        }
        if let Some(on) = self.fletcher32 {
            out.push((SpecialKind::Fletcher32, NcType::Char, flag(on)));
        }
        if let Some(level) = self.deflate_level {
            out.push((
                SpecialKind::DeflateLevel,
                NcType::Int,
                Datalist::from(vec![Constant::int(level)]),
            ));
        }
        if let Some(on) = self.shuffle {
            out.push((SpecialKind::Shuffle, NcType::Char, flag(on)));
        }
        if let Some(endian) = self.endianness {
            let name = match endian {
                Endianness::Little => "little",
                Endianness::Big => "big",
            };
            out.push((SpecialKind::Endianness, NcType::Char, text(name)));
        }
        if let Some(on) = self.no_fill {
            out.push((SpecialKind::NoFill, NcType::Char, flag(on)));
        }
        out
    }

    pub(crate) fn clear_flags(&mut self) {
        let fill_value = self.fill_value.take();
        *self = Special {
            fill_value,
            ..Special::default()
        };
    }
}

fn single(data: &Datalist) -> Option<&Constant> {
    (data.len() == 1).then(|| data.get(0)).flatten()
}

fn single_text(data: &Datalist) -> Option<String> {
    match &single(data)?.value {
        Value::Scalar(Scalar::String(bytes)) => {
            Some(String::from_utf8_lossy(bytes).trim().to_ascii_lowercase())
        }
        _ => None,
    }
}

fn single_bool(data: &Datalist) -> Option<bool> {
    if let Some(text) = single_text(data) {
        return match text.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        };
    }
    match int_value(single(data)?)? {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

fn int_value(con: &Constant) -> Option<i64> {
    match con.as_scalar()?.convert(NcType::Int64).ok()? {
        Scalar::Int64(v) => Some(v),
        _ => None,
    }
}
