//! Native-layout binary encoding.
//!
//! Values are laid out the way the netCDF C library reads them from memory:
//! each primitive at its probed alignment, compounds padded to their size,
//! strings as pointer-sized handles and vlens as `{len, handle}` pairs. The
//! handles index the generator's string table and vlen buffers.

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

use cdlgen_core::layout::{alignment, padding};
use cdlgen_core::{NcType, Scalar};

use super::materialize_all;
use crate::config::SpecialPolicy;
use crate::data::{Datalist, Value};
use crate::generate::{
    Atom, Generator, ListClass, ListLayout, Materializer, SinkError, Writer,
};
use crate::invariants::{ensure_basetype, ensure_opaque_bytes};
use crate::session::Session;
use crate::symbols::{Schema, Special, Symbol, SymbolId};

/// An open list and the offset its elements are aligned from.
#[derive(Clone, Copy, Debug)]
struct Frame {
    base: usize,
    /// Padded end of a compound instance.
    end: Option<usize>,
}

/// A finished vlen payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VlenBuffer {
    /// Name of the vlen type.
    pub name: String,
    pub count: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct BinaryGenerator {
    frames: Vec<Frame>,
    strings: IndexSet<Vec<u8>>,
    vlens: IndexMap<usize, VlenBuffer>,
}

impl BinaryGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interned string contents; a string value holds its index here.
    pub fn strings(&self) -> impl Iterator<Item = &[u8]> {
        self.strings.iter().map(Vec::as_slice)
    }

    /// Vlen payload by uid.
    pub fn vlen(&self, uid: usize) -> Option<&VlenBuffer> {
        self.vlens.get(&uid)
    }

    pub fn vlen_count(&self) -> usize {
        self.vlens.len()
    }

    fn base(&self) -> usize {
        self.frames.last().map_or(0, |f| f.base)
    }

    fn align(&self, code: &mut Vec<u8>, align: usize) {
        let pad = padding(code.len() - self.base(), align);
        code.resize(code.len() + pad, 0);
    }

    fn intern(&mut self, bytes: &[u8]) -> usize {
        match self.strings.get_index_of(bytes) {
            Some(index) => index,
            None => self.strings.insert_full(bytes.to_vec()).0,
        }
    }
}

impl Generator for BinaryGenerator {
    type Code = Vec<u8>;

    fn charconstant(&mut self, code: &mut Vec<u8>, chars: &[u8]) {
        code.extend_from_slice(chars);
    }

    fn constant(&mut self, code: &mut Vec<u8>, atom: &Atom) {
        match atom {
            Atom::Scalar(scalar) => {
                self.align(code, alignment(scalar.nctype()));
                match scalar {
                    Scalar::Char(v) | Scalar::UByte(v) => code.push(*v),
                    Scalar::Byte(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::Short(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::Int(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::Float(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::Double(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::UShort(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::UInt(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::Int64(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::UInt64(v) => code.extend_from_slice(&v.to_ne_bytes()),
                    Scalar::String(bytes) => {
                        let handle = self.intern(bytes);
                        code.extend_from_slice(&handle.to_ne_bytes());
                    }
                    Scalar::Opaque(hex) => code.extend_from_slice(&ensure_opaque_bytes(hex)),
                }
            }
            Atom::Vlen(vlen) => {
                self.align(code, alignment(NcType::Vlen));
                code.extend_from_slice(&vlen.count.to_ne_bytes());
                code.extend_from_slice(&vlen.uid.to_ne_bytes());
            }
        }
    }

    fn list_begin(&mut self, code: &mut Vec<u8>, class: ListClass, layout: ListLayout) -> usize {
        let frame = match class {
            ListClass::Data | ListClass::Attribute | ListClass::Vlen => Frame {
                base: code.len(),
                end: None,
            },
            ListClass::Compound => {
                self.align(code, layout.alignment);
                Frame {
                    base: code.len(),
                    end: Some(code.len() + layout.size),
                }
            }
            ListClass::FieldArray => {
                self.align(code, layout.alignment);
                Frame {
                    base: code.len(),
                    end: None,
                }
            }
        };
        self.frames.push(frame);
        self.frames.len() - 1
    }

    fn list_separator(&mut self, _code: &mut Vec<u8>, _class: ListClass, _id: usize, _index: usize) {}

    fn list_end(&mut self, code: &mut Vec<u8>, _class: ListClass, id: usize, _count: usize) {
        let frame = self.frames.get(id).copied();
        self.frames.truncate(id);
        if let Some(Frame { end: Some(end), .. }) = frame {
            code.resize(end.max(code.len()), 0);
        }
    }

    fn vlen_declare(&mut self, vlen: &Symbol, uid: usize, count: usize, vlencode: Vec<u8>) {
        self.vlens.insert(
            uid,
            VlenBuffer {
                name: vlen.name.clone(),
                count,
                bytes: vlencode,
            },
        );
    }

    fn vlen_string(&mut self, vlen: &Symbol, uid: usize, chars: &[u8]) -> usize {
        self.vlens.insert(
            uid,
            VlenBuffer {
                name: vlen.name.clone(),
                count: chars.len(),
                bytes: chars.to_vec(),
            },
        );
        chars.len()
    }
}

/// Definition of a variable as seen by a [`DatasetSink`].
#[derive(Clone, Debug)]
pub struct VarDef<'a> {
    pub name: &'a str,
    /// Name of the variable's type.
    pub typ: &'a str,
    pub dims: Vec<&'a str>,
    /// Storage flags; present only when specials are kept.
    pub special: Option<&'a Special>,
}

/// The dataset API the binary backend writes through.
pub trait DatasetSink {
    /// `size` is the current length of an unlimited dimension.
    fn define_dim(&mut self, name: &str, size: usize, unlimited: bool) -> Result<(), SinkError>;

    fn define_var(&mut self, def: &VarDef<'_>) -> Result<(), SinkError>;

    /// `var` is `None` for a global attribute.
    fn put_att(
        &mut self,
        var: Option<&str>,
        name: &str,
        typecode: NcType,
        count: usize,
        bytes: &[u8],
    ) -> Result<(), SinkError>;

    fn put_vara(
        &mut self,
        var: &str,
        start: &[usize],
        count: &[usize],
        bytes: &[u8],
    ) -> Result<(), SinkError>;
}

/// Forwards finished buffers to a [`DatasetSink`].
pub struct BinaryWriter<'s, S: DatasetSink> {
    sink: &'s mut S,
}

impl<'s, S: DatasetSink> BinaryWriter<'s, S> {
    pub fn new(sink: &'s mut S) -> Self {
        Self { sink }
    }
}

impl<S: DatasetSink> Writer<BinaryGenerator> for BinaryWriter<'_, S> {
    fn write(
        &mut self,
        schema: &Schema,
        sym: SymbolId,
        code: Vec<u8>,
        start: &[usize],
        count: &[usize],
    ) -> Result<(), SinkError> {
        let symbol = &schema[sym];
        match symbol.att() {
            Some(att) => {
                let var = att.var.map(|v| schema[v].name.as_str());
                let n = count.first().copied().unwrap_or_default();
                self.sink
                    .put_att(var, &symbol.name, symbol.typ.typecode, n, &code)
            }
            None => self.sink.put_vara(&symbol.name, start, count, &code),
        }
    }
}

/// Write the whole schema to `sink`.
///
/// Definitions come first: dimensions, then variables. Attributes follow,
/// then every variable's data in hyperslabs. Returns the generator, which
/// owns the string table and the vlen buffers the written bytes refer to.
#[instrument(skip_all, fields(file = schema.file()))]
pub fn generate<S: DatasetSink>(
    schema: &Schema,
    session: &mut Session,
    sink: &mut S,
) -> crate::Result<BinaryGenerator> {
    for &dim in schema.dimdefs() {
        let Some(info) = schema[dim].dim().filter(|d| !d.isconstant) else {
            continue;
        };
        sink.define_dim(&schema[dim].name, info.size(), info.is_unlimited())?;
    }
    let keep = session.config().specials() == SpecialPolicy::Keep;
    for &var in schema.vardefs() {
        let def = VarDef {
            name: &schema[var].name,
            typ: &schema[ensure_basetype(schema, var)].name,
            dims: schema[var]
                .typ
                .dimset
                .iter()
                .map(|&d| schema[d].name.as_str())
                .collect(),
            special: schema.special(var).filter(|_| keep),
        };
        sink.define_var(&def)?;
    }

    let mut generator = BinaryGenerator::new();
    let mut writer = BinaryWriter::new(sink);
    let mut materializer = Materializer::new(schema, session, &mut generator, &mut writer);
    materialize_all(&mut materializer, schema, true)?;
    debug!(
        strings = generator.strings.len(),
        vlens = generator.vlens.len(),
        "binary generation done"
    );
    Ok(generator)
}

/// One recorded [`DatasetSink`] call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SinkRecord {
    DefineDim {
        name: String,
        size: usize,
        unlimited: bool,
    },
    DefineVar {
        name: String,
        typ: String,
        dims: Vec<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        flags: Vec<String>,
    },
    PutAtt {
        var: Option<String>,
        name: String,
        typ: String,
        count: usize,
        #[serde(serialize_with = "hex")]
        bytes: Vec<u8>,
    },
    PutVara {
        var: String,
        start: Vec<usize>,
        count: Vec<usize>,
        #[serde(serialize_with = "hex")]
        bytes: Vec<u8>,
    },
}

/// A sink that records every call.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<SinkRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SinkRecord] {
        &self.records
    }

    /// Bytes of every `put_vara` to `var`, in write order.
    pub fn data_of(&self, var: &str) -> Vec<u8> {
        self.records
            .iter()
            .filter_map(|r| match r {
                SinkRecord::PutVara { var: v, bytes, .. } if v == var => Some(bytes.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }
}

impl DatasetSink for MemorySink {
    fn define_dim(&mut self, name: &str, size: usize, unlimited: bool) -> Result<(), SinkError> {
        self.records.push(SinkRecord::DefineDim {
            name: name.to_string(),
            size,
            unlimited,
        });
        Ok(())
    }

    fn define_var(&mut self, def: &VarDef<'_>) -> Result<(), SinkError> {
        let flags = def.special.map_or_else(Vec::new, |special| {
            special
                .demoted()
                .into_iter()
                .map(|(kind, _, data)| format!("{}={}", kind.name(), flag_value(&data)))
                .collect()
        });
        self.records.push(SinkRecord::DefineVar {
            name: def.name.to_string(),
            typ: def.typ.to_string(),
            dims: def.dims.iter().map(|d| d.to_string()).collect(),
            flags,
        });
        Ok(())
    }

    fn put_att(
        &mut self,
        var: Option<&str>,
        name: &str,
        typecode: NcType,
        count: usize,
        bytes: &[u8],
    ) -> Result<(), SinkError> {
        self.records.push(SinkRecord::PutAtt {
            var: var.map(str::to_string),
            name: name.to_string(),
            typ: typecode.cdl_name().to_string(),
            count,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn put_vara(
        &mut self,
        var: &str,
        start: &[usize],
        count: &[usize],
        bytes: &[u8],
    ) -> Result<(), SinkError> {
        self.records.push(SinkRecord::PutVara {
            var: var.to_string(),
            start: start.to_vec(),
            count: count.to_vec(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

fn flag_value(data: &Datalist) -> String {
    data.iter()
        .filter_map(|con| match &con.value {
            Value::Scalar(Scalar::Int(v)) => Some(v.to_string()),
            Value::Scalar(Scalar::String(s)) => Some(String::from_utf8_lossy(s).into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn hex<T: AsRef<[u8]>, S: Serializer>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error> {
    let text: String = bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect();
    serializer.serialize_str(&text)
}
