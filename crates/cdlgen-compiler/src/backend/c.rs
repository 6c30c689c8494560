//! C source that writes the data through the netCDF C API.
//!
//! Each write becomes a block with a static data array and an
//! `nc_put_vara_*`/`nc_put_att_*` call. Vlen payloads are declared as static
//! arrays ahead of every block that references them.

use std::fmt::Write;

use cdlgen_core::{NcType, Scalar};
use tracing::instrument;

use super::materialize_all;
use crate::generate::{Atom, Generator, ListClass, ListLayout, Materializer, SinkError, Writer};
use crate::invariants::{ensure_basetype, ensure_opaque_bytes};
use crate::session::Session;
use crate::symbols::{Schema, Symbol, SymbolId};

/// Renders values as C initializers.
pub struct CGenerator<'a> {
    schema: &'a Schema,
    declarations: String,
}

impl<'a> CGenerator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            declarations: String::new(),
        }
    }

    /// Static vlen payload arrays, in completion order.
    pub fn declarations(&self) -> &str {
        &self.declarations
    }
}

impl Generator for CGenerator<'_> {
    type Code = String;

    fn charconstant(&mut self, code: &mut String, chars: &[u8]) {
        code.push_str(&quote(chars));
    }

    fn constant(&mut self, code: &mut String, atom: &Atom) {
        match atom {
            Atom::Scalar(scalar) => code.push_str(&literal(scalar)),
            Atom::Vlen(vlen) => {
                code.push_str(&format!("{{{}, (void*)vlen_{}}}", vlen.count, vlen.uid));
            }
        }
    }

    fn list_begin(&mut self, code: &mut String, class: ListClass, _layout: ListLayout) -> usize {
        if matches!(class, ListClass::Compound | ListClass::FieldArray) {
            code.push('{');
        }
        0
    }

    fn list_separator(&mut self, code: &mut String, _class: ListClass, _id: usize, _index: usize) {
        code.push_str(", ");
    }

    fn list_end(&mut self, code: &mut String, class: ListClass, _id: usize, _count: usize) {
        if matches!(class, ListClass::Compound | ListClass::FieldArray) {
            code.push('}');
        }
    }

    fn vlen_declare(&mut self, vlen: &Symbol, uid: usize, count: usize, vlencode: String) {
        let base = vlen.typ.basetype.map_or_else(|| "void".to_string(), |b| c_type(self.schema, b));
        self.declarations.push_str(&format!(
            "static {base} vlen_{uid}[{}] = {{{vlencode}}};\n",
            count.max(1)
        ));
    }

    fn vlen_string(&mut self, _vlen: &Symbol, uid: usize, chars: &[u8]) -> usize {
        self.declarations
            .push_str(&format!("static char vlen_{uid}[] = {};\n", quote(chars)));
        chars.len()
    }
}

/// Collects one C block per write.
#[derive(Debug, Default)]
pub struct CWriter {
    out: String,
}

impl CWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn attribute(
        &mut self,
        schema: &Schema,
        att: SymbolId,
        code: &str,
        count: usize,
    ) -> Result<(), SinkError> {
        let sym = &schema[att];
        let owner = match sym.att().and_then(|a| a.var) {
            Some(var) => format!("{}_id", ident(&schema[var].name)),
            None => "NC_GLOBAL".to_string(),
        };
        let base = ensure_basetype(schema, att);
        let typecode = schema[base].typ.typecode;
        let out = &mut self.out;
        writeln!(out, "{{ /* {} */", sym.name)?;
        if typecode == NcType::Char {
            writeln!(
                out,
                "    stat = nc_put_att_text(ncid, {owner}, \"{}\", {count}, {code});",
                sym.name
            )?;
        } else {
            let data = format!("{}_att", ident(&sym.name));
            writeln!(
                out,
                "    static const {} {data}[{}] = {{{code}}};",
                c_type(schema, base),
                count.max(1)
            )?;
            match typecode.c_put_suffix() {
                Some(suffix) if typecode == NcType::String => writeln!(
                    out,
                    "    stat = nc_put_att_{suffix}(ncid, {owner}, \"{}\", {count}, {data});",
                    sym.name
                )?,
                Some(suffix) => writeln!(
                    out,
                    "    stat = nc_put_att_{suffix}(ncid, {owner}, \"{}\", {}, {count}, {data});",
                    sym.name,
                    typecode.nc_name()
                )?,
                None => writeln!(
                    out,
                    "    stat = nc_put_att(ncid, {owner}, \"{}\", {}_typ, {count}, {data});",
                    sym.name,
                    ident(&schema[base].name)
                )?,
            }
        }
        writeln!(out, "    check_err(stat,__LINE__,__FILE__);")?;
        writeln!(out, "}}")?;
        Ok(())
    }

    fn variable(
        &mut self,
        schema: &Schema,
        var: SymbolId,
        code: &str,
        start: &[usize],
        count: &[usize],
    ) -> Result<(), SinkError> {
        let name = ident(&schema[var].name);
        let base = ensure_basetype(schema, var);
        let typecode = schema[base].typ.typecode;
        let rank = start.len().max(1);
        let (start, count) = if start.is_empty() {
            (vec![0], vec![1])
        } else {
            (start.to_vec(), count.to_vec())
        };
        let nelems: usize = count.iter().product();
        let out = &mut self.out;
        writeln!(out, "{{ /* {} */", schema[var].name)?;
        writeln!(out, "    static size_t {name}_startset[{rank}] = {{{}}};", join(&start))?;
        writeln!(out, "    static size_t {name}_countset[{rank}] = {{{}}};", join(&count))?;
        if typecode == NcType::Char {
            writeln!(out, "    static char {name}_data[] = {code};")?;
        } else {
            writeln!(
                out,
                "    static {} {name}_data[{}] = {{{code}}};",
                c_type(schema, base),
                nelems.max(1)
            )?;
        }
        let put = match typecode.c_put_suffix() {
            Some(suffix) => format!("nc_put_vara_{suffix}"),
            None => "nc_put_vara".to_string(),
        };
        writeln!(
            out,
            "    stat = {put}(ncid, {name}_id, {name}_startset, {name}_countset, {name}_data);"
        )?;
        writeln!(out, "    check_err(stat,__LINE__,__FILE__);")?;
        writeln!(out, "}}")?;
        Ok(())
    }
}

impl<'a> Writer<CGenerator<'a>> for CWriter {
    fn write(
        &mut self,
        schema: &Schema,
        sym: SymbolId,
        code: String,
        start: &[usize],
        count: &[usize],
    ) -> Result<(), SinkError> {
        if schema[sym].att().is_some() {
            let n = count.first().copied().unwrap_or_default();
            self.attribute(schema, sym, &code, n)
        } else {
            self.variable(schema, sym, &code, start, count)
        }
    }
}

/// Vlen declarations followed by one block per attribute and hyperslab write.
#[instrument(skip_all, fields(file = schema.file()))]
pub fn generate(schema: &Schema, session: &mut Session) -> crate::Result<String> {
    let mut generator = CGenerator::new(schema);
    let mut writer = CWriter::new();
    let mut materializer = Materializer::new(schema, session, &mut generator, &mut writer);
    materialize_all(&mut materializer, schema, true)?;
    Ok(format!("{}{}", generator.declarations, writer.finish()))
}

/// C type name for values of `typ`: the netCDF mapping for primitives, the
/// type's own name otherwise.
fn c_type(schema: &Schema, typ: SymbolId) -> String {
    let sym = &schema[typ];
    match sym.typ.typecode.c_type() {
        Some(ctype) => ctype.to_string(),
        None => ident(&sym.name),
    }
}

fn literal(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Char(c) => format!("'{}'", escape(&[*c], b'\'')),
        Scalar::Byte(v) => v.to_string(),
        Scalar::Short(v) => v.to_string(),
        Scalar::Int(v) => v.to_string(),
        Scalar::UByte(v) => v.to_string(),
        Scalar::UShort(v) => v.to_string(),
        Scalar::UInt(v) => format!("{v}U"),
        Scalar::Int64(v) => format!("{v}LL"),
        Scalar::UInt64(v) => format!("{v}ULL"),
        Scalar::Float(v) if v.is_finite() => format!("{v:?}f"),
        Scalar::Double(v) if v.is_finite() => format!("{v:?}"),
        Scalar::Float(v) => non_finite(f64::from(*v)),
        Scalar::Double(v) => non_finite(*v),
        Scalar::String(bytes) => quote(bytes),
        Scalar::Opaque(hex) => {
            let bytes: Vec<String> = ensure_opaque_bytes(hex)
                .iter()
                .map(|b| format!("0x{b:02x}"))
                .collect();
            format!("{{{}}}", bytes.join(", "))
        }
    }
}

fn non_finite(v: f64) -> String {
    if v.is_nan() {
        "NAN".to_string()
    } else if v > 0.0 {
        "INFINITY".to_string()
    } else {
        "-INFINITY".to_string()
    }
}

/// A C identifier for a CDL name.
fn ident(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote(bytes: &[u8]) -> String {
    format!("\"{}\"", escape(bytes, b'"'))
}

/// Octal escapes keep a following digit from joining the escape.
fn escape(bytes: &[u8], delim: u8) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\\' => out.push_str("\\\\"),
            _ if b == delim => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out
}
