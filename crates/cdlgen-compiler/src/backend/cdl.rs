//! CDL text for the `data:` section.

use std::collections::HashMap;
use std::fmt::Write;

use cdlgen_core::fill::default_fill;
use cdlgen_core::Scalar;
use tracing::instrument;

use super::materialize_all;
use crate::generate::{Atom, Generator, ListClass, ListLayout, Materializer, SinkError, Writer};
use crate::session::Session;
use crate::symbols::{Schema, Symbol, SymbolId};

/// Renders values in CDL syntax.
///
/// Default fill values print as `_`. Vlen payloads are kept by uid and
/// printed inline, in braces, wherever an instance is referenced.
#[derive(Debug, Default)]
pub struct CdlGenerator {
    vlens: HashMap<usize, String>,
}

impl CdlGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Generator for CdlGenerator {
    type Code = String;

    fn charconstant(&mut self, code: &mut String, chars: &[u8]) {
        code.push_str(&quote(chars));
    }

    fn constant(&mut self, code: &mut String, atom: &Atom) {
        match atom {
            Atom::Scalar(scalar) if is_default_fill(scalar) => code.push('_'),
            Atom::Scalar(scalar) => code.push_str(&render(scalar)),
            Atom::Vlen(vlen) => {
                let payload = self.vlens.get(&vlen.uid).map_or("", String::as_str);
                code.push('{');
                code.push_str(payload);
                code.push('}');
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

    fn vlen_declare(&mut self, _vlen: &Symbol, uid: usize, _count: usize, vlencode: String) {
        self.vlens.insert(uid, vlencode);
    }

    fn vlen_string(&mut self, _vlen: &Symbol, uid: usize, chars: &[u8]) -> usize {
        self.vlens.insert(uid, quote(chars));
        chars.len()
    }
}

/// Collects one `name = ... ;` statement per write.
#[derive(Debug, Default)]
pub struct CdlWriter {
    out: String,
}

impl CdlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl Writer<CdlGenerator> for CdlWriter {
    fn write(
        &mut self,
        schema: &Schema,
        sym: SymbolId,
        code: String,
        _start: &[usize],
        _count: &[usize],
    ) -> Result<(), SinkError> {
        writeln!(self.out, "  {} = {code} ;", schema[sym].name)?;
        Ok(())
    }
}

/// The `data:` section for every variable with literal data.
#[instrument(skip_all, fields(file = schema.file()))]
pub fn generate(schema: &Schema, session: &mut Session) -> crate::Result<String> {
    let mut generator = CdlGenerator::new();
    let mut writer = CdlWriter::new();
    let mut materializer = Materializer::new(schema, session, &mut generator, &mut writer);
    materialize_all(&mut materializer, schema, false)?;
    Ok(format!("data:\n\n{}", writer.finish()))
}

/// An opaque fill is zero nibbles of any width.
fn is_default_fill(scalar: &Scalar) -> bool {
    match scalar {
        Scalar::Opaque(hex) => hex.bytes().all(|b| b == b'0'),
        other => default_fill(other.nctype()).as_ref() == Some(other),
    }
}

fn render(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Char(c) => format!("'{}'", escape(&[*c], b'\'')),
        Scalar::Byte(v) => v.to_string(),
        Scalar::Short(v) => v.to_string(),
        Scalar::Int(v) => v.to_string(),
        Scalar::UByte(v) => v.to_string(),
        Scalar::UShort(v) => v.to_string(),
        Scalar::UInt(v) => v.to_string(),
        Scalar::Int64(v) => v.to_string(),
        Scalar::UInt64(v) => v.to_string(),
        Scalar::Float(v) => float(f64::from(*v), format!("{v:?}")),
        Scalar::Double(v) => float(*v, format!("{v:?}")),
        Scalar::String(bytes) => quote(bytes),
        Scalar::Opaque(hex) => format!("0x{hex}"),
    }
}

fn float(v: f64, text: String) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        text
    }
}

fn quote(bytes: &[u8]) -> String {
    format!("\"{}\"", escape(bytes, b'"'))
}

fn escape(bytes: &[u8], delim: u8) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            0 => out.push_str("\\0"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\\' => out.push_str("\\\\"),
            _ if b == delim => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out
}
