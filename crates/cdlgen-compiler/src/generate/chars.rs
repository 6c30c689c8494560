//! Packing of character data into flat byte strings.
//!
//! In a `char` context the datalist is not a list of elements. Consecutive
//! char/byte/ubyte constants merge into one string, each string is padded to
//! a multiple of the unit (the last dimension), and the result is fitted to
//! the extent of the sequence axis.

use cdlgen_core::Scalar;
use cdlgen_core::fill::FILL_CHAR;

use crate::data::{Constant, Value};
use crate::diagnostics::DiagnosticKind;

/// Length of the sequence axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Extent {
    /// Exactly this many rows; longer data is truncated.
    Bounded(usize),
    /// As many rows as the data needs.
    Unlimited,
}

/// Padding geometry of a char array, seen from its sequence axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CharShape {
    /// Each string is padded to a multiple of this.
    pub unit: usize,
    /// Bytes per index of the sequence axis.
    pub row: usize,
}

impl CharShape {
    pub(crate) const SCALAR: CharShape = CharShape { unit: 1, row: 1 };

    /// Shape for `sizes` when `axis` is the sequence axis.
    pub(crate) fn for_axis(sizes: &[usize], axis: usize) -> Self {
        let trailing = sizes.get(axis + 1..).unwrap_or_default();
        let row = trailing.iter().product::<usize>().max(1);
        let unit = match trailing.last() {
            Some(&last) => last.max(1),
            None => 1,
        };
        CharShape { unit, row }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Packed {
    pub bytes: Vec<u8>,
    /// Recoverable anomalies with their lines.
    pub warnings: Vec<(DiagnosticKind, u32)>,
}

impl Packed {
    /// Rows of the sequence axis covered by the bytes.
    pub(crate) fn rows(&self, shape: CharShape) -> usize {
        self.bytes.len().div_ceil(shape.row)
    }
}

/// Pack `items` and fit them to `extent` rows of `shape.row` bytes.
pub(crate) fn pack_chars<'a>(
    items: impl IntoIterator<Item = &'a Constant>,
    shape: CharShape,
    extent: Extent,
) -> Packed {
    let mut packed = Packed::default();
    let mut first_line = None;
    for (line, mut s) in runs(items, &mut packed.warnings) {
        first_line.get_or_insert(line);
        let padded = if s.is_empty() {
            shape.unit
        } else {
            s.len().next_multiple_of(shape.unit)
        };
        s.resize(padded, 0);
        packed.bytes.extend_from_slice(&s);
    }

    let len = packed.bytes.len();
    let total = match extent {
        Extent::Bounded(rows) => rows * shape.row,
        Extent::Unlimited => len.next_multiple_of(shape.row),
    };
    if len > total {
        packed
            .warnings
            .push((DiagnosticKind::CharDataTooLong, first_line.unwrap_or(0)));
        packed.bytes.truncate(total);
    }
    packed.bytes.resize(total, 0);
    packed
}

/// Concatenate `items` with no padding, as for a char attribute.
pub(crate) fn concat_chars<'a>(items: impl IntoIterator<Item = &'a Constant>) -> Packed {
    let mut packed = Packed::default();
    for (_, s) in runs(items, &mut packed.warnings) {
        packed.bytes.extend_from_slice(&s);
    }
    packed
}

/// Split the datalist into strings, each with the line it starts on.
fn runs<'a>(
    items: impl IntoIterator<Item = &'a Constant>,
    warnings: &mut Vec<(DiagnosticKind, u32)>,
) -> Vec<(u32, Vec<u8>)> {
    let mut out = Vec::new();
    let mut run: Option<(u32, Vec<u8>)> = None;
    for con in items {
        let byte = match &con.value {
            Value::Scalar(Scalar::String(s)) => {
                out.extend(run.take());
                out.push((con.line, s.clone()));
                continue;
            }
            Value::Scalar(Scalar::Char(c) | Scalar::UByte(c)) => *c,
            Value::Scalar(Scalar::Byte(b)) => *b as u8,
            Value::Fill => FILL_CHAR,
            _ => {
                warnings.push((DiagnosticKind::IllegalCharConstant, con.line));
                continue;
            }
        };
        run.get_or_insert_with(|| (con.line, Vec::new())).1.push(byte);
    }
    out.extend(run);
    out
}
