//! Sizing of unlimited dimensions from the literal data.
//!
//! The size of an unlimited dimension is the largest extent any variable's
//! data gives it. Nested unlimited dimensions are sized from every sublist
//! found at their axis.

use cdlgen_core::NcType;
use tracing::debug;

use crate::data::{Datalist, Value};
use crate::diagnostics::DiagnosticKind;
use crate::generate::{CharShape, Extent, pack_chars};
use crate::invariants::ensure_basetype;
use crate::symbols::{Schema, SymbolId};
use crate::{Error, Result};

/// Shape of the variable being sized.
struct VarShape {
    name: String,
    dims: Vec<SymbolId>,
    declsizes: Vec<usize>,
    unlimited: Vec<bool>,
    is_char: bool,
}

impl VarShape {
    fn next_unlimited(&self, from: usize) -> Option<usize> {
        (from..self.dims.len()).find(|&axis| self.unlimited[axis])
    }

    /// Product of the declared sizes of the axes in `from..to`.
    fn xproduct(&self, from: usize, to: usize) -> usize {
        self.declsizes[from..to].iter().product()
    }
}

pub(super) fn size_unlimited(schema: &mut Schema) -> Result<()> {
    for dim in schema.dimdefs().to_vec() {
        if schema.is_unlimited(dim) {
            schema.dim_mut(dim).unlimitedsize = 0;
        }
    }

    for var in schema.vardefs().to_vec() {
        let Some(data) = schema[var].data.clone() else {
            continue;
        };
        let dims = schema[var].typ.dimset.clone();
        let shape = VarShape {
            name: schema[var].name.clone(),
            declsizes: schema.dim_declsizes(&dims),
            unlimited: dims.iter().map(|&d| schema.is_unlimited(d)).collect(),
            is_char: schema[ensure_basetype(schema, var)].typ.typecode == NcType::Char,
            dims,
        };
        let Some(first) = shape.next_unlimited(0) else {
            continue;
        };
        if first == 0 {
            compute(schema, &shape, 0, &data)?;
            continue;
        }
        for con in data.iter() {
            match &con.value {
                Value::List(sub) => compute(schema, &shape, first, sub)?,
                Value::Fill => {}
                _ => return Err(expected_sublist(&shape, con.line)),
            }
        }
    }

    for &dim in schema.dimdefs() {
        if schema.is_unlimited(dim) {
            debug!(
                dim = %schema[dim].name,
                size = schema[dim].dim().map_or(0, |d| d.unlimitedsize),
                "sized unlimited dimension"
            );
        }
    }
    Ok(())
}

fn compute(schema: &mut Schema, shape: &VarShape, axis: usize, list: &Datalist) -> Result<()> {
    let candidate = match shape.next_unlimited(axis + 1) {
        Some(next) => {
            for con in list.iter() {
                match &con.value {
                    Value::List(sub) => compute(schema, shape, next, sub)?,
                    Value::Fill => {}
                    _ => return Err(expected_sublist(shape, con.line)),
                }
            }
            list.len().div_ceil(shape.xproduct(axis + 1, next))
        }
        None if shape.is_char => {
            let char_shape = CharShape::for_axis(&shape.declsizes, axis);
            pack_chars(list, char_shape, Extent::Unlimited).rows(char_shape)
        }
        None => list.len().div_ceil(shape.xproduct(axis + 1, shape.dims.len())),
    };
    let dim = schema.dim_mut(shape.dims[axis]);
    dim.unlimitedsize = dim.unlimitedsize.max(candidate);
    Ok(())
}

fn expected_sublist(shape: &VarShape, line: u32) -> Error {
    Error::fatal(
        DiagnosticKind::ExpectedSublist,
        line,
        Some(shape.name.as_str()),
    )
}
