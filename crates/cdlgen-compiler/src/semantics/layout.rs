//! Sizes, alignments and compound field offsets.
//!
//! Only natural C layout is supported: each field is padded to its own
//! alignment, and a compound is aligned like its first field.

use std::collections::HashSet;

use cdlgen_core::layout::{alignment, native_size, padding};
use cdlgen_core::NcType;
use tracing::trace;

use crate::invariants::{ensure_basetype, ensure_type_class};
use crate::symbols::{Schema, SymbolId, TypeClass};

pub(super) fn compute_sizes(schema: &mut Schema) {
    let mut done = HashSet::new();
    for prim in schema.primitives().to_vec() {
        compute(schema, prim, &mut done);
    }
    for t in schema.typdefs().to_vec() {
        compute(schema, t, &mut done);
    }
}

/// Element size and total element count of every variable.
pub(super) fn compute_var_sizes(schema: &mut Schema) {
    for var in schema.vardefs().to_vec() {
        let base = ensure_basetype(schema, var);
        let nelems = schema
            .dim_sizes(&schema[var].typ.dimset)
            .iter()
            .product();
        let (size, align) = (schema[base].typ.size, schema[base].typ.alignment);
        let typ = &mut schema[var].typ;
        typ.size = size;
        typ.alignment = align;
        typ.nelems = nelems;
    }
}

fn compute(schema: &mut Schema, t: SymbolId, done: &mut HashSet<SymbolId>) {
    if !done.insert(t) {
        return;
    }
    let (size, align) = match ensure_type_class(schema, t) {
        TypeClass::Prim => {
            let typecode = schema[t].typ.typecode;
            (native_size(typecode).unwrap_or_default(), alignment(typecode))
        }
        TypeClass::Opaque => (schema[t].typ.size, alignment(NcType::Opaque)),
        TypeClass::Enum => {
            let base = ensure_basetype(schema, t);
            compute(schema, base, done);
            (schema[base].typ.size, schema[base].typ.alignment)
        }
        TypeClass::Vlen => {
            compute(schema, ensure_basetype(schema, t), done);
            (
                native_size(NcType::Vlen).unwrap_or_default(),
                alignment(NcType::Vlen),
            )
        }
        TypeClass::Field => {
            let base = ensure_basetype(schema, t);
            compute(schema, base, done);
            let nelems: usize = schema
                .dim_declsizes(&schema[t].typ.dimset)
                .iter()
                .map(|&n| n.max(1))
                .product();
            schema[t].typ.nelems = nelems;
            (schema[base].typ.size * nelems, schema[base].typ.alignment)
        }
        TypeClass::Compound => {
            let mut offset = 0;
            let mut largest = 1;
            let mut first_align = None;
            for field in schema[t].subnodes.clone() {
                compute(schema, field, done);
                let field_align = schema[field].typ.alignment;
                offset += padding(offset, field_align);
                schema[field].typ.offset = offset;
                offset += schema[field].typ.size;
                largest = largest.max(field_align);
                first_align.get_or_insert(field_align);
            }
            offset += padding(offset, largest);
            (offset, first_align.unwrap_or(1))
        }
    };
    trace!(symbol = %schema[t].name, size, align, "layout");
    schema[t].typ.size = size;
    schema[t].typ.alignment = align;
}
