//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use std::rc::Rc;

use cdlgen_core::{NcType, Scalar};

use crate::data::{Constant, Datalist, Value};
use crate::symbols::{Schema, SymbolId, SymbolKind, TypeClass};

pub(crate) fn ensure_push_on_sublist(con: Option<Constant>, line: u32) -> Rc<Datalist> {
    match con {
        Some(Constant {
            value: Value::List(list),
            ..
        }) => list,
        other => panic!("Datasrc: push requires a sublist at line {line}, found {other:?}"),
    }
}

pub(crate) fn ensure_pop_balanced(depth: usize) {
    if depth <= 1 {
        panic!("Datasrc: pop without a matching push");
    }
}

pub(crate) fn ensure_primitive(typecode: NcType) {
    if !typecode.is_primitive() {
        panic!("{typecode} is not a primitive type");
    }
}

/// Basetype of a type, field, variable or typed attribute.
pub(crate) fn ensure_basetype(schema: &Schema, id: SymbolId) -> SymbolId {
    schema[id].typ.basetype.unwrap_or_else(|| {
        panic!(
            "symbol `{}` ({id:?}) has no basetype after semantic analysis",
            schema[id].name
        )
    })
}

pub(crate) fn ensure_type_class(schema: &Schema, id: SymbolId) -> TypeClass {
    schema[id].type_class().unwrap_or_else(|| {
        panic!(
            "symbol `{}` ({id:?}) is not a type: {:?}",
            schema[id].name, schema[id].kind
        )
    })
}

pub(crate) fn unexpected_class(schema: &Schema, id: SymbolId, context: &str) -> ! {
    panic!(
        "{context}: unexpected type class {:?} for `{}`",
        schema[id].kind, schema[id].name
    )
}

pub(crate) fn ensure_listed_in_container(schema: &Schema, id: SymbolId) {
    let Some(container) = schema[id].container else {
        panic!("symbol `{}` ({id:?}) has no container", schema[id].name);
    };
    if !schema[container].subnodes.contains(&id) {
        panic!(
            "symbol `{}` ({id:?}) is missing from the child list of `{}`",
            schema[id].name, schema[container].name
        );
    }
}

pub(crate) fn ensure_registered_type(schema: &Schema, var: SymbolId, typ: SymbolId) {
    let registered = schema.primitives().contains(&typ) || schema.typdefs().contains(&typ);
    if !registered {
        panic!(
            "variable `{}` has unregistered type `{}`",
            schema[var].name, schema[typ].name
        );
    }
}

/// The single instance held by a filler.
pub(crate) fn ensure_instance(schema: &Schema, typ: SymbolId, fill: &Datalist) -> Constant {
    match fill.get(0) {
        Some(con) if fill.len() == 1 => con.clone(),
        _ => panic!(
            "filler of `{}` must hold exactly one instance, found {}",
            schema[typ].name,
            fill.len()
        ),
    }
}

/// Declared value of an enum constant, already converted to the enum's basetype.
pub(crate) fn ensure_econst_value(schema: &Schema, econst: SymbolId) -> &Scalar {
    match &schema[econst].kind {
        SymbolKind::Econst(con) => con.as_scalar().unwrap_or_else(|| {
            panic!("enum constant `{}` has a non-scalar value", schema[econst].name)
        }),
        other => panic!("symbol `{}` is not an enum constant: {other:?}", schema[econst].name),
    }
}

/// Bytes of an opaque value the engine already validated.
pub(crate) fn ensure_opaque_bytes(hex: &str) -> Vec<u8> {
    cdlgen_core::scalar::opaque_bytes(hex)
        .unwrap_or_else(|err| panic!("unvalidated opaque constant reached a generator: {err}"))
}
