//! Fill values: synthesis of default instances and `_FillValue` validation.
//!
//! A filler is a datalist holding exactly one constant: a complete instance
//! of the type. Fillers are built on first request and cached in the session
//! under the type or variable they were asked for.

mod check;

#[cfg(test)]
mod fill_tests;

use std::rc::Rc;

use cdlgen_core::fill::{FILL_OPAQUE, default_fill};
use tracing::trace;

pub use check::checkfillvalue;

use crate::data::{Constant, Datalist};
use crate::invariants::{ensure_basetype, ensure_type_class, unexpected_class};
use crate::session::Session;
use crate::symbols::{Schema, SymbolId, SymbolKind, TypeClass};

/// The fill instance of a type or variable.
///
/// A variable uses its validated `_FillValue` when present and its basetype's
/// filler otherwise. Repeated calls return the same cached list.
pub fn getfiller(schema: &Schema, session: &mut Session, id: SymbolId) -> Rc<Datalist> {
    if let Some(fill) = session.cached_fill(id) {
        return fill;
    }
    let fill = match &schema[id].kind {
        SymbolKind::Var(var) => match &var.special.fill_value {
            Some(user) => Rc::clone(user),
            None => getfiller(schema, session, ensure_basetype(schema, id)),
        },
        SymbolKind::Type(_) => Rc::new(Datalist::from(vec![fill_constant(schema, session, id)])),
        _ => unexpected_class(schema, id, "getfiller"),
    };
    trace!(symbol = %schema[id].name, "synthesized filler");
    session.cache_fill(id, Rc::clone(&fill));
    fill
}

/// The single constant of a type's filler.
fn fill_constant(schema: &Schema, session: &mut Session, typ: SymbolId) -> Constant {
    let sym = &schema[typ];
    match ensure_type_class(schema, typ) {
        TypeClass::Prim => match default_fill(sym.typ.typecode) {
            Some(value) => Constant::scalar(value),
            None => unexpected_class(schema, typ, "primitive fill"),
        },
        TypeClass::Enum => first_of(schema, session, ensure_basetype(schema, typ)),
        TypeClass::Opaque => Constant::opaque(FILL_OPAQUE),
        TypeClass::Compound => {
            let fields = sym
                .subnodes
                .iter()
                .map(|&field| first_of(schema, session, field))
                .collect::<Datalist>();
            Constant::list(fields)
        }
        TypeClass::Vlen => {
            let one = first_of(schema, session, ensure_basetype(schema, typ));
            Constant::list(Datalist::from(vec![one]))
        }
        TypeClass::Field => {
            let base = first_of(schema, session, ensure_basetype(schema, typ));
            if sym.typ.dimset.is_empty() {
                return base;
            }
            let n = field_elements(schema, typ);
            Constant::list(std::iter::repeat_n(base, n).collect())
        }
    }
}

fn first_of(schema: &Schema, session: &mut Session, typ: SymbolId) -> Constant {
    let fill = getfiller(schema, session, typ);
    match fill.get(0) {
        Some(con) => con.clone(),
        None => unexpected_class(schema, typ, "empty filler"),
    }
}

/// Element count of a dimensioned field; an unlimited axis counts once.
fn field_elements(schema: &Schema, field: SymbolId) -> usize {
    schema[field]
        .typ
        .dimset
        .iter()
        .map(|&d| schema[d].dim().map_or(1, |dim| dim.declsize.max(1)))
        .product()
}
