//! Attribute finalization: defaults, type inference and `_FillValue`.

use std::rc::Rc;

use cdlgen_core::NcType;

use crate::data::{Constant, Datalist, Value};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::fill::{checkfillvalue, getfiller};
use crate::invariants::ensure_basetype;
use crate::session::Session;
use crate::symbols::{Schema, SymbolId};
use crate::{Error, Result};

pub(super) fn process(schema: &mut Schema, session: &mut Session) -> Result<()> {
    let classic = session.config().is_classic_model();
    let mut errors = Diagnostics::new();
    let atts: Vec<SymbolId> = schema
        .gattdefs()
        .iter()
        .chain(schema.attdefs())
        .copied()
        .collect();

    for att in atts {
        let var = schema[att].att().and_then(|a| a.var);
        let empty = schema[att].data.as_ref().is_none_or(|d| d.is_empty());

        if let Some(var) = var.filter(|_| schema[att].name == "_FillValue") {
            fill_value(schema, session, att, var, &mut errors);
        } else if empty {
            empty_attribute(schema, att)?;
        } else if schema[att].typ.basetype.is_none() {
            let data = schema[att].data.clone().unwrap_or_default();
            let inferred = infer_type(schema, &data, classic);
            schema[att].typ.basetype = Some(inferred);
        }
        let base = ensure_basetype(schema, att);
        schema[att].typ.typecode = schema[base].typ.typecode;
    }

    for att in schema.attdefs().to_vec() {
        if let Some(var) = schema[att].att().and_then(|a| a.var) {
            let attributes = &mut schema.var_mut(var).attributes;
            if !attributes.contains(&att) {
                attributes.push(att);
            }
        }
    }

    if errors.has_errors() {
        return Err(Error::Diagnostics(errors));
    }
    Ok(())
}

/// `_FillValue` takes the variable's type; a valid one becomes its filler.
fn fill_value(
    schema: &mut Schema,
    session: &mut Session,
    att: SymbolId,
    var: SymbolId,
    errors: &mut Diagnostics,
) {
    let base = ensure_basetype(schema, var);
    schema[att].typ.basetype = Some(base);
    let data = match schema[att].data.clone().filter(|d| !d.is_empty()) {
        Some(data) => data,
        None => {
            let fill = getfiller(schema, session, base);
            schema[att].data = Some(Rc::clone(&fill));
            fill
        }
    };
    if checkfillvalue(schema, var, &data, errors) {
        schema.special_mut(var).fill_value = Some(data);
        session.forget_fill(var);
    }
}

/// An empty attribute becomes the empty `char` string.
fn empty_attribute(schema: &mut Schema, att: SymbolId) -> Result<()> {
    let char_type = schema.prim(NcType::Char);
    match schema[att].typ.basetype {
        None => schema[att].typ.basetype = Some(char_type),
        Some(t) if t == char_type => {}
        Some(_) => {
            return Err(Error::fatal(
                DiagnosticKind::EmptyNonCharAttribute,
                schema[att].line,
                Some(schema[att].name.as_str()),
            ));
        }
    }
    let line = schema[att].line;
    schema[att].data = Some(Rc::new(Datalist::from(vec![Constant::string("").at(line)])));
    Ok(())
}

/// Type of an untyped attribute, from its first primitive constant.
///
/// A string infers `char`. The classic model has no unsigned or 64-bit
/// types: `ubyte` widens to `short` and the rest to `int`. An opaque constant
/// carries no size, so it always infers `int`.
pub(super) fn infer_type(schema: &Schema, data: &Datalist, classic: bool) -> SymbolId {
    let typecode = match first_primitive(data) {
        Some(Value::Scalar(scalar)) => scalar.nctype(),
        Some(Value::Econst(econst)) => match schema[*econst].container {
            Some(enum_id) if !classic => return enum_id,
            _ => NcType::Enum,
        },
        _ => NcType::Char,
    };
    let narrowed = match typecode {
        NcType::String => NcType::Char,
        NcType::Opaque | NcType::Enum => NcType::Int,
        NcType::UByte if classic => NcType::Short,
        NcType::UShort | NcType::UInt | NcType::Int64 | NcType::UInt64 if classic => NcType::Int,
        other => other,
    };
    schema.prim(narrowed)
}

fn first_primitive(data: &Datalist) -> Option<&Value> {
    data.iter().find_map(|con| match &con.value {
        Value::List(sub) => first_primitive(sub),
        Value::Fill => None,
        value => Some(value),
    })
}
