use std::rc::Rc;

use cdlgen_core::NcType;

use crate::data::{Constant, Datalist, Datasrc, Value};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Span};
use crate::invariants::{ensure_basetype, ensure_type_class};
use crate::symbols::{Schema, SymbolId, TypeClass};

struct Mismatch {
    kind: DiagnosticKind,
    line: u32,
    detail: String,
}

type Check = Result<(), Mismatch>;

fn mismatch(line: u32, detail: impl Into<String>) -> Check {
    Err(Mismatch {
        kind: DiagnosticKind::FillValueMismatch,
        line,
        detail: detail.into(),
    })
}

/// Check that `data` is one well-shaped instance for the type of `id`.
///
/// `id` is a variable or a type. Shape problems are reported into `diags`
/// with their source line; the walk stops at the first one.
pub fn checkfillvalue(
    schema: &Schema,
    id: SymbolId,
    data: &Datalist,
    diags: &mut Diagnostics,
) -> bool {
    let typ = if schema[id].is_var() {
        ensure_basetype(schema, id)
    } else {
        id
    };
    let mut src = Datasrc::new(Rc::new(data.clone()));
    let result = check_instance(schema, typ, &mut src).and_then(|()| {
        if src.more() {
            return Err(Mismatch {
                kind: DiagnosticKind::FillValueNotSingle,
                line: src.line(),
                detail: schema[id].name.clone(),
            });
        }
        Ok(())
    });
    match result {
        Ok(()) => true,
        Err(m) => {
            diags
                .report(m.kind, Span::line(m.line))
                .message(m.detail)
                .emit();
            false
        }
    }
}

fn check_instance(schema: &Schema, typ: SymbolId, src: &mut Datasrc) -> Check {
    let line = src.line();
    let Some(con) = src.next() else {
        return Ok(());
    };
    if con.is_fill() {
        return Ok(());
    }
    match ensure_type_class(schema, typ) {
        TypeClass::Prim | TypeClass::Enum | TypeClass::Opaque => check_scalar(schema, typ, &con),
        TypeClass::Compound => {
            let Some(list) = con.as_list() else {
                return mismatch(line, format!("{} must be enclosed in {{..}}", schema[typ].name));
            };
            let mut fields = Datasrc::new(Rc::clone(list));
            for &field in &schema[typ].subnodes {
                check_field(schema, field, &mut fields)?;
            }
            if fields.more() {
                return mismatch(fields.line(), format!("too many fields for {}", schema[typ].name));
            }
            Ok(())
        }
        TypeClass::Vlen => {
            let Some(list) = con.as_list() else {
                return mismatch(line, format!("{} must be enclosed in {{..}}", schema[typ].name));
            };
            let base = ensure_basetype(schema, typ);
            let mut elems = Datasrc::new(Rc::clone(list));
            while elems.more() {
                check_instance(schema, base, &mut elems)?;
            }
            Ok(())
        }
        TypeClass::Field => {
            let mut src = Datasrc::new(Rc::new(Datalist::from(vec![con])));
            check_field(schema, typ, &mut src)
        }
    }
}

fn check_field(schema: &Schema, field: SymbolId, src: &mut Datasrc) -> Check {
    let base = ensure_basetype(schema, field);
    if schema[field].typ.dimset.is_empty() {
        return check_instance(schema, base, src);
    }
    let line = src.line();
    let is_char = schema[base].typ.typecode == NcType::Char;
    let Some(con) = src.next() else {
        return Ok(());
    };
    let list = match &con.value {
        Value::Fill => return Ok(()),
        Value::Scalar(s) if is_char && s.is_charlike() => return Ok(()),
        Value::List(list) => Rc::clone(list),
        _ => {
            return mismatch(
                line,
                format!("array field {} must be enclosed in {{..}}", schema[field].name),
            );
        }
    };
    if is_char {
        return match list.iter().find(|c| !(c.is_fill() || is_charlike(c))) {
            Some(bad) => mismatch(bad.line, format!("non-character data in {}", schema[field].name)),
            None => Ok(()),
        };
    }
    let nelems: usize = schema
        .dim_declsizes(&schema[field].typ.dimset)
        .iter()
        .map(|&n| n.max(1))
        .product();
    let mut elems = Datasrc::new(list);
    for _ in 0..nelems {
        if !elems.more() {
            break;
        }
        check_instance(schema, base, &mut elems)?;
    }
    if elems.more() {
        return mismatch(elems.line(), format!("too much data for {}", schema[field].name));
    }
    Ok(())
}

fn check_scalar(schema: &Schema, typ: SymbolId, con: &Constant) -> Check {
    match &con.value {
        Value::List(_) => Err(Mismatch {
            kind: DiagnosticKind::ExpectedPrimitive,
            line: con.line,
            detail: schema[typ].name.clone(),
        }),
        Value::Econst(econst) => {
            let enum_id = schema[*econst].container;
            if enum_id == Some(typ) {
                Ok(())
            } else {
                mismatch(
                    con.line,
                    format!("{} is not a constant of {}", schema[*econst].name, schema[typ].name),
                )
            }
        }
        Value::Scalar(scalar) => {
            let target = match schema[typ].type_class() {
                Some(TypeClass::Enum) => schema[ensure_basetype(schema, typ)].typ.typecode,
                _ => schema[typ].typ.typecode,
            };
            scalar
                .convert(target)
                .map(|_| ())
                .or_else(|err| mismatch(con.line, err.to_string()))
        }
        Value::Fill => Ok(()),
    }
}

fn is_charlike(con: &Constant) -> bool {
    con.as_scalar().is_some_and(|s| s.is_charlike())
}
