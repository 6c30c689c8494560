//! Post-parse semantic passes.
//!
//! The passes run in a fixed order; each one relies on what the previous
//! ones computed:
//! 1. dependency order of user types (cycle detection)
//! 2. typecode propagation
//! 3. vlen tagging
//! 4. sizes, alignments and field offsets
//! 5. variable checks
//! 6. special attributes
//! 7. attribute finalization and `_FillValue`
//! 8. enum constant fixup
//! 9. unlimited dimension sizing
//! 10. consistency check

mod attributes;
mod consistency;
mod enums;
mod layout;
mod order;
mod specials;
mod unlimited;

#[cfg(test)]
mod semantics_tests;
#[cfg(test)]
mod unlimited_tests;

use tracing::{debug, instrument};

use crate::diagnostics::DiagnosticKind;
use crate::invariants::ensure_basetype;
use crate::session::Session;
use crate::symbols::{Schema, TypeClass};
use crate::{Error, Result};

/// Run every semantic pass over `schema`.
///
/// Fatal errors abort at the first violation. Warnings are left in the
/// session's diagnostics.
#[instrument(skip_all, fields(file = schema.file()))]
pub fn analyze(schema: &mut Schema, session: &mut Session) -> Result<()> {
    order::sort_types(schema)?;
    propagate_typecodes(schema);
    tag_vlens(schema);
    layout::compute_sizes(schema);
    check_variables(schema, session.config().is_classic_model())?;
    specials::process(schema, session)?;
    attributes::process(schema, session)?;
    enums::fixup(schema)?;
    unlimited::size_unlimited(schema)?;
    layout::compute_var_sizes(schema);
    consistency::check(schema);
    debug!(
        types = schema.typdefs().len(),
        vars = schema.vardefs().len(),
        "semantic analysis done"
    );
    Ok(())
}

/// Fields, enum constants, variables and typed attributes take their
/// basetype's typecode.
fn propagate_typecodes(schema: &mut Schema) {
    for t in schema.typdefs().to_vec() {
        for child in schema[t].subnodes.clone() {
            let base = match schema[t].type_class() {
                Some(TypeClass::Compound) => ensure_basetype(schema, child),
                Some(TypeClass::Enum) => ensure_basetype(schema, t),
                _ => continue,
            };
            schema[child].typ.typecode = schema[base].typ.typecode;
        }
    }
    let typed = schema
        .vardefs()
        .iter()
        .chain(schema.attdefs())
        .chain(schema.gattdefs())
        .copied()
        .collect::<Vec<_>>();
    for id in typed {
        if let Some(base) = schema[id].typ.basetype {
            schema[id].typ.typecode = schema[base].typ.typecode;
        }
    }
}

/// Mark every type, field and variable that reaches a vlen.
fn tag_vlens(schema: &mut Schema) {
    for t in schema.typdefs().to_vec() {
        let hasvlen = match schema[t].type_class() {
            Some(TypeClass::Vlen) => true,
            Some(TypeClass::Compound) => {
                let mut any = false;
                for field in schema[t].subnodes.clone() {
                    let base = ensure_basetype(schema, field);
                    let field_vlen = schema[base].typ.hasvlen;
                    schema[field].typ.hasvlen = field_vlen;
                    any |= field_vlen;
                }
                any
            }
            _ => false,
        };
        schema[t].typ.hasvlen = hasvlen;
    }
    for var in schema.vardefs().to_vec() {
        let base = ensure_basetype(schema, var);
        schema[var].typ.hasvlen = schema[base].typ.hasvlen;
    }
}

/// The classic model allows an unlimited dimension in first position only.
fn check_variables(schema: &Schema, classic: bool) -> Result<()> {
    if !classic {
        return Ok(());
    }
    for &var in schema.vardefs() {
        let dims = &schema[var].typ.dimset;
        if dims.iter().skip(1).any(|&d| schema.is_unlimited(d)) {
            return Err(Error::fatal(
                DiagnosticKind::UnlimitedNotFirst,
                schema[var].line,
                Some(schema[var].name.as_str()),
            ));
        }
    }
    Ok(())
}
