use std::collections::HashSet;

use crate::data::{Constant, Value};
use crate::diagnostics::DiagnosticKind;
use crate::invariants::ensure_basetype;
use crate::symbols::{Schema, SymbolKind, TypeClass};
use crate::{Error, Result};

/// Convert every enum constant to its enum's basetype.
///
/// A value that does not survive the conversion unchanged is out of range.
pub(super) fn fixup(schema: &mut Schema) -> Result<()> {
    for t in schema.typdefs().to_vec() {
        if schema[t].type_class() != Some(TypeClass::Enum) {
            continue;
        }
        let base = ensure_basetype(schema, t);
        let typecode = schema[base].typ.typecode;
        let mut seen = HashSet::new();
        for econst in schema[t].subnodes.clone() {
            let (name, line) = (schema[econst].name.clone(), schema[econst].line);
            if !seen.insert(name.clone()) {
                return Err(Error::fatal(
                    DiagnosticKind::DuplicateEnumConstant,
                    line,
                    Some(name.as_str()),
                ));
            }
            let out_of_range =
                || Error::fatal(DiagnosticKind::EnumValueOutOfRange, line, Some(name.as_str()));
            let SymbolKind::Econst(Constant {
                value: Value::Scalar(original),
                ..
            }) = &schema[econst].kind
            else {
                return Err(out_of_range());
            };
            let converted = original.convert(typecode).map_err(|_| out_of_range())?;
            if converted.convert(original.nctype()).as_ref() != Ok(original) {
                return Err(out_of_range());
            }
            schema[econst].kind = SymbolKind::Econst(Constant::scalar(converted).at(line));
        }
    }
    Ok(())
}
