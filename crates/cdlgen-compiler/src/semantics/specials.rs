//! Special attributes: storage flags kept per variable or demoted back to
//! ordinary attributes.

use tracing::debug;

use crate::config::SpecialPolicy;
use crate::diagnostics::DiagnosticKind;
use crate::session::Session;
use crate::symbols::{Schema, SpecialKind, special_kind};
use crate::{Error, Result};

pub(super) fn process(schema: &mut Schema, session: &Session) -> Result<()> {
    absorb(schema)?;
    if session.config().specials() == SpecialPolicy::Demote {
        demote(schema);
    }
    Ok(())
}

/// Move reserved variable attributes (other than `_FillValue`) into flags.
fn absorb(schema: &mut Schema) -> Result<()> {
    let mut kept = Vec::with_capacity(schema.attdefs().len());
    for att in schema.attdefs().to_vec() {
        let kind = special_kind(&schema[att].name).filter(|&k| k != SpecialKind::FillValue);
        let (Some(kind), Some(var)) = (kind, schema[att].att().and_then(|a| a.var)) else {
            kept.push(att);
            continue;
        };
        let data = schema[att].data.clone().unwrap_or_default();
        schema.set_special(var, kind, &data).map_err(|err| {
            Error::fatal(
                DiagnosticKind::IllegalSpecialValue,
                schema[att].line,
                Some(err.to_string().as_str()),
            )
        })?;
        if let Some(group) = schema[att].container {
            schema[group].subnodes.retain(|&id| id != att);
        }
    }
    *schema.attdefs_mut() = kept;
    Ok(())
}

fn demote(schema: &mut Schema) {
    for var in schema.vardefs().to_vec() {
        let Some(special) = schema.special(var).filter(|s| s.has_flags()) else {
            continue;
        };
        let demoted = special.demoted();
        let group = schema[var].container.unwrap_or(schema.root());
        let line = schema[var].line;
        for (kind, typecode, data) in demoted {
            let typ = schema.prim(typecode);
            let att = schema.add_attribute(group, Some(var), kind.name(), Some(typ), data);
            schema.set_line(att, line);
        }
        schema.special_mut(var).clear_flags();
        debug!(var = %schema[var].name, "demoted special attributes");
    }
}
