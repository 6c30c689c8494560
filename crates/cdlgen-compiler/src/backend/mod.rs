//! Concrete generators and writers.
//!
//! - `binary` - native-layout bytes handed to a [`binary::DatasetSink`]
//! - `cdl` - the `data:` section of a CDL file
//! - `c` - C initializers with their `nc_put_*` calls

pub mod binary;
pub mod c;
pub mod cdl;

#[cfg(test)]
mod cdl_tests;

use crate::generate::{Generator, Materializer, Writer};
use crate::symbols::{Schema, SymbolId};
use crate::Result;

/// Global attributes, then each variable's attributes in declaration order.
pub(crate) fn attributes_in_order(schema: &Schema) -> Vec<SymbolId> {
    let mut atts = schema.gattdefs().to_vec();
    for &var in schema.vardefs() {
        if let Some(info) = schema[var].var() {
            atts.extend_from_slice(&info.attributes);
        }
    }
    atts
}

/// Materialize every attribute when `attributes` is set, then every variable.
pub(crate) fn materialize_all<G: Generator, W: Writer<G>>(
    materializer: &mut Materializer<'_, G, W>,
    schema: &Schema,
    attributes: bool,
) -> Result<()> {
    if attributes {
        for att in attributes_in_order(schema) {
            materializer.generate_attribute(att)?;
        }
    }
    for &var in schema.vardefs() {
        materializer.generate_variable(var)?;
    }
    Ok(())
}
