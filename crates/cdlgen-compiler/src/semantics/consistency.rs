use crate::invariants::{ensure_basetype, ensure_listed_in_container, ensure_registered_type};
use crate::symbols::Schema;

/// Every declaration is a child of its container and every variable has a
/// registered type. A violation is a bug in an earlier pass.
pub(super) fn check(schema: &Schema) {
    let root = schema.root();
    let declared = schema
        .grpdefs()
        .iter()
        .filter(|&&g| g != root)
        .chain(schema.typdefs())
        .chain(schema.dimdefs())
        .chain(schema.vardefs());
    for &id in declared {
        ensure_listed_in_container(schema, id);
    }
    for &var in schema.vardefs() {
        ensure_registered_type(schema, var, ensure_basetype(schema, var));
    }
}
