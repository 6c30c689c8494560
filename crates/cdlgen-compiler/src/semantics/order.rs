//! Dependency order of user types.

use std::collections::HashMap;

use crate::diagnostics::DiagnosticKind;
use crate::symbols::{Schema, SymbolId, TypeClass};
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeState {
    Unvisited,
    InProgress,
    Done,
}

/// Reorder `typdefs` so that every type follows the types it is built from.
///
/// Revisiting a type that is still in progress is a cycle.
pub(super) fn sort_types(schema: &mut Schema) -> Result<()> {
    let mut state = HashMap::new();
    let mut order = Vec::with_capacity(schema.typdefs().len());
    for &t in schema.typdefs() {
        visit(schema, t, &mut state, &mut order)?;
    }
    schema.set_typdefs(order);
    Ok(())
}

fn visit(
    schema: &Schema,
    t: SymbolId,
    state: &mut HashMap<SymbolId, NodeState>,
    order: &mut Vec<SymbolId>,
) -> Result<()> {
    match state.get(&t).copied().unwrap_or(NodeState::Unvisited) {
        NodeState::Done => return Ok(()),
        NodeState::InProgress => {
            return Err(Error::fatal(
                DiagnosticKind::CircularType,
                schema[t].line,
                Some(schema[t].name.as_str()),
            ));
        }
        NodeState::Unvisited => {}
    }
    if schema[t].type_class() == Some(TypeClass::Prim) {
        state.insert(t, NodeState::Done);
        return Ok(());
    }

    state.insert(t, NodeState::InProgress);
    for dep in dependencies(schema, t) {
        visit(schema, dep, state, order)?;
    }
    state.insert(t, NodeState::Done);
    order.push(t);
    Ok(())
}

fn dependencies(schema: &Schema, t: SymbolId) -> Vec<SymbolId> {
    let sym = &schema[t];
    match sym.type_class() {
        Some(TypeClass::Compound) => sym
            .subnodes
            .iter()
            .filter_map(|&field| schema[field].typ.basetype)
            .collect(),
        Some(TypeClass::Vlen | TypeClass::Enum) => sym.typ.basetype.into_iter().collect(),
        _ => Vec::new(),
    }
}
