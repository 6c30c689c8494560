//! State scoped to one compilation.
//!
//! The fill-value cache and the vlen interner are the only mutable state
//! shared across materialization calls.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::Config;
use crate::data::{Datalist, DatalistId};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Span};
use crate::symbols::SymbolId;

/// A materialized vlen instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VlenInstance {
    /// Unique within the session; names the backing buffer.
    pub uid: usize,
    pub count: usize,
    /// Vlen type the instance was built for.
    pub schema: SymbolId,
}

/// Vlen instances keyed by datalist identity, in completion order.
#[derive(Clone, Debug, Default)]
pub struct VlenInterner {
    instances: IndexMap<DatalistId, VlenInstance>,
    next_uid: usize,
}

impl VlenInterner {
    pub fn get(&self, list: DatalistId) -> Option<VlenInstance> {
        self.instances.get(&list).copied()
    }

    /// Reserve a uid for an instance about to be materialized.
    pub fn allocate(&mut self) -> usize {
        let uid = self.next_uid;
        self.next_uid += 1;
        uid
    }

    pub fn insert(&mut self, list: DatalistId, instance: VlenInstance) {
        self.instances.insert(list, instance);
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DatalistId, &VlenInstance)> {
        self.instances.iter()
    }
}

/// One compilation: configuration, diagnostics and per-run caches.
#[derive(Debug, Default)]
pub struct Session {
    config: Config,
    diagnostics: Diagnostics,
    fills: HashMap<SymbolId, Rc<Datalist>>,
    vlens: VlenInterner,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warnings collected so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    pub fn vlens(&self) -> &VlenInterner {
        &self.vlens
    }

    pub(crate) fn vlens_mut(&mut self) -> &mut VlenInterner {
        &mut self.vlens
    }

    pub(crate) fn warn(&mut self, kind: DiagnosticKind, line: u32, detail: Option<&str>) {
        let builder = self.diagnostics.report(kind, Span::line(line));
        match detail {
            Some(detail) => builder.message(detail).emit(),
            None => builder.emit(),
        }
    }

    pub(crate) fn cached_fill(&self, id: SymbolId) -> Option<Rc<Datalist>> {
        self.fills.get(&id).cloned()
    }

    pub(crate) fn cache_fill(&mut self, id: SymbolId, fill: Rc<Datalist>) {
        self.fills.insert(id, fill);
    }

    pub(crate) fn forget_fill(&mut self, id: SymbolId) {
        self.fills.remove(&id);
    }
}
