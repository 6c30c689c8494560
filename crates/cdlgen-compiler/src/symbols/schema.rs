//! Arena of symbols plus the builder used in place of a CDL parser.

use std::ops::{Index, IndexMut};
use std::rc::Rc;

use cdlgen_core::{NcType, UNLIMITED};

use super::{
    AttInfo, DimInfo, Special, SpecialKind, SpecialValueError, Symbol, SymbolId, SymbolKind,
    TypeClass, VarInfo,
};
use crate::data::{Constant, Datalist};
use crate::invariants::ensure_primitive;

/// The symbol table of one CDL file.
#[derive(Clone, Debug)]
pub struct Schema {
    file: String,
    symbols: Vec<Symbol>,
    root: SymbolId,
    prims: Vec<SymbolId>,
    typdefs: Vec<SymbolId>,
    dimdefs: Vec<SymbolId>,
    vardefs: Vec<SymbolId>,
    attdefs: Vec<SymbolId>,
    gattdefs: Vec<SymbolId>,
    grpdefs: Vec<SymbolId>,
}

impl Schema {
    /// Empty schema with its root group and the primitive types.
    pub fn new(file: impl Into<String>) -> Self {
        let mut schema = Self {
            file: file.into(),
            symbols: Vec::new(),
            root: SymbolId::from_raw(0),
            prims: Vec::new(),
            typdefs: Vec::new(),
            dimdefs: Vec::new(),
            vardefs: Vec::new(),
            attdefs: Vec::new(),
            gattdefs: Vec::new(),
            grpdefs: Vec::new(),
        };
        let root = schema.alloc(Symbol::new("/", SymbolKind::Group, None));
        schema.root = root;
        schema.grpdefs.push(root);

        for typecode in NcType::PRIMITIVES {
            let mut sym = Symbol::new(typecode.cdl_name(), SymbolKind::Type(TypeClass::Prim), None);
            sym.typ.typecode = typecode;
            let id = schema.alloc(sym);
            schema.prims.push(id);
        }
        schema
    }

    /// Name of the CDL file, for diagnostics.
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn root(&self) -> SymbolId {
        self.root
    }

    /// The type symbol of a primitive.
    ///
    /// # Panics
    /// If `typecode` is not primitive.
    pub fn prim(&self, typecode: NcType) -> SymbolId {
        ensure_primitive(typecode);
        let slot = NcType::PRIMITIVES
            .iter()
            .position(|&t| t == typecode)
            .unwrap_or_default();
        self.prims[slot]
    }

    pub fn add_group(&mut self, parent: SymbolId, name: &str) -> SymbolId {
        let id = self.declare(parent, Symbol::new(name, SymbolKind::Group, Some(parent)));
        self.grpdefs.push(id);
        id
    }

    /// Named dimension; `declsize == UNLIMITED` declares an unlimited one.
    pub fn add_dim(&mut self, group: SymbolId, name: &str, declsize: usize) -> SymbolId {
        let info = DimInfo {
            declsize,
            unlimitedsize: 0,
            isconstant: false,
        };
        let id = self.declare(group, Symbol::new(name, SymbolKind::Dim(info), Some(group)));
        self.dimdefs.push(id);
        id
    }

    /// Anonymous dimension from an integer in a field declaration.
    ///
    /// Equal sizes share one symbol.
    pub fn add_anon_dim(&mut self, size: usize) -> SymbolId {
        let existing = self.dimdefs.iter().copied().find(|&id| {
            self[id]
                .dim()
                .is_some_and(|d| d.isconstant && d.declsize == size)
        });
        if let Some(id) = existing {
            return id;
        }
        let info = DimInfo {
            declsize: size,
            unlimitedsize: 0,
            isconstant: true,
        };
        let root = self.root;
        let sym = Symbol::new(size.to_string(), SymbolKind::Dim(info), Some(root));
        let id = self.declare(root, sym);
        self.dimdefs.push(id);
        id
    }

    pub fn add_opaque(&mut self, group: SymbolId, name: &str, size: usize) -> SymbolId {
        let id = self.add_type(group, name, TypeClass::Opaque, NcType::Opaque, None);
        self[id].typ.size = size;
        id
    }

    /// Enum over an integer primitive.
    pub fn add_enum(&mut self, group: SymbolId, name: &str, base: NcType) -> SymbolId {
        let base = self.prim(base);
        self.add_type(group, name, TypeClass::Enum, NcType::Enum, Some(base))
    }

    pub fn add_econst(&mut self, enum_id: SymbolId, name: &str, value: Constant) -> SymbolId {
        let mut sym = Symbol::new(name, SymbolKind::Econst(value), Some(enum_id));
        sym.typ.basetype = Some(enum_id);
        let id = self.alloc(sym);
        self[enum_id].subnodes.push(id);
        id
    }

    pub fn add_vlen(&mut self, group: SymbolId, name: &str, base: SymbolId) -> SymbolId {
        self.add_type(group, name, TypeClass::Vlen, NcType::Vlen, Some(base))
    }

    pub fn add_compound(&mut self, group: SymbolId, name: &str) -> SymbolId {
        self.add_type(group, name, TypeClass::Compound, NcType::Compound, None)
    }

    /// Field of a compound; `dims` are usually anonymous dimensions.
    pub fn add_field(
        &mut self,
        compound: SymbolId,
        name: &str,
        base: SymbolId,
        dims: &[SymbolId],
    ) -> SymbolId {
        let mut sym = Symbol::new(name, SymbolKind::Type(TypeClass::Field), Some(compound));
        sym.typ.basetype = Some(base);
        sym.typ.dimset = dims.to_vec();
        let id = self.alloc(sym);
        self[compound].subnodes.push(id);
        id
    }

    pub fn add_var(
        &mut self,
        group: SymbolId,
        name: &str,
        base: SymbolId,
        dims: &[SymbolId],
    ) -> SymbolId {
        let mut sym = Symbol::new(name, SymbolKind::Var(VarInfo::default()), Some(group));
        sym.typ.basetype = Some(base);
        sym.typ.dimset = dims.to_vec();
        let id = self.declare(group, sym);
        self.vardefs.push(id);
        id
    }

    /// Attribute on a variable, or a global one when `var` is `None`.
    ///
    /// An untyped attribute (`typ == None`) gets its type inferred from its
    /// data during semantic analysis.
    pub fn add_attribute(
        &mut self,
        group: SymbolId,
        var: Option<SymbolId>,
        name: &str,
        typ: Option<SymbolId>,
        data: Datalist,
    ) -> SymbolId {
        let mut sym = Symbol::new(name, SymbolKind::Att(AttInfo { var }), Some(group));
        sym.typ.basetype = typ;
        sym.data = Some(Rc::new(data));
        let id = self.declare(group, sym);
        if var.is_some() {
            self.attdefs.push(id);
        } else {
            self.gattdefs.push(id);
        }
        id
    }

    /// Literal data of a variable.
    pub fn set_data(&mut self, var: SymbolId, data: Datalist) {
        self[var].data = Some(Rc::new(data));
    }

    pub fn set_line(&mut self, id: SymbolId, line: u32) {
        self[id].line = line;
    }

    /// Parse a special attribute into the variable's storage flags.
    pub fn set_special(
        &mut self,
        var: SymbolId,
        kind: SpecialKind,
        data: &Datalist,
    ) -> Result<(), SpecialValueError> {
        self.special_mut(var).set(kind, data)
    }

    /// # Panics
    /// If `var` is not a variable.
    pub fn special_mut(&mut self, var: SymbolId) -> &mut Special {
        &mut self.var_mut(var).special
    }

    pub fn special(&self, var: SymbolId) -> Option<&Special> {
        self[var].var().map(|v| &v.special)
    }

    /// First symbol named `name` among the children of `container`.
    pub fn lookup_in(&self, container: SymbolId, name: &str) -> Option<SymbolId> {
        self[container]
            .subnodes
            .iter()
            .copied()
            .find(|&id| self[id].name == name)
    }

    /// First declared symbol named `name`, primitives included.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.ids().find(|&id| self[id].name == name)
    }

    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        (0..self.symbols.len()).map(|i| SymbolId::from_raw(i as u32))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// User-defined types; dependency ordered once semantic analysis ran.
    pub fn typdefs(&self) -> &[SymbolId] {
        &self.typdefs
    }

    pub fn dimdefs(&self) -> &[SymbolId] {
        &self.dimdefs
    }

    pub fn vardefs(&self) -> &[SymbolId] {
        &self.vardefs
    }

    /// Variable attributes.
    pub fn attdefs(&self) -> &[SymbolId] {
        &self.attdefs
    }

    /// Global attributes.
    pub fn gattdefs(&self) -> &[SymbolId] {
        &self.gattdefs
    }

    pub fn grpdefs(&self) -> &[SymbolId] {
        &self.grpdefs
    }

    pub fn primitives(&self) -> &[SymbolId] {
        &self.prims
    }

    /// Effective size of every dimension of `dimset`.
    pub fn dim_sizes(&self, dimset: &[SymbolId]) -> Vec<usize> {
        dimset
            .iter()
            .map(|&d| self[d].dim().map_or(0, DimInfo::size))
            .collect()
    }

    /// Declared sizes, [`UNLIMITED`] for unlimited axes.
    pub fn dim_declsizes(&self, dimset: &[SymbolId]) -> Vec<usize> {
        dimset
            .iter()
            .map(|&d| self[d].dim().map_or(UNLIMITED, |dim| dim.declsize))
            .collect()
    }

    pub fn is_unlimited(&self, dim: SymbolId) -> bool {
        self[dim].dim().is_some_and(DimInfo::is_unlimited)
    }

    pub(crate) fn set_typdefs(&mut self, order: Vec<SymbolId>) {
        self.typdefs = order;
    }

    pub(crate) fn attdefs_mut(&mut self) -> &mut Vec<SymbolId> {
        &mut self.attdefs
    }

    pub(crate) fn dim_mut(&mut self, dim: SymbolId) -> &mut DimInfo {
        match &mut self[dim].kind {
            SymbolKind::Dim(info) => info,
            other => panic!("symbol {dim:?} is not a dimension: {other:?}"),
        }
    }

    pub(crate) fn var_mut(&mut self, var: SymbolId) -> &mut VarInfo {
        match &mut self[var].kind {
            SymbolKind::Var(info) => info,
            other => panic!("symbol {var:?} is not a variable: {other:?}"),
        }
    }

    fn add_type(
        &mut self,
        group: SymbolId,
        name: &str,
        class: TypeClass,
        typecode: NcType,
        base: Option<SymbolId>,
    ) -> SymbolId {
        let mut sym = Symbol::new(name, SymbolKind::Type(class), Some(group));
        sym.typ.typecode = typecode;
        sym.typ.basetype = base;
        let id = self.declare(group, sym);
        self.typdefs.push(id);
        id
    }

    fn declare(&mut self, container: SymbolId, sym: Symbol) -> SymbolId {
        let id = self.alloc(sym);
        self[container].subnodes.push(id);
        id
    }

    fn alloc(&mut self, sym: Symbol) -> SymbolId {
        let id = SymbolId::from_raw(self.symbols.len() as u32);
        self.symbols.push(sym);
        id
    }
}

impl Index<SymbolId> for Schema {
    type Output = Symbol;

    fn index(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }
}

impl IndexMut<SymbolId> for Schema {
    fn index_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }
}
