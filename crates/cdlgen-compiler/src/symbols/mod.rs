//! Symbol table: groups, dimensions, types, variables and attributes.
//!
//! Every node lives in one arena owned by [`Schema`] and is addressed by a
//! [`SymbolId`]. A type refers to its basetype by id; compound fields and enum
//! constants are child nodes of their type.

mod schema;
mod special;


use std::rc::Rc;

use cdlgen_core::{NcType, UNLIMITED};

use crate::data::{Constant, Datalist};

pub use schema::Schema;
pub use special::{Endianness, Special, SpecialKind, SpecialValueError, Storage, special_kind};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Subclass of a type node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Prim,
    Enum,
    Opaque,
    Vlen,
    Compound,
    Field,
}

#[derive(Clone, Debug)]
pub enum SymbolKind {
    Group,
    Dim(DimInfo),
    Type(TypeClass),
    /// Enum constant with its declared value.
    Econst(Constant),
    Var(VarInfo),
    Att(AttInfo),
}

/// Type view shared by types, fields, variables and attributes.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub basetype: Option<SymbolId>,
    pub typecode: NcType,
    pub size: usize,
    pub alignment: usize,
    /// Offset within the enclosing compound (fields only).
    pub offset: usize,
    pub nelems: usize,
    pub dimset: Vec<SymbolId>,
    /// True if a vlen is reachable from this type.
    pub hasvlen: bool,
}

impl Default for TypeInfo {
    fn default() -> Self {
        Self {
            basetype: None,
            typecode: NcType::Nat,
            size: 0,
            alignment: 0,
            offset: 0,
            nelems: 1,
            dimset: Vec::new(),
            hasvlen: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimInfo {
    /// Declared size; [`UNLIMITED`] for an unlimited dimension.
    pub declsize: usize,
    /// Largest extent required by the literal data (unlimited only).
    pub unlimitedsize: usize,
    /// Anonymous dimension written as an integer in a field declaration.
    pub isconstant: bool,
}

impl DimInfo {
    pub fn is_unlimited(&self) -> bool {
        self.declsize == UNLIMITED
    }

    /// Effective size: the declared size, or the computed one if unlimited.
    pub fn size(&self) -> usize {
        if self.is_unlimited() {
            self.unlimitedsize
        } else {
            self.declsize
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VarInfo {
    pub special: Special,
    /// Attributes attached to this variable, in declaration order.
    pub attributes: Vec<SymbolId>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AttInfo {
    /// Owning variable; `None` for a global attribute.
    pub var: Option<SymbolId>,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub container: Option<SymbolId>,
    /// Child nodes: group members, compound fields, enum constants.
    pub subnodes: Vec<SymbolId>,
    pub typ: TypeInfo,
    pub data: Option<Rc<Datalist>>,
    pub line: u32,
}

impl Symbol {
    pub(crate) fn new(name: impl Into<String>, kind: SymbolKind, container: Option<SymbolId>) -> Self {
        Self {
            name: name.into(),
            kind,
            container,
            subnodes: Vec::new(),
            typ: TypeInfo::default(),
            data: None,
            line: 0,
        }
    }

    pub fn type_class(&self) -> Option<TypeClass> {
        match self.kind {
            SymbolKind::Type(class) => Some(class),
            _ => None,
        }
    }

    pub fn dim(&self) -> Option<&DimInfo> {
        match &self.kind {
            SymbolKind::Dim(dim) => Some(dim),
            _ => None,
        }
    }

    pub fn var(&self) -> Option<&VarInfo> {
        match &self.kind {
            SymbolKind::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn att(&self) -> Option<&AttInfo> {
        match &self.kind {
            SymbolKind::Att(att) => Some(att),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self.kind, SymbolKind::Var(_))
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, SymbolKind::Type(_))
    }

    pub fn rank(&self) -> usize {
        self.typ.dimset.len()
    }
}
