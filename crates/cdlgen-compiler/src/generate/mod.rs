//! Typed data materialization.
//!
//! The engine walks a type and a [`Datasrc`](crate::data::Datasrc) in lockstep
//! and hands every value to a [`Generator`], which encodes it into a
//! backend-specific `Code` buffer. Finished buffers go to a [`Writer`] as
//! `start`/`count` hyperslabs. The engine never looks at which backend it
//! drives.

mod chars;
mod engine;


use cdlgen_core::Scalar;

use crate::symbols::{Schema, Symbol, SymbolId};

pub use engine::Materializer;
pub(crate) use chars::{CharShape, Extent, Packed, concat_chars, pack_chars};

/// Which kind of list a `list_*` call brackets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListClass {
    /// Elements of one variable write.
    Data,
    /// Elements of one attribute.
    Attribute,
    /// Payload of a vlen instance.
    Vlen,
    /// Fields of one compound instance.
    Compound,
    /// Elements of a dimensioned compound field.
    FieldArray,
}

/// Geometry of a list about to be generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListLayout {
    /// Number of elements (or fields).
    pub count: usize,
    /// Byte size of one element; of the whole instance for compounds.
    pub size: usize,
    pub alignment: usize,
}

/// Reference to an interned vlen instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VlenRef {
    pub uid: usize,
    pub count: usize,
}

/// A materialized leaf value.
#[derive(Clone, Debug, PartialEq)]
pub enum Atom {
    /// Primitive converted to its declared type; opaques hold exactly `2*size` nibbles.
    Scalar(Scalar),
    Vlen(VlenRef),
}

/// Backend encoding of materialized values.
pub trait Generator {
    type Code: Default;

    /// A packed run of characters.
    fn charconstant(&mut self, code: &mut Self::Code, chars: &[u8]);

    fn constant(&mut self, code: &mut Self::Code, atom: &Atom);

    /// Open a list and return an id for the matching `list_separator`/`list_end`.
    fn list_begin(&mut self, code: &mut Self::Code, class: ListClass, layout: ListLayout) -> usize;

    /// Called before every element but the first.
    fn list_separator(&mut self, code: &mut Self::Code, class: ListClass, id: usize, index: usize);

    fn list_end(&mut self, code: &mut Self::Code, class: ListClass, id: usize, count: usize);

    /// A finished vlen payload of `count` elements of `vlen`'s basetype.
    fn vlen_declare(&mut self, vlen: &Symbol, uid: usize, count: usize, vlencode: Self::Code);

    /// A vlen of `char` given as packed characters; returns its element count.
    fn vlen_string(&mut self, vlen: &Symbol, uid: usize, chars: &[u8]) -> usize;
}

/// Receives finished buffers: one call per attribute or hyperslab.
pub trait Writer<G: Generator> {
    /// Write `code` for `sym` (a variable or an attribute).
    ///
    /// For variables `start` and `count` have one entry per dimension. For
    /// attributes `start` is empty and `count` holds the element count.
    fn write(
        &mut self,
        schema: &Schema,
        sym: SymbolId,
        code: G::Code,
        start: &[usize],
        count: &[usize],
    ) -> Result<(), SinkError>;
}

/// Failure reported by a writer or a sink behind it.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("formatting failed: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("{name}: {reason}")]
    Rejected { name: String, reason: String },
}
