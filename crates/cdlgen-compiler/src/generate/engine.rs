//! The recursive type/data walk.

use std::rc::Rc;

use cdlgen_core::scalar::{normalize_opaque, opaque_bytes};
use cdlgen_core::{Block, BlockIter, NcType, Odometer, Scalar};
use tracing::{debug, trace};

use super::{
    Atom, CharShape, Extent, Generator, ListClass, ListLayout, Packed, VlenRef, Writer,
    concat_chars, pack_chars,
};
use crate::data::{Constant, Datalist, Datasrc, Value};
use crate::diagnostics::DiagnosticKind;
use crate::fill::getfiller;
use crate::invariants::{
    ensure_basetype, ensure_econst_value, ensure_instance, ensure_type_class,
};
use crate::session::{Session, VlenInstance};
use crate::symbols::{Schema, SymbolId, TypeClass};
use crate::{Error, Result};

/// Drives one generator and one writer over analyzed symbols.
pub struct Materializer<'a, G: Generator, W: Writer<G>> {
    schema: &'a Schema,
    session: &'a mut Session,
    generator: &'a mut G,
    writer: &'a mut W,
}

impl<'a, G: Generator, W: Writer<G>> Materializer<'a, G, W> {
    pub fn new(
        schema: &'a Schema,
        session: &'a mut Session,
        generator: &'a mut G,
        writer: &'a mut W,
    ) -> Self {
        Self {
            schema,
            session,
            generator,
            writer,
        }
    }

    /// Materialize an attribute in a single write.
    pub fn generate_attribute(&mut self, att: SymbolId) -> Result<()> {
        let schema = self.schema;
        let base = ensure_basetype(schema, att);
        let data = schema[att].data.clone().unwrap_or_default();
        let mut code = G::Code::default();
        let count = if schema[base].typ.typecode == NcType::Char {
            let packed = concat_chars(data.iter());
            self.warn(&packed);
            self.generator.charconstant(&mut code, &packed.bytes);
            packed.bytes.len()
        } else {
            let layout = layout_of(self.schema, base, data.len());
            let id = self.generator.list_begin(&mut code, ListClass::Attribute, layout);
            let mut src = Datasrc::new(data);
            let mut n = 0;
            while src.more() {
                if n > 0 {
                    self.generator
                        .list_separator(&mut code, ListClass::Attribute, id, n);
                }
                self.materialize(base, &mut src, &mut code, None)?;
                n += 1;
            }
            self.generator
                .list_end(&mut code, ListClass::Attribute, id, n);
            n
        };
        trace!(att = %schema[att].name, count, "attribute write");
        self.writer.write(schema, att, code, &[], &[count])?;
        Ok(())
    }

    /// Materialize a variable's literal data as hyperslab writes split to fit
    /// the configured chunk budget.
    ///
    /// Variables without data produce no writes. Short data in a list is
    /// padded with fill up to the extent that list covers: the whole variable
    /// for the top-level list, one row of the last unlimited axis for an
    /// inner sublist. A missing or fill-marked sublist covers nothing, so its
    /// row is not written and reads back as the variable's fill value.
    pub fn generate_variable(&mut self, var: SymbolId) -> Result<()> {
        let schema = self.schema;
        let Some(data) = schema[var].data.clone() else {
            return Ok(());
        };
        let base = ensure_basetype(schema, var);
        let dims = &schema[var].typ.dimset;
        let sizes = schema.dim_sizes(dims);
        let filler = getfiller(schema, self.session, var);
        let is_char = schema[base].typ.typecode == NcType::Char;

        let first = dims.iter().position(|&d| schema.is_unlimited(d));
        let last = dims.iter().rposition(|&d| schema.is_unlimited(d));
        debug!(
            var = %schema[var].name,
            rank = dims.len(),
            ?first,
            ?last,
            "generating variable"
        );

        if dims.is_empty() {
            return if is_char {
                self.char_block(var, &data, CharShape::SCALAR, Extent::Bounded(1), &[], &[], None)
            } else {
                self.scalar(var, base, data, &filler)
            };
        }
        match (first, last) {
            (None, _) | (Some(0), Some(0)) if is_char => {
                let shape = CharShape::for_axis(&sizes, 0);
                let extent = if first.is_some() {
                    Extent::Unlimited
                } else {
                    Extent::Bounded(sizes[0])
                };
                let start = vec![0; sizes.len()];
                self.char_block(var, &data, shape, extent, &start, &sizes, Some(0))
            }
            (None, _) | (Some(0), Some(0)) => self.blocks(var, base, data, &sizes, &filler),
            _ => {
                let mut odom = Odometer::new(&sizes, None, None);
                self.array_r(var, &data, &mut odom, 0, &filler)
            }
        }
    }

    /// Materialize one instance of `typ` read from `src`.
    ///
    /// A fill marker or exhausted data takes its value from `filler`, or from
    /// the type's own filler when none is given.
    pub fn materialize(
        &mut self,
        typ: SymbolId,
        src: &mut Datasrc,
        code: &mut G::Code,
        filler: Option<&Rc<Datalist>>,
    ) -> Result<()> {
        match ensure_type_class(self.schema, typ) {
            TypeClass::Prim | TypeClass::Enum | TypeClass::Opaque => {
                let con = match src.next() {
                    Some(con) if !con.is_fill() => con,
                    _ => self.fill_instance(typ, filler),
                };
                let atom = self.primitive(typ, &con)?;
                self.generator.constant(code, &atom);
                Ok(())
            }
            TypeClass::Compound => self.compound(typ, src, code, filler),
            TypeClass::Vlen => self.vlen(typ, src, code, filler),
            TypeClass::Field => self.field(typ, src, code),
        }
    }

    fn scalar(
        &mut self,
        var: SymbolId,
        base: SymbolId,
        data: Rc<Datalist>,
        filler: &Rc<Datalist>,
    ) -> Result<()> {
        let mut src = Datasrc::new(data);
        let mut code = G::Code::default();
        let id = self
            .generator
            .list_begin(&mut code, ListClass::Data, layout_of(self.schema, base, 1));
        self.materialize(base, &mut src, &mut code, Some(filler))?;
        self.generator.list_end(&mut code, ListClass::Data, id, 1);
        if src.more() {
            return Err(self.extra_data(&src, var));
        }
        self.writer.write(self.schema, var, code, &[], &[])?;
        Ok(())
    }

    /// At most one unlimited axis, and it leads: walk budgeted blocks in order.
    fn blocks(
        &mut self,
        var: SymbolId,
        base: SymbolId,
        data: Rc<Datalist>,
        sizes: &[usize],
        filler: &Rc<Datalist>,
    ) -> Result<()> {
        let schema = self.schema;
        let size = schema[base].typ.size;
        let mut src = Datasrc::new(data);
        for block in BlockIter::new(sizes, size, self.session.config().budget()) {
            let n = block.len();
            let mut code = G::Code::default();
            let id = self
                .generator
                .list_begin(&mut code, ListClass::Data, layout_of(self.schema, base, n));
            for i in 0..n {
                if i > 0 {
                    self.generator
                        .list_separator(&mut code, ListClass::Data, id, i);
                }
                self.materialize(base, &mut src, &mut code, Some(filler))?;
            }
            self.generator.list_end(&mut code, ListClass::Data, id, n);
            trace!(var = %schema[var].name, start = ?block.start, count = ?block.count, "hyperslab write");
            self.writer
                .write(schema, var, code, &block.start, &block.count)?;
        }
        if src.more() {
            return Err(self.extra_data(&src, var));
        }
        Ok(())
    }

    /// Walk an array with an unlimited axis past the first position.
    ///
    /// `list` holds the data of the sub-array starting at `axis`. Each axis
    /// left of the last unlimited one ends at the next unlimited axis, whose
    /// data sits one brace level down.
    fn array_r(
        &mut self,
        var: SymbolId,
        list: &Rc<Datalist>,
        odom: &mut Odometer,
        axis: usize,
        filler: &Rc<Datalist>,
    ) -> Result<()> {
        let schema = self.schema;
        let dims = &schema[var].typ.dimset;
        let rank = dims.len();
        let sizes = schema.dim_sizes(dims);
        let last = dims
            .iter()
            .rposition(|&d| schema.is_unlimited(d))
            .unwrap_or_default();

        if axis == last {
            return self.leaf(var, list, odom, axis, &sizes, filler);
        }

        let next = (axis + 1..rank)
            .find(|&i| schema.is_unlimited(dims[i]))
            .unwrap_or(rank);
        let xproduct = sizes[axis + 1..next].iter().product::<usize>().max(1);
        let extent = if schema.is_unlimited(dims[axis]) {
            list.len().div_ceil(xproduct).min(sizes[axis])
        } else {
            sizes[axis]
        };
        if extent == 0 {
            return Ok(());
        }
        odom.set_extent(axis, 0, extent);
        let sub = odom.sub(axis, next);
        while sub.more(odom) {
            let offset = sub.offset(odom);
            match list.get(offset).map(|c| &c.value) {
                Some(Value::List(sublist)) => {
                    let sublist = Rc::clone(sublist);
                    self.array_r(var, &sublist, odom, next, filler)?;
                }
                Some(Value::Fill) | None => {}
                Some(_) => {
                    let line = list.get(offset).map_or(0, |c| c.line);
                    return Err(Error::fatal(
                        DiagnosticKind::ExpectedSublist,
                        line,
                        Some(schema[var].name.as_str()),
                    ));
                }
            }
            sub.incr(odom);
        }
        Ok(())
    }

    /// The last unlimited axis: write its rows for the current outer indices.
    fn leaf(
        &mut self,
        var: SymbolId,
        list: &Rc<Datalist>,
        odom: &Odometer,
        axis: usize,
        sizes: &[usize],
        filler: &Rc<Datalist>,
    ) -> Result<()> {
        let schema = self.schema;
        let rank = sizes.len();
        let base = ensure_basetype(schema, var);
        let mut start = vec![0; rank];
        let mut count = sizes.to_vec();
        for i in 0..axis {
            start[i] = odom.index(i);
            count[i] = 1;
        }

        if schema[base].typ.typecode == NcType::Char {
            let shape = CharShape::for_axis(sizes, axis);
            return self.char_block(var, list, shape, Extent::Unlimited, &start, &count, Some(axis));
        }

        let xproduct = sizes[axis + 1..].iter().product::<usize>().max(1);
        let rows = list.len().div_ceil(xproduct).min(sizes[axis]);
        if rows == 0 {
            return Ok(());
        }
        count[axis] = rows;

        // Blocks come in row-major order, so list offsets run consecutively.
        let mut offset = 0;
        for block in self.sub_blocks(&start, &count, axis, schema[base].typ.size) {
            let n = block.len();
            let mut code = G::Code::default();
            let id = self
                .generator
                .list_begin(&mut code, ListClass::Data, layout_of(self.schema, base, n));
            for i in 0..n {
                if i > 0 {
                    self.generator
                        .list_separator(&mut code, ListClass::Data, id, i);
                }
                let element = match list.get(offset) {
                    Some(con) if !con.is_fill() => Rc::new(Datalist::from(vec![con.clone()])),
                    _ => Rc::clone(filler),
                };
                let mut src = Datasrc::new(element);
                self.materialize(base, &mut src, &mut code, Some(filler))?;
                offset += 1;
            }
            self.generator.list_end(&mut code, ListClass::Data, id, n);
            trace!(var = %schema[var].name, start = ?block.start, count = ?block.count, "hyperslab write");
            self.writer
                .write(schema, var, code, &block.start, &block.count)?;
        }
        Ok(())
    }

    /// Pack char data and write it in budgeted blocks.
    ///
    /// The count of the sequence `axis` comes from the packed length. Without
    /// an axis the data is a scalar and goes out in one write.
    #[allow(clippy::too_many_arguments)]
    fn char_block(
        &mut self,
        var: SymbolId,
        data: &Datalist,
        shape: CharShape,
        extent: Extent,
        start: &[usize],
        count: &[usize],
        axis: Option<usize>,
    ) -> Result<()> {
        let packed = pack_chars(data.iter(), shape, extent);
        self.warn(&packed);
        let rows = packed.rows(shape);
        if rows == 0 {
            return Ok(());
        }
        let Some(axis) = axis else {
            let mut code = G::Code::default();
            self.generator.charconstant(&mut code, &packed.bytes);
            trace!(var = %self.schema[var].name, "char write");
            self.writer.write(self.schema, var, code, start, count)?;
            return Ok(());
        };
        let mut count = count.to_vec();
        count[axis] = rows;
        let mut rest = packed.bytes.as_slice();
        for block in self.sub_blocks(start, &count, axis, 1) {
            let (bytes, tail) = rest.split_at(block.len().min(rest.len()));
            rest = tail;
            let mut code = G::Code::default();
            self.generator.charconstant(&mut code, bytes);
            trace!(var = %self.schema[var].name, start = ?block.start, count = ?block.count, "char write");
            self.writer
                .write(self.schema, var, code, &block.start, &block.count)?;
        }
        Ok(())
    }

    /// Budgeted blocks covering axes `axis..` of the hyperslab
    /// `start`/`count`, in row-major order and in absolute coordinates.
    fn sub_blocks(&self, start: &[usize], count: &[usize], axis: usize, size: usize) -> Vec<Block> {
        BlockIter::new(&count[axis..], size, self.session.config().budget())
            .map(|block| {
                let mut abs = Block {
                    start: start.to_vec(),
                    count: count.to_vec(),
                };
                for (k, (&from, &n)) in block.start.iter().zip(&block.count).enumerate() {
                    abs.start[axis + k] += from;
                    abs.count[axis + k] = n;
                }
                abs
            })
            .collect()
    }

    fn compound(
        &mut self,
        typ: SymbolId,
        src: &mut Datasrc,
        code: &mut G::Code,
        filler: Option<&Rc<Datalist>>,
    ) -> Result<()> {
        let schema = self.schema;
        self.descend(typ, src, filler, "compound")?;
        let fields = &schema[typ].subnodes;
        let layout = ListLayout {
            count: fields.len(),
            size: schema[typ].typ.size,
            alignment: schema[typ].typ.alignment,
        };
        let id = self
            .generator
            .list_begin(code, ListClass::Compound, layout);
        for (i, &field) in fields.iter().enumerate() {
            if i > 0 {
                self.generator
                    .list_separator(code, ListClass::Compound, id, i);
            }
            self.field(field, src, code)?;
        }
        if src.more() {
            return Err(self.extra_data(src, typ));
        }
        src.pop();
        self.generator
            .list_end(code, ListClass::Compound, id, fields.len());
        Ok(())
    }

    fn field(&mut self, field: SymbolId, src: &mut Datasrc, code: &mut G::Code) -> Result<()> {
        let schema = self.schema;
        let base = ensure_basetype(schema, field);
        let dimset = &schema[field].typ.dimset;
        if dimset.is_empty() {
            return self.materialize(base, src, code, None);
        }

        if schema[base].typ.typecode == NcType::Char {
            let items = match src.next() {
                Some(Constant {
                    value: Value::List(list),
                    ..
                }) => list,
                Some(con) if !con.is_fill() => Rc::new(Datalist::from(vec![con])),
                _ => self.fill_list(field, None),
            };
            let sizes = schema.dim_sizes(dimset);
            let shape = CharShape::for_axis(&sizes, 0);
            let packed = pack_chars(items.iter(), shape, Extent::Bounded(sizes[0]));
            self.warn(&packed);
            self.generator.charconstant(code, &packed.bytes);
            return Ok(());
        }

        self.descend(field, src, None, "array field")?;
        let nelems = schema[field].typ.nelems;
        let id = self
            .generator
            .list_begin(code, ListClass::FieldArray, layout_of(self.schema, base, nelems));
        for i in 0..nelems {
            if i > 0 {
                self.generator
                    .list_separator(code, ListClass::FieldArray, id, i);
            }
            self.materialize(base, src, code, None)?;
        }
        if src.more() {
            return Err(self.extra_data(src, field));
        }
        src.pop();
        self.generator
            .list_end(code, ListClass::FieldArray, id, nelems);
        Ok(())
    }

    fn vlen(
        &mut self,
        typ: SymbolId,
        src: &mut Datasrc,
        code: &mut G::Code,
        filler: Option<&Rc<Datalist>>,
    ) -> Result<()> {
        let schema = self.schema;
        let list = if let Some(list) = src.peek().and_then(Constant::as_list).cloned() {
            src.next();
            list
        } else if src.is_fill() || !src.more() {
            src.next();
            self.fill_list(typ, filler)
        } else {
            return Err(Error::fatal(
                DiagnosticKind::MissingBraces,
                src.line(),
                Some("vlen"),
            ));
        };

        let instance = match self.session.vlens().get(list.id()) {
            Some(instance) => instance,
            None => {
                let uid = self.session.vlens_mut().allocate();
                let base = ensure_basetype(schema, typ);
                let count = if schema[base].typ.typecode == NcType::Char {
                    let packed = concat_chars(list.iter());
                    self.warn(&packed);
                    self.generator.vlen_string(&schema[typ], uid, &packed.bytes)
                } else {
                    let mut vlencode = G::Code::default();
                    let layout = layout_of(self.schema, base, list.len());
                    let id = self
                        .generator
                        .list_begin(&mut vlencode, ListClass::Vlen, layout);
                    let mut elems = Datasrc::new(Rc::clone(&list));
                    let mut n = 0;
                    while elems.more() {
                        if n > 0 {
                            self.generator
                                .list_separator(&mut vlencode, ListClass::Vlen, id, n);
                        }
                        self.materialize(base, &mut elems, &mut vlencode, None)?;
                        n += 1;
                    }
                    self.generator
                        .list_end(&mut vlencode, ListClass::Vlen, id, n);
                    self.generator.vlen_declare(&schema[typ], uid, n, vlencode);
                    n
                };
                let instance = VlenInstance {
                    uid,
                    count,
                    schema: typ,
                };
                debug!(vlen = %schema[typ].name, uid, count, "interned vlen instance");
                self.session.vlens_mut().insert(list.id(), instance);
                instance
            }
        };
        let atom = Atom::Vlen(VlenRef {
            uid: instance.uid,
            count: instance.count,
        });
        self.generator.constant(code, &atom);
        Ok(())
    }

    /// Position `src` inside the sublist for one instance of `typ`.
    ///
    /// A fill marker or missing data splices in the filler first. Every
    /// successful call must be matched by `src.pop()`.
    fn descend(
        &mut self,
        typ: SymbolId,
        src: &mut Datasrc,
        filler: Option<&Rc<Datalist>>,
        what: &str,
    ) -> Result<()> {
        if src.is_sublist() {
            src.push();
            return Ok(());
        }
        if !(src.is_fill() || !src.more()) {
            return Err(Error::fatal(
                DiagnosticKind::MissingBraces,
                src.line(),
                Some(what),
            ));
        }
        if src.is_fill() {
            src.next();
        }
        let fill = filler
            .filter(|f| f.get(0).is_some_and(Constant::is_list))
            .cloned()
            .unwrap_or_else(|| getfiller(self.schema, self.session, typ));
        src.splice(fill);
        src.push();
        Ok(())
    }

    /// The list payload of a compound, vlen or array field filler.
    fn fill_list(&mut self, typ: SymbolId, filler: Option<&Rc<Datalist>>) -> Rc<Datalist> {
        let from = |fill: &Rc<Datalist>| fill.get(0).and_then(Constant::as_list).cloned();
        if let Some(list) = filler.and_then(from) {
            return list;
        }
        let fill = getfiller(self.schema, self.session, typ);
        match from(&fill) {
            Some(list) => list,
            None => Rc::new(Datalist::from(vec![ensure_instance(self.schema, typ, &fill)])),
        }
    }

    fn fill_instance(&mut self, typ: SymbolId, filler: Option<&Rc<Datalist>>) -> Constant {
        let fill = match filler {
            Some(fill) => Rc::clone(fill),
            None => getfiller(self.schema, self.session, typ),
        };
        ensure_instance(self.schema, typ, &fill)
    }

    /// Convert a primitive, enum or opaque constant to its declared form.
    fn primitive(&mut self, typ: SymbolId, con: &Constant) -> Result<Atom> {
        let schema = self.schema;
        let sym = &schema[typ];
        let target = match sym.type_class() {
            Some(TypeClass::Enum) => schema[ensure_basetype(schema, typ)].typ.typecode,
            _ => sym.typ.typecode,
        };
        let scalar = match &con.value {
            Value::Scalar(scalar) => scalar.clone(),
            Value::Econst(econst) => ensure_econst_value(schema, *econst).clone(),
            Value::Fill => {
                let fill = self.fill_instance(typ, None);
                return self.primitive(typ, &fill);
            }
            Value::List(_) => {
                return Err(Error::fatal(
                    DiagnosticKind::ExpectedPrimitive,
                    con.line,
                    Some(sym.name.as_str()),
                ));
            }
        };
        let converted = scalar.convert(target).map_err(|err| {
            Error::fatal(DiagnosticKind::BadConversion, con.line, Some(err.to_string().as_str()))
        })?;
        let scalar = match converted {
            Scalar::Opaque(hex) => {
                let hex = normalize_opaque(&hex, sym.typ.size);
                opaque_bytes(&hex).map_err(|err| {
                    Error::fatal(DiagnosticKind::BadConversion, con.line, Some(err.to_string().as_str()))
                })?;
                Scalar::Opaque(hex)
            }
            other => other,
        };
        Ok(Atom::Scalar(scalar))
    }

    fn extra_data(&self, src: &Datasrc, sym: SymbolId) -> Error {
        Error::fatal(
            DiagnosticKind::ExtraData,
            src.line(),
            Some(self.schema[sym].name.as_str()),
        )
    }

    fn warn(&mut self, packed: &Packed) {
        for &(kind, line) in &packed.warnings {
            self.session.warn(kind, line, None);
        }
    }
}

fn layout_of(schema: &Schema, base: SymbolId, count: usize) -> ListLayout {
    let typ = &schema[base].typ;
    ListLayout {
        count,
        size: typ.size,
        alignment: typ.alignment,
    }
}
