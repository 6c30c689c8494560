use cdlgen_core::{NcType, UNLIMITED};

use crate::Error;
use crate::data::{Constant, Datalist};
use crate::diagnostics::DiagnosticKind;
use crate::symbols::{Schema, SymbolId};
use crate::test_utils::{analyzed, int_list, ints, strings};
use crate::{Config, Format, Session, analyze};

fn unlimited_size(schema: &Schema, dim: SymbolId) -> usize {
    schema[dim].dim().map_or(usize::MAX, |d| d.size())
}

fn sublists(lists: &[&[i32]]) -> Datalist {
    lists.iter().map(|values| int_list(values)).collect()
}

#[test]
fn record_count_rounds_up_partial_records() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let time = schema.add_dim(root, "time", UNLIMITED);
    let three = schema.add_dim(root, "three", 3);
    let v = schema.add_var(root, "v", int, &[time, three]);
    schema.set_data(v, ints(&[0; 20]));

    analyzed(&mut schema);

    assert_eq!(unlimited_size(&schema, time), 7);
    assert_eq!(schema[v].typ.nelems, 21);
}

#[test]
fn char_records_count_padded_strings() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let char_type = schema.prim(NcType::Char);
    let time = schema.add_dim(root, "time", UNLIMITED);
    let len = schema.add_dim(root, "len", 4);
    let v = schema.add_var(root, "names", char_type, &[time, len]);
    schema.set_data(v, strings(&["ab", "cde"]));

    analyzed(&mut schema);

    assert_eq!(unlimited_size(&schema, time), 2);
}

#[test]
fn largest_variable_sizes_the_dimension() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let time = schema.add_dim(root, "time", UNLIMITED);
    let short = schema.add_var(root, "short", int, &[time]);
    let long = schema.add_var(root, "long", int, &[time]);
    let empty = schema.add_var(root, "empty", int, &[time]);
    schema.set_data(short, ints(&[1, 2, 3]));
    schema.set_data(long, ints(&[1, 2, 3, 4, 5]));

    analyzed(&mut schema);

    assert_eq!(unlimited_size(&schema, time), 5);
    assert_eq!(schema[empty].typ.nelems, 5);
}

#[test]
fn nested_unlimited_takes_longest_sublist() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let time = schema.add_dim(root, "time", UNLIMITED);
    let two = schema.add_dim(root, "two", 2);
    let obs = schema.add_dim(root, "obs", UNLIMITED);
    let v = schema.add_var(root, "v", int, &[time, two, obs]);
    schema.set_data(v, sublists(&[&[1], &[1, 2, 3], &[1, 2], &[]]));

    analyzed(&mut schema);

    assert_eq!(unlimited_size(&schema, time), 2);
    assert_eq!(unlimited_size(&schema, obs), 3);
}

#[test]
fn inner_unlimited_is_sized_from_each_row() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let rows = schema.add_dim(root, "rows", 2);
    let obs = schema.add_dim(root, "obs", UNLIMITED);
    let v = schema.add_var(root, "v", int, &[rows, obs]);
    let mut data = sublists(&[&[1, 2, 3]]);
    data.push(Constant::fill());
    data.push(int_list(&[4]));
    schema.set_data(v, data);

    analyzed(&mut schema);

    assert_eq!(unlimited_size(&schema, obs), 3);
}

#[test]
fn unlimited_without_data_is_empty() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let time = schema.add_dim(root, "time", UNLIMITED);
    schema.add_var(root, "v", int, &[time]);

    analyzed(&mut schema);

    assert_eq!(unlimited_size(&schema, time), 0);
}

#[test]
fn inner_unlimited_needs_sublists() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let rows = schema.add_dim(root, "rows", 2);
    let obs = schema.add_dim(root, "obs", UNLIMITED);
    let v = schema.add_var(root, "v", int, &[rows, obs]);
    schema.set_data(v, ints(&[1, 2]));

    let mut session = Session::new(Config::new().format(Format::Netcdf4));
    let err = analyze(&mut schema, &mut session).err();

    let Some(Error::Semantic(diag)) = err else {
        panic!("expected a fatal error, got {err:?}");
    };
    assert_eq!(diag.kind(), DiagnosticKind::ExpectedSublist);
    assert_eq!(diag.message(), "expected {..} found primitive: v");
}
