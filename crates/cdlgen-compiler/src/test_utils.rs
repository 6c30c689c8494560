//! Schema fixtures and snapshot helpers.

use cdlgen_core::NcType;

use crate::backend::binary::{self, BinaryGenerator, MemorySink};
use crate::backend::{c, cdl};
use crate::data::{Constant, Datalist};
use crate::symbols::{Schema, SymbolId};
use crate::{Config, Session, analyze};

/// Snapshot test for the CDL `data:` section of an analyzed schema.
#[macro_export]
macro_rules! shot_cdl {
    ($schema:expr, @$snapshot:literal) => {{
        let output = $crate::test_utils::cdl_output($schema);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}

/// Snapshot test for the generated C of an analyzed schema.
#[macro_export]
macro_rules! shot_c {
    ($schema:expr, @$snapshot:literal) => {{
        let output = $crate::test_utils::c_output($schema);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}

pub fn ints(values: &[i32]) -> Datalist {
    values.iter().map(|&v| Constant::int(v)).collect()
}

pub fn strings(values: &[&str]) -> Datalist {
    values.iter().map(|&s| Constant::string(s)).collect()
}

/// A sublist constant of ints.
pub fn int_list(values: &[i32]) -> Constant {
    Constant::list(ints(values))
}

/// `compound pair { short a; int b; }` in the root group.
pub fn pair_compound(schema: &mut Schema) -> SymbolId {
    let root = schema.root();
    let short = schema.prim(NcType::Short);
    let int = schema.prim(NcType::Int);
    let pair = schema.add_compound(root, "pair");
    schema.add_field(pair, "a", short, &[]);
    schema.add_field(pair, "b", int, &[]);
    pair
}

/// Run semantic analysis with `config`, panicking on failure.
pub fn analyzed_with(schema: &mut Schema, config: Config) -> Session {
    let mut session = Session::new(config);
    if let Err(err) = analyze(schema, &mut session) {
        panic!("analysis failed: {err}");
    }
    session
}

/// Run semantic analysis for the netCDF-4 model.
pub fn analyzed(schema: &mut Schema) -> Session {
    analyzed_with(schema, Config::new().format(crate::Format::Netcdf4))
}

pub fn cdl_output(schema: &mut Schema) -> String {
    let mut session = analyzed(schema);
    match cdl::generate(schema, &mut session) {
        Ok(text) => text,
        Err(err) => panic!("CDL generation failed: {err}"),
    }
}

pub fn c_output(schema: &mut Schema) -> String {
    let mut session = analyzed(schema);
    match c::generate(schema, &mut session) {
        Ok(text) => text,
        Err(err) => panic!("C generation failed: {err}"),
    }
}

/// Binary generation into a recording sink.
pub fn binary_output(schema: &mut Schema, config: Config) -> (MemorySink, BinaryGenerator) {
    let mut session = analyzed_with(schema, config);
    let mut sink = MemorySink::new();
    match binary::generate(schema, &mut session, &mut sink) {
        Ok(generator) => (sink, generator),
        Err(err) => panic!("binary generation failed: {err}"),
    }
}
