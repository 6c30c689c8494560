use cdlgen_core::{NcType, Scalar, UNLIMITED};

use crate::data::{Constant, Datalist};
use crate::diagnostics::DiagnosticKind;
use crate::symbols::{Schema, Storage, SymbolId, SymbolKind};
use crate::test_utils::{analyzed, analyzed_with, int_list, ints, pair_compound, strings};
use crate::{Config, Error, Format, Session, SpecialPolicy, analyze};

fn analyze_err(schema: &mut Schema, config: Config) -> Error {
    let mut session = Session::new(config);
    match analyze(schema, &mut session) {
        Ok(()) => panic!("analysis unexpectedly succeeded"),
        Err(err) => err,
    }
}

fn fatal_kind(err: &Error) -> DiagnosticKind {
    match err {
        Error::Semantic(diag) => diag.kind(),
        other => panic!("expected a fatal semantic error, got {other:?}"),
    }
}

fn netcdf4() -> Config {
    Config::new().format(Format::Netcdf4)
}

fn untyped(schema: &mut Schema, name: &str, data: Datalist) -> SymbolId {
    let root = schema.root();
    schema.add_attribute(root, None, name, None, data)
}

#[test]
fn circular_compounds_are_rejected() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let a = schema.add_compound(root, "a");
    let b = schema.add_compound(root, "b");
    schema.add_field(a, "to_b", b, &[]);
    schema.add_field(b, "to_a", a, &[]);

    let err = analyze_err(&mut schema, netcdf4());

    assert_eq!(fatal_kind(&err), DiagnosticKind::CircularType);
    assert_eq!(err.to_string(), "circular type dependency for type: a");
}

#[test]
fn types_follow_their_dependencies() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let outer = schema.add_compound(root, "outer");
    let ragged = schema.add_vlen(root, "ragged", outer);
    let inner = pair_compound(&mut schema);
    schema.add_field(outer, "p", inner, &[]);

    analyzed(&mut schema);

    assert_eq!(schema.typdefs(), &[inner, outer, ragged]);
}

#[test]
fn compound_fields_are_naturally_aligned() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let cmpd = schema.add_compound(root, "mixed");
    let fields = [
        (NcType::Char, "c"),
        (NcType::Int, "i"),
        (NcType::Short, "s"),
        (NcType::Double, "d"),
    ]
    .map(|(t, name)| {
        let base = schema.prim(t);
        schema.add_field(cmpd, name, base, &[])
    });

    analyzed(&mut schema);

    let offsets: Vec<_> = fields.iter().map(|&f| schema[f].typ.offset).collect();
    assert_eq!(offsets, vec![0, 4, 8, 16]);
    assert_eq!(schema[cmpd].typ.size, 24);
    assert_eq!(schema[cmpd].typ.alignment, 1);
}

#[test]
fn array_fields_scale_their_base_size() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let short = schema.prim(NcType::Short);
    let int = schema.prim(NcType::Int);
    let three = schema.add_anon_dim(3);
    let cmpd = schema.add_compound(root, "rec");
    let v = schema.add_field(cmpd, "v", short, &[three]);
    let n = schema.add_field(cmpd, "n", int, &[]);

    analyzed(&mut schema);

    assert_eq!(schema[v].typ.nelems, 3);
    assert_eq!(schema[v].typ.size, 6);
    assert_eq!(schema[n].typ.offset, 8);
    assert_eq!(schema[cmpd].typ.size, 12);
    assert_eq!(schema[cmpd].typ.alignment, 2);
}

#[test]
fn vlen_reachability_is_tagged() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let ragged = schema.add_vlen(root, "ragged", int);
    let cmpd = schema.add_compound(root, "holder");
    let field = schema.add_field(cmpd, "r", ragged, &[]);
    let plain = pair_compound(&mut schema);
    let var = schema.add_var(root, "h", cmpd, &[]);

    analyzed(&mut schema);

    assert!(schema[ragged].typ.hasvlen);
    assert!(schema[field].typ.hasvlen);
    assert!(schema[cmpd].typ.hasvlen);
    assert!(schema[var].typ.hasvlen);
    assert!(!schema[plain].typ.hasvlen);
}

#[test]
fn classic_model_requires_leading_unlimited() {
    let build = || {
        let mut schema = Schema::new("t.cdl");
        let root = schema.root();
        let int = schema.prim(NcType::Int);
        let n = schema.add_dim(root, "n", 2);
        let time = schema.add_dim(root, "time", UNLIMITED);
        schema.add_var(root, "v", int, &[n, time]);
        schema
    };

    let err = analyze_err(&mut build(), Config::new());
    assert_eq!(fatal_kind(&err), DiagnosticKind::UnlimitedNotFirst);

    analyzed(&mut build());
}

#[test]
fn untyped_attributes_infer_their_type() {
    let mut schema = Schema::new("t.cdl");
    let text = untyped(&mut schema, "title", strings(&["abc"]));
    let small = untyped(
        &mut schema,
        "small",
        vec![Constant::scalar(Scalar::UByte(7))].into(),
    );
    let wide = untyped(&mut schema, "wide", vec![Constant::int64(1)].into());
    let nested = untyped(
        &mut schema,
        "nested",
        vec![
            Constant::fill(),
            Constant::list(vec![Constant::double(1.5)].into()),
        ]
        .into(),
    );

    analyzed_with(&mut schema, Config::new());

    let typecode = |id: SymbolId| schema[id].typ.typecode;
    assert_eq!(typecode(text), NcType::Char);
    assert_eq!(typecode(small), NcType::Short);
    assert_eq!(typecode(wide), NcType::Int);
    assert_eq!(typecode(nested), NcType::Double);
}

#[test]
fn netcdf4_inference_keeps_extended_types() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let color = schema.add_enum(root, "color", NcType::UByte);
    let red = schema.add_econst(color, "red", Constant::int(1));
    let small = untyped(
        &mut schema,
        "small",
        vec![Constant::scalar(Scalar::UByte(7))].into(),
    );
    let tint = untyped(&mut schema, "tint", vec![Constant::econst(red)].into());
    let blob = untyped(&mut schema, "blob", vec![Constant::opaque("0xff")].into());

    analyzed(&mut schema);

    assert_eq!(schema[small].typ.typecode, NcType::UByte);
    assert_eq!(schema[tint].typ.basetype, Some(color));
    assert_eq!(schema[blob].typ.typecode, NcType::Int);
}

#[test]
fn empty_attributes_become_empty_text() {
    let mut schema = Schema::new("t.cdl");
    let empty = untyped(&mut schema, "note", Datalist::new());

    analyzed(&mut schema);

    assert_eq!(schema[empty].typ.typecode, NcType::Char);
    let data = schema[empty].data.clone().unwrap_or_default();
    assert_eq!(*data, strings(&[""]));
}

#[test]
fn empty_typed_attribute_must_be_char() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    schema.add_attribute(root, None, "count", Some(int), Datalist::new());

    let err = analyze_err(&mut schema, netcdf4());

    assert_eq!(fatal_kind(&err), DiagnosticKind::EmptyNonCharAttribute);
}

#[test]
fn fill_value_errors_are_collected() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let pair = pair_compound(&mut schema);
    let int = schema.prim(NcType::Int);
    let p = schema.add_var(root, "p", pair, &[]);
    let q = schema.add_var(root, "q", int, &[]);
    schema.add_attribute(root, Some(p), "_FillValue", None, ints(&[1]));
    schema.add_attribute(root, Some(q), "_FillValue", None, ints(&[1, 2]));

    let err = analyze_err(&mut schema, netcdf4());

    let Error::Diagnostics(diags) = &err else {
        panic!("expected collected diagnostics, got {err:?}");
    };
    assert_eq!(diags.error_count(), 2);
    assert_eq!(err.to_string(), "semantic analysis failed with 2 errors");
    assert_eq!(err.diagnostics().len(), 2);
}

#[test]
fn valid_fill_value_is_attached_to_its_variable() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let pair = pair_compound(&mut schema);
    let p = schema.add_var(root, "p", pair, &[]);
    let value: Datalist = vec![int_list(&[1, 2])].into();
    let att = schema.add_attribute(root, Some(p), "_FillValue", None, value.clone());

    analyzed(&mut schema);

    assert_eq!(schema[att].typ.basetype, Some(pair));
    let fill = schema.special(p).and_then(|s| s.fill_value.clone());
    assert_eq!(fill.as_deref(), Some(&value));
    assert_eq!(schema[p].var().map(|v| v.attributes.clone()), Some(vec![att]));
}

#[test]
fn duplicate_enum_constants_are_rejected() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let color = schema.add_enum(root, "color", NcType::Byte);
    schema.add_econst(color, "red", Constant::int(0));
    schema.add_econst(color, "red", Constant::int(1));

    let err = analyze_err(&mut schema, netcdf4());

    assert_eq!(fatal_kind(&err), DiagnosticKind::DuplicateEnumConstant);
}

#[test]
fn enum_constants_convert_to_their_basetype() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let color = schema.add_enum(root, "color", NcType::UByte);
    let red = schema.add_econst(color, "red", Constant::int(3));

    analyzed(&mut schema);

    let SymbolKind::Econst(value) = &schema[red].kind else {
        panic!("not an enum constant");
    };
    assert_eq!(value.as_scalar(), Some(&Scalar::UByte(3)));
    assert_eq!(schema[red].typ.typecode, NcType::UByte);
}

#[test]
fn enum_constant_out_of_range() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let color = schema.add_enum(root, "color", NcType::Byte);
    schema.add_econst(color, "huge", Constant::int(300));

    let err = analyze_err(&mut schema, netcdf4());

    assert_eq!(fatal_kind(&err), DiagnosticKind::EnumValueOutOfRange);
}

#[test]
fn specials_are_kept_for_netcdf4() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let v = schema.add_var(root, "v", int, &[]);
    let units = schema.add_attribute(root, Some(v), "units", None, strings(&["m"]));
    let chunks = schema.add_attribute(root, Some(v), "_ChunkSizes", None, ints(&[4, 2]));

    analyzed(&mut schema);

    let special = schema.special(v).cloned().unwrap_or_default();
    assert_eq!(special.chunk_sizes, Some(vec![4, 2]));
    assert_eq!(special.storage, Some(Storage::Chunked));
    assert_eq!(schema.attdefs(), &[units]);
    assert!(!schema[root].subnodes.contains(&chunks));
}

#[test]
fn specials_are_demoted_for_classic() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let v = schema.add_var(root, "v", int, &[]);
    schema.add_attribute(root, Some(v), "_DeflateLevel", None, ints(&[5]));
    schema.add_attribute(root, Some(v), "_Shuffle", None, strings(&["true"]));

    analyzed_with(
        &mut schema,
        Config::new().special_policy(SpecialPolicy::Demote),
    );

    let names: Vec<_> = schema
        .attdefs()
        .iter()
        .map(|&a| format!("{} {}", schema[a].name, schema[a].typ.typecode))
        .collect();
    assert_eq!(names, vec!["_DeflateLevel int", "_Shuffle char"]);
    assert!(!schema.special(v).is_some_and(|s| s.has_flags()));
}

#[test]
fn illegal_special_value_is_fatal() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let v = schema.add_var(root, "v", int, &[]);
    schema.add_attribute(root, Some(v), "_Endianness", None, strings(&["middle"]));

    let err = analyze_err(&mut schema, netcdf4());

    assert_eq!(fatal_kind(&err), DiagnosticKind::IllegalSpecialValue);
    assert_eq!(
        err.to_string(),
        "illegal special attribute value: _Endianness: expected little or big"
    );
}
