use cdlgen_core::{NcType, Scalar, UNLIMITED};

use crate::data::{Constant, Datalist};
use crate::shot_cdl;
use crate::symbols::{Schema, SymbolId};
use crate::test_utils::{int_list, ints, pair_compound, strings};

fn var(schema: &mut Schema, name: &str, typ: SymbolId, dims: &[(&str, usize)], data: Datalist) {
    let root = schema.root();
    let dims: Vec<_> = dims
        .iter()
        .map(|&(dim, size)| {
            schema
                .lookup_in(root, dim)
                .unwrap_or_else(|| schema.add_dim(root, dim, size))
        })
        .collect();
    let v = schema.add_var(root, name, typ, &dims);
    schema.set_data(v, data);
}

#[test]
fn integers_with_default_fills() {
    let mut schema = Schema::new("t.cdl");
    let int = schema.prim(NcType::Int);
    let byte = schema.prim(NcType::Byte);
    var(&mut schema, "counts", int, &[("n", 4)], ints(&[1, -2]));
    var(&mut schema, "flag", byte, &[], ints(&[-5]));

    shot_cdl!(&mut schema, @r"
    data:

      counts = 1, -2, _, _ ;
      flag = -5 ;
    ");
}

#[test]
fn floating_point_values() {
    let mut schema = Schema::new("t.cdl");
    let float = schema.prim(NcType::Float);
    let double = schema.prim(NcType::Double);
    var(
        &mut schema,
        "f",
        float,
        &[("three", 3)],
        vec![
            Constant::float(1.5),
            Constant::float(f32::INFINITY),
            Constant::int(2),
        ]
        .into(),
    );
    var(
        &mut schema,
        "d",
        double,
        &[("three", 3)],
        vec![
            Constant::double(0.25),
            Constant::double(f64::NAN),
            Constant::double(f64::NEG_INFINITY),
        ]
        .into(),
    );

    shot_cdl!(&mut schema, @r"
    data:

      f = 1.5, Infinity, 2.0 ;
      d = 0.25, NaN, -Infinity ;
    ");
}

#[test]
fn text_is_quoted_and_escaped() {
    let mut schema = Schema::new("t.cdl");
    let char_type = schema.prim(NcType::Char);
    let string = schema.prim(NcType::String);
    var(&mut schema, "c", char_type, &[], strings(&["x"]));
    var(
        &mut schema,
        "label",
        char_type,
        &[("len", 6)],
        strings(&["a\"b\tc"]),
    );
    var(
        &mut schema,
        "names",
        string,
        &[("two", 2)],
        strings(&["it's", "a\\b"]),
    );

    shot_cdl!(&mut schema, @r#"
    data:

      c = "x" ;
      label = "a\"b\tc\0" ;
      names = "it's", "a\\b" ;
    "#);
}

#[test]
fn records_grow_with_the_data() {
    let mut schema = Schema::new("t.cdl");
    let short = schema.prim(NcType::Short);
    var(
        &mut schema,
        "obs",
        short,
        &[("time", UNLIMITED), ("pair", 2)],
        ints(&[1, 2, 3]),
    );

    shot_cdl!(&mut schema, @r"
    data:

      obs = 1, 2, 3, _ ;
    ");
}

#[test]
fn compounds_and_vlens_are_braced() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let pair = pair_compound(&mut schema);
    let ragged = schema.add_vlen(root, "ragged", int);
    var(
        &mut schema,
        "pairs",
        pair,
        &[("two", 2)],
        vec![int_list(&[1, 2])].into(),
    );
    var(
        &mut schema,
        "rows",
        ragged,
        &[("two", 2)],
        vec![int_list(&[1, 2, 3]), int_list(&[])].into(),
    );

    shot_cdl!(&mut schema, @r"
    data:

      pairs = {1, 2}, {_, _} ;
      rows = {1, 2, 3}, {} ;
    ");
}

#[test]
fn enums_and_opaques() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let color = schema.add_enum(root, "color", NcType::UByte);
    let red = schema.add_econst(color, "red", Constant::int(1));
    let blob = schema.add_opaque(root, "blob", 2);
    var(&mut schema, "tint", color, &[], vec![Constant::econst(red)].into());
    var(
        &mut schema,
        "raw",
        blob,
        &[("two", 2)],
        vec![Constant::opaque("0xAB")].into(),
    );
    var(
        &mut schema,
        "wide",
        color,
        &[],
        vec![Constant::scalar(Scalar::UByte(7))].into(),
    );

    shot_cdl!(&mut schema, @r"
    data:

      tint = 1 ;
      raw = 0xab00, _ ;
      wide = 7 ;
    ");
}

#[test]
fn variables_without_data_are_skipped() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    schema.add_var(root, "empty", int, &[]);
    schema.add_attribute(root, None, "title", None, strings(&["ignored"]));
    var(&mut schema, "one", int, &[], ints(&[1]));

    shot_cdl!(&mut schema, @r"
    data:

      one = 1 ;
    ");
}
