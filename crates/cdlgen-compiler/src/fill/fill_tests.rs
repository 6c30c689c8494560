use std::rc::Rc;

use cdlgen_core::NcType;
use cdlgen_core::fill::{FILL_INT, FILL_SHORT, FILL_UBYTE};

use super::{checkfillvalue, getfiller};
use crate::data::{Constant, Datalist};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::session::Session;
use crate::symbols::Schema;
use crate::test_utils::{analyzed, int_list, ints, pair_compound};

fn kinds(diags: &Diagnostics) -> Vec<DiagnosticKind> {
    diags.iter().map(|d| d.kind()).collect()
}

#[test]
fn filler_is_cached() {
    let schema = Schema::new("t.cdl");
    let mut session = Session::default();
    let int = schema.prim(NcType::Int);

    let first = getfiller(&schema, &mut session, int);
    let second = getfiller(&schema, &mut session, int);

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(*first, ints(&[FILL_INT]));
}

#[test]
fn compound_filler_holds_one_value_per_field() {
    let mut schema = Schema::new("t.cdl");
    let pair = pair_compound(&mut schema);
    let mut session = Session::default();

    let fill = getfiller(&schema, &mut session, pair);

    let expected: Datalist = vec![Constant::list(
        vec![Constant::short(FILL_SHORT), Constant::int(FILL_INT)].into(),
    )]
    .into();
    assert_eq!(*fill, expected);
}

#[test]
fn vlen_filler_wraps_one_base_fill() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let vlen = schema.add_vlen(root, "ragged", int);
    let mut session = Session::default();

    let fill = getfiller(&schema, &mut session, vlen);

    let expected: Datalist = vec![int_list(&[FILL_INT])].into();
    assert_eq!(*fill, expected);
}

#[test]
fn array_field_filler_repeats_base_fill() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let three = schema.add_anon_dim(3);
    let cmpd = schema.add_compound(root, "triple");
    schema.add_field(cmpd, "v", int, &[three]);
    let mut session = Session::default();

    let fill = getfiller(&schema, &mut session, cmpd);

    let expected: Datalist =
        vec![Constant::list(vec![int_list(&[FILL_INT, FILL_INT, FILL_INT])].into())].into();
    assert_eq!(*fill, expected);
}

#[test]
fn enum_and_opaque_fillers() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let color = schema.add_enum(root, "color", NcType::UByte);
    let blob = schema.add_opaque(root, "blob", 4);
    let mut session = Session::default();

    let color_fill = getfiller(&schema, &mut session, color);
    let blob_fill = getfiller(&schema, &mut session, blob);

    assert_eq!(color_fill.get(0), Some(&Constant::scalar(cdlgen_core::Scalar::UByte(FILL_UBYTE))));
    assert_eq!(blob_fill.get(0), Some(&Constant::opaque("00")));
}

#[test]
fn variable_filler_prefers_fill_value_attribute() {
    let mut schema = Schema::new("t.cdl");
    let root = schema.root();
    let int = schema.prim(NcType::Int);
    let plain = schema.add_var(root, "plain", int, &[]);
    let custom = schema.add_var(root, "custom", int, &[]);
    schema.add_attribute(root, Some(custom), "_FillValue", None, ints(&[-1]));

    let mut session = analyzed(&mut schema);

    assert_eq!(*getfiller(&schema, &mut session, plain), ints(&[FILL_INT]));
    assert_eq!(*getfiller(&schema, &mut session, custom), ints(&[-1]));
}

#[test]
fn fill_value_for_compound_needs_braces() {
    let mut schema = Schema::new("t.cdl");
    let pair = pair_compound(&mut schema);
    let mut diags = Diagnostics::new();

    assert!(!checkfillvalue(&schema, pair, &ints(&[1]), &mut diags));
    assert_eq!(kinds(&diags), vec![DiagnosticKind::FillValueMismatch]);

    let mut diags = Diagnostics::new();
    let braced: Datalist = vec![int_list(&[1, 2])].into();
    assert!(checkfillvalue(&schema, pair, &braced, &mut diags));
    assert!(diags.is_empty());
}

#[test]
fn fill_value_must_be_single() {
    let schema = Schema::new("t.cdl");
    let int = schema.prim(NcType::Int);
    let mut diags = Diagnostics::new();

    assert!(!checkfillvalue(&schema, int, &ints(&[1, 2]), &mut diags));
    assert_eq!(kinds(&diags), vec![DiagnosticKind::FillValueNotSingle]);
}

#[test]
fn fill_value_rejects_sublist_for_primitive() {
    let schema = Schema::new("t.cdl");
    let int = schema.prim(NcType::Int);
    let mut diags = Diagnostics::new();
    let data: Datalist = vec![int_list(&[1])].into();

    assert!(!checkfillvalue(&schema, int, &data, &mut diags));
    assert_eq!(kinds(&diags), vec![DiagnosticKind::ExpectedPrimitive]);
}

#[test]
fn fill_value_rejects_unparsable_string() {
    let schema = Schema::new("t.cdl");
    let double = schema.prim(NcType::Double);
    let mut diags = Diagnostics::new();
    let data: Datalist = vec![Constant::string("abc")].into();

    assert!(!checkfillvalue(&schema, double, &data, &mut diags));
    assert_eq!(kinds(&diags), vec![DiagnosticKind::FillValueMismatch]);
}
