use super::*;

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExtraData, Span::line(3))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics.printer().path("t.cdl").render(), @"t.cdl:3: error: too much data");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MissingBraces, Span::line(7))
        .message("Compound")
        .emit();
    diagnostics
        .report(DiagnosticKind::CircularType, Span::default())
        .message("node_t")
        .emit();

    insta::assert_snapshot!(diagnostics.printer().path("t.cdl").render(), @r"
    t.cdl:7: error: Compound constants must be enclosed in {..}
    t.cdl: error: circular type dependency for type: node_t
    ");
}

#[test]
fn warnings_are_counted_separately() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::CharDataTooLong, Span::line(1))
        .emit();
    diagnostics
        .report(DiagnosticKind::IllegalCharConstant, Span::line(2))
        .emit();
    diagnostics
        .report(DiagnosticKind::FillValueMismatch, Span::line(2))
        .emit();

    assert_eq!(diagnostics.warning_count(), 2);
    assert_eq!(diagnostics.error_count(), 1);

    let errors = diagnostics.take_errors();
    assert_eq!(errors.len(), 1);
    assert!(!diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
}

#[test]
fn display_includes_line() {
    let diag = Diagnostic::with_default_message(DiagnosticKind::ExpectedSublist, Span::line(12));
    insta::assert_snapshot!(diag, @"error: line 12: expected {..} found primitive");
}

#[test]
fn source_rendering_points_at_line() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExtraData, Span::line(2))
        .message("scalar `x`")
        .emit();

    let source = "data:\n x = 1, 2 ;\n";
    let rendered = diagnostics.printer().source(source).path("t.cdl").render();

    assert!(rendered.contains("too much data: scalar `x`"));
    assert!(rendered.contains("x = 1, 2 ;"));
    assert!(rendered.contains("t.cdl"));
}

#[test]
fn source_rendering_falls_back_for_unknown_line() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExtraData, Span::line(40))
        .emit();

    let rendered = diagnostics.printer().source("one line").render();
    insta::assert_snapshot!(rendered, @"<input>:40: error: too much data");
}
