//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::Diagnostics;
use super::message::{Diagnostic, Severity};

/// Builder for rendering diagnostics with various options.
///
/// Without source text every diagnostic renders as `<file>:<line>: <severity>: <message>`.
/// With source text the offending line is shown as an annotated snippet.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            let range = self
                .source
                .and_then(|source| line_range(source, diag.span.line).map(|r| (source, r)));
            let Some((source, range)) = range else {
                self.format_plain(w, diag)?;
                continue;
            };

            let mut snippet = Snippet::source(source).line_start(1).annotation(
                AnnotationKind::Primary
                    .span(range)
                    .label(&diag.message),
            );
            if let Some(p) = self.path {
                snippet = snippet.path(p);
            }

            let level = severity_to_level(diag.severity());
            let report: Vec<Group> = vec![level.primary_title(&diag.message).element(snippet)];
            write!(w, "{}", renderer.render(&report))?;
        }
        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write, diag: &Diagnostic) -> std::fmt::Result {
        let path = self.path.unwrap_or("<input>");
        if diag.span.line > 0 {
            write!(w, "{path}:{}: ", diag.span.line)?;
        } else {
            write!(w, "{path}: ")?;
        }
        write!(w, "{}: {}", diag.severity(), diag.message)
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

/// Byte range of the 1-based `line` in `source`, without its newline.
fn line_range(source: &str, line: u32) -> Option<Range<usize>> {
    if line == 0 {
        return None;
    }
    let mut start = 0;
    for (n, text) in source.split_inclusive('\n').enumerate() {
        if n + 1 == line as usize {
            let len = text.trim_end_matches(['\n', '\r']).len();
            return Some(start..start + len.max(1).min(text.len().max(1)));
        }
        start += text.len();
    }
    None
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
