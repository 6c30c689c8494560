//! cdlgen compiler: semantic analysis and typed data materialization.
//!
//! This crate turns a CDL symbol table with literal data into backend output:
//! - `symbols` - the schema arena and its builder
//! - `data` - constants, datalists and the `Datasrc` cursor
//! - `semantics` - ordering, layout, attribute and unlimited-dimension passes
//! - `fill` - fill-value synthesis and `_FillValue` validation
//! - `generate` - the materialization engine and the `Generator`/`Writer` traits
//! - `backend` - binary, CDL and C backends
//! - `diagnostics` - error and warning reporting

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod backend;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod fill;
pub mod generate;
pub mod semantics;
pub mod session;
pub mod symbols;

mod invariants;

#[cfg(test)]
pub mod test_utils;

pub use config::{Config, Format, SpecialPolicy};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity, Span};
pub use generate::SinkError;
pub use semantics::analyze;
pub use session::Session;
pub use symbols::{Schema, SymbolId};

/// Errors that abort a compilation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A fatal semantic error at the first structural violation.
    #[error("{0}")]
    Semantic(Diagnostic),

    /// Several errors collected before aborting.
    #[error("semantic analysis failed with {} errors", .0.error_count())]
    Diagnostics(Diagnostics),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl Error {
    /// Fatal error of `kind` at `line`, with an optional detail for the kind's template.
    pub(crate) fn fatal(kind: DiagnosticKind, line: u32, detail: Option<&str>) -> Self {
        Error::Semantic(Diagnostic::new(kind, Span::line(line), kind.message(detail)))
    }

    /// The diagnostics carried by this error, if any.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        match self {
            Error::Semantic(diag) => vec![diag],
            Error::Diagnostics(diags) => diags.iter().collect(),
            Error::Sink(_) => Vec::new(),
        }
    }
}

/// Result type for compilation passes.
pub type Result<T> = std::result::Result<T, Error>;
