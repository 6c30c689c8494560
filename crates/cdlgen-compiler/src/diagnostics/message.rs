use std::fmt;

use super::Span;

/// Kinds of diagnostics produced by semantic analysis and materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Type graph
    CircularType,
    DuplicateEnumConstant,
    EnumValueOutOfRange,

    // Declarations
    UnlimitedNotFirst,
    IllegalSpecialValue,
    EmptyNonCharAttribute,

    // Literal shape vs declared type
    MissingBraces,
    ExpectedSublist,
    ExpectedPrimitive,
    ExtraData,
    BadConversion,
    MalformedCharData,

    // Fill values
    FillValueMismatch,
    FillValueNotSingle,

    // Recoverable character data anomalies
    CharDataTooLong,
    IllegalCharConstant,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::CharDataTooLong | Self::IllegalCharConstant => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Base message for this kind, used when no detail is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::CircularType => "circular type dependency",
            Self::DuplicateEnumConstant => "duplicate enum constant",
            Self::EnumValueOutOfRange => "enum constant out of range",
            Self::UnlimitedNotFirst => "UNLIMITED must be in first dimension only",
            Self::IllegalSpecialValue => "illegal special attribute value",
            Self::EmptyNonCharAttribute => "empty datalist can only be assigned to char attributes",
            Self::MissingBraces => "constants must be enclosed in {..}",
            Self::ExpectedSublist => "expected {..} found primitive",
            Self::ExpectedPrimitive => "expected primitive found {..}",
            Self::ExtraData => "too much data",
            Self::BadConversion => "constant cannot be converted",
            Self::MalformedCharData => "malformed character datalist",
            Self::FillValueMismatch => "_FillValue does not match its type",
            Self::FillValueNotSingle => "_FillValue must be a single value",
            Self::CharDataTooLong => "character data list too long",
            Self::IllegalCharConstant => "non-character constant in character data; ignored",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::CircularType => "circular type dependency for type: {}".to_string(),
            Self::DuplicateEnumConstant => "duplicate enum constant `{}`".to_string(),
            Self::UnlimitedNotFirst => {
                "variable `{}`: UNLIMITED must be in first dimension only".to_string()
            }
            Self::MissingBraces => "{} constants must be enclosed in {..}".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replacen("{}", detail, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One reported problem, anchored to a CDL source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) kind: DiagnosticKind,
    pub(crate) span: Span,
    pub(crate) message: String,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, span: Span) -> Self {
        Self::new(kind, span, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.severity())?;
        if self.span.line > 0 {
            write!(f, "line {}: ", self.span.line)?;
        }
        f.write_str(&self.message)
    }
}
