use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// Diagnostic severity.
///
/// Errors block emission; warnings and infos never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic produced by any compiler stage.
///
/// Diagnostics are collected in an ordered vector rather than aborting the
/// stage that produced them; every stage keeps going after a recoverable
/// error so one compile reports as many problems as it can find. The
/// driver attaches `source` and `filename` before handing diagnostics to
/// callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable 4-character code, e.g. `L002`, `P001`, `T006`.
    pub code: &'static str,
    pub message: String,
    pub span: Span,
    /// Optional fix or context hints, rendered as help text.
    pub hints: Vec<String>,
    /// The full source text, attached by the driver.
    pub source: Option<String>,
    /// The originating filename, attached by the driver.
    pub filename: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
            hints: Vec::new(),
            source: None,
            filename: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, span)
        }
    }

    /// Append a hint to this diagnostic.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Attach the source text and filename. Called by the driver on every
    /// diagnostic before it is returned to the caller.
    pub fn with_source(mut self, source: &str, filename: &str) -> Self {
        self.source = Some(source.to_string());
        self.filename = Some(filename.to_string());
        self
    }

    /// Whether this diagnostic has error severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

// ── Stable diagnostic codes ────────────────────────────────────────────
//
// The code set is closed; downstream tooling matches on these strings.

pub mod codes {
    // Lexer
    pub const UNEXPECTED_CHAR: &str = "L001";
    pub const UNTERMINATED_STRING: &str = "L002";
    pub const UNTERMINATED_BLOCK_COMMENT: &str = "L003";
    pub const INVALID_NUMBER: &str = "L004";
    pub const INVALID_ESCAPE: &str = "L005";

    // Parser
    pub const UNEXPECTED_TOKEN: &str = "P001";
    pub const EXPECTED_EXPRESSION: &str = "P002";
    pub const EXPECTED_IDENT: &str = "P003";
    pub const EXPECTED_TYPE: &str = "P004";
    pub const UNCLOSED_PAREN: &str = "P005";
    pub const UNCLOSED_BRACE: &str = "P006";
    pub const UNCLOSED_BRACKET: &str = "P007";
    pub const INVALID_PATTERN: &str = "P008";
    pub const INVALID_ASSIGNMENT: &str = "P009";

    // Type checker
    pub const TYPE_MISMATCH: &str = "T001";
    pub const UNDEFINED_VARIABLE: &str = "T002";
    pub const UNDEFINED_TYPE: &str = "T003";
    pub const NOT_A_FUNCTION: &str = "T004";
    pub const WRONG_ARITY: &str = "T005";
    pub const INFINITE_TYPE: &str = "T006";
    pub const DUPLICATE_FIELD: &str = "T007";
    pub const MISSING_FIELD: &str = "T008";
    /// Reserved for an exhaustiveness pass.
    pub const NON_EXHAUSTIVE: &str = "T009";
    /// Reserved for the effect-inference pass.
    pub const EFFECT_OUTSIDE_DO: &str = "T010";
    /// Reserved for the ambient-resolution pass.
    pub const UNRESOLVED_AMBIENT: &str = "T011";

    // Modules (reserved for a cross-module resolution pass)
    pub const DUPLICATE_MODULE: &str = "M001";
    pub const UNKNOWN_MODULE: &str = "M002";
    pub const IMPORT_CYCLE: &str = "M003";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_error_constructor() {
        let d = Diagnostic::error(codes::UNDEFINED_VARIABLE, "undefined variable `y`", Span::new(8, 9));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.code, "T002");
        assert!(d.is_error());
        assert!(d.source.is_none());
    }

    #[test]
    fn diagnostic_with_source() {
        let d = Diagnostic::error(codes::UNEXPECTED_CHAR, "unexpected character", Span::new(0, 1))
            .with_source("§", "demo.ldawg");
        assert_eq!(d.source.as_deref(), Some("§"));
        assert_eq!(d.filename.as_deref(), Some("demo.ldawg"));
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::warning(codes::NON_EXHAUSTIVE, "match may be non-exhaustive", Span::new(0, 5));
        assert_eq!(d.to_string(), "warning[T009]: match may be non-exhaustive");
        assert!(!d.is_error());
    }

    #[test]
    fn diagnostic_hints() {
        let d = Diagnostic::error(codes::TYPE_MISMATCH, "expected Int, found String", Span::new(4, 9))
            .with_hint("use show to format values");
        assert_eq!(d.hints.len(), 1);
    }
}
