//! Type error types with source locations and stable diagnostic codes.

use std::fmt;

use lambdawg_common::diagnostic::{codes, Diagnostic};
use lambdawg_common::span::Span;

use crate::ty::{Ty, TyVar};

/// A type error encountered during inference.
///
/// Each variant carries the span the failing constraint came from, so the
/// resulting diagnostic points at the exact source location.
#[derive(Clone, Debug)]
pub enum TypeError {
    /// Two types that should be equal are not.
    Mismatch { expected: Ty, found: Ty, span: Span },
    /// A type variable appears in its own definition (infinite type).
    InfiniteType { var: TyVar, ty: Ty, span: Span },
    /// A function was applied to the wrong number of arguments.
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },
    /// A variable is used but not defined in scope.
    UnboundVariable { name: String, span: Span },
    /// A type annotation names an unknown type.
    UndefinedType { name: String, span: Span },
    /// A non-function value is called as a function.
    NotAFunction { ty: Ty, span: Span },
    /// A record literal repeats a field name.
    DuplicateField { name: String, span: Span },
    /// A required record field is absent on a closed record.
    MissingField {
        field: String,
        record: Ty,
        span: Span,
    },
}

impl TypeError {
    /// The stable 4-character diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            TypeError::Mismatch { .. } => codes::TYPE_MISMATCH,
            TypeError::UnboundVariable { .. } => codes::UNDEFINED_VARIABLE,
            TypeError::UndefinedType { .. } => codes::UNDEFINED_TYPE,
            TypeError::NotAFunction { .. } => codes::NOT_A_FUNCTION,
            TypeError::ArityMismatch { .. } => codes::WRONG_ARITY,
            TypeError::InfiniteType { .. } => codes::INFINITE_TYPE,
            TypeError::DuplicateField { .. } => codes::DUPLICATE_FIELD,
            TypeError::MissingField { .. } => codes::MISSING_FIELD,
        }
    }

    /// The source span the failing constraint was generated from.
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::InfiniteType { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::UnboundVariable { span, .. }
            | TypeError::UndefinedType { span, .. }
            | TypeError::NotAFunction { span, .. }
            | TypeError::DuplicateField { span, .. }
            | TypeError::MissingField { span, .. } => *span,
        }
    }

    /// Convert into the shared diagnostic record.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string(), self.span());
        match self {
            TypeError::InfiniteType { .. } => {
                diag.with_hint("a value cannot have a type that refers to itself")
            }
            TypeError::UnboundVariable { .. } => diag.with_hint("not found in this scope"),
            TypeError::MissingField { field, .. } => {
                diag.with_hint(format!("add a `{field}` field or widen the record"))
            }
            _ => diag,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Mismatch {
                expected, found, ..
            } => write!(f, "type mismatch: expected `{expected}`, found `{found}`"),
            TypeError::InfiniteType { var, ty, .. } => {
                write!(f, "infinite type: `?{}` occurs in `{ty}`", var.0)
            }
            TypeError::ArityMismatch {
                expected, found, ..
            } => write!(
                f,
                "wrong arity: expected {expected} argument(s), found {found}"
            ),
            TypeError::UnboundVariable { name, .. } => {
                write!(f, "undefined variable `{name}`")
            }
            TypeError::UndefinedType { name, .. } => write!(f, "undefined type `{name}`"),
            TypeError::NotAFunction { ty, .. } => write!(f, "`{ty}` is not a function"),
            TypeError::DuplicateField { name, .. } => {
                write!(f, "duplicate record field `{name}`")
            }
            TypeError::MissingField { field, record, .. } => {
                write!(f, "missing field `{field}` on `{record}`")
            }
        }
    }
}
