//! The Lambdawg compiler driver.
//!
//! Sequences the pipeline (lexer, parser, type inference, emitter),
//! aggregates diagnostics across stages, and short-circuits at the first
//! stage that produced errors. Warnings never block emission. Every
//! diagnostic is annotated with the source text and filename before it is
//! returned. No panic escapes this API on any input.

pub mod render;

use lambdawg_common::diagnostic::Diagnostic;
use lambdawg_emit::EmitOptions;
use lambdawg_parser::ast::Program;

// Individual stage entry points, re-exported for callers that want the
// native artifacts.
pub use lambdawg_emit::emit;
pub use lambdawg_lexer::lex as tokenize;
pub use lambdawg_parser::parse;
pub use lambdawg_typeck::infer as type_check;

/// Options for [`compile`] and [`check`].
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Filename attached to diagnostics. Defaults to `<input>`.
    pub filename: Option<String>,
    /// Skip type inference (lex + parse + emit only).
    pub skip_type_check: bool,
    /// Options forwarded to the emitter.
    pub emit: EmitOptions,
}

/// The result record every driver entry point returns.
#[derive(Debug)]
pub struct CompileResult {
    /// False whenever any stage reported at least one error.
    pub success: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// The emitted JavaScript, present on successful [`compile`] runs.
    pub code: Option<String>,
    /// The parsed program, present once parsing ran.
    pub ast: Option<Program>,
}

/// Compile source text to JavaScript.
pub fn compile(source: &str, options: &CompileOptions) -> CompileResult {
    run(source, options, true)
}

/// Run all validation stages without emitting.
pub fn check(source: &str, options: &CompileOptions) -> CompileResult {
    run(source, options, false)
}

fn run(source: &str, options: &CompileOptions, emit_code: bool) -> CompileResult {
    let filename = options.filename.as_deref().unwrap_or("<input>");
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // ── Lex ────────────────────────────────────────────────────────────
    let lexed = lambdawg_lexer::lex(source);
    collect(lexed.diagnostics, source, filename, &mut errors, &mut warnings);
    if !errors.is_empty() {
        return failed(errors, warnings, None);
    }

    // ── Parse ──────────────────────────────────────────────────────────
    let parsed = lambdawg_parser::parse(lexed.tokens);
    collect(parsed.diagnostics, source, filename, &mut errors, &mut warnings);
    if !errors.is_empty() {
        return failed(errors, warnings, Some(parsed.program));
    }

    // ── Infer ──────────────────────────────────────────────────────────
    if !options.skip_type_check {
        let typeck = lambdawg_typeck::infer(&parsed.program);
        collect(typeck.diagnostics, source, filename, &mut errors, &mut warnings);
        if !errors.is_empty() {
            return failed(errors, warnings, Some(parsed.program));
        }
    }

    // ── Emit ───────────────────────────────────────────────────────────
    let code = emit_code.then(|| lambdawg_emit::emit(&parsed.program, &options.emit));

    CompileResult {
        success: true,
        errors,
        warnings,
        code,
        ast: Some(parsed.program),
    }
}

/// Attach source context and split a stage's diagnostics by severity.
fn collect(
    diagnostics: Vec<Diagnostic>,
    source: &str,
    filename: &str,
    errors: &mut Vec<Diagnostic>,
    warnings: &mut Vec<Diagnostic>,
) {
    for diag in diagnostics {
        let diag = diag.with_source(source, filename);
        if diag.is_error() {
            errors.push(diag);
        } else {
            warnings.push(diag);
        }
    }
}

fn failed(
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    ast: Option<Program>,
) -> CompileResult {
    CompileResult {
        success: false,
        errors,
        warnings,
        code: None,
        ast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_attaches_source_and_filename() {
        let options = CompileOptions {
            filename: Some("demo.ldawg".to_string()),
            ..Default::default()
        };
        let result = compile("let x = y", &options);
        assert!(!result.success);
        let diag = &result.errors[0];
        assert_eq!(diag.filename.as_deref(), Some("demo.ldawg"));
        assert_eq!(diag.source.as_deref(), Some("let x = y"));
    }

    #[test]
    fn check_produces_no_code() {
        let result = check("let x = 1", &CompileOptions::default());
        assert!(result.success);
        assert!(result.code.is_none());
        assert!(result.ast.is_some());
    }

    #[test]
    fn skip_type_check_bypasses_inference() {
        let options = CompileOptions {
            skip_type_check: true,
            ..Default::default()
        };
        // `y` is unbound, but inference never runs.
        let result = compile("let x = y", &options);
        assert!(result.success);
        assert!(result.code.is_some());
    }

    #[test]
    fn lex_errors_short_circuit_parsing() {
        let result = compile("\"unterminated", &CompileOptions::default());
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "L002");
        assert!(result.ast.is_none());
    }

    #[test]
    fn parse_errors_still_expose_recovered_ast() {
        let result = compile("let x = @ let y = 2", &CompileOptions::default());
        assert!(!result.success);
        assert!(result.ast.is_some());
        assert!(result.code.is_none());
    }
}
