//! Lambdawg parser: recursive descent with a Pratt expression engine.
//!
//! This crate transforms the token stream from `lambdawg-lexer` into the
//! plain AST defined in [`ast`]. Parsing recovers from errors by
//! resynchronizing at statement boundaries, so the returned program
//! contains everything that could be salvaged alongside the diagnostics.

pub mod ast;
mod parser;

use lambdawg_common::diagnostic::Diagnostic;
use lambdawg_common::token::{Token, TokenKind};

use ast::Program;

/// Result of parsing a Lambdawg token stream.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Whether parsing completed without errors.
    pub fn ok(&self) -> bool {
        self.diagnostics.iter().all(|d| !d.is_error())
    }
}

/// Parse a token stream into a [`Program`]. The stream is normally
/// `Eof`-terminated by the lexer; a missing sentinel is appended rather
/// than trusted.
pub fn parse(mut tokens: Vec<Token>) -> ParseResult {
    if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        tokens.push(Token::new(TokenKind::Eof, "", end, end));
    }
    let mut p = parser::Parser::new(tokens);
    let program = parser::items::program(&mut p);
    ParseResult {
        program,
        diagnostics: p.diagnostics,
    }
}

/// Convenience for tests and tools: lex and parse in one step. Lexer
/// diagnostics are prepended to the parser's.
pub fn parse_source(source: &str) -> ParseResult {
    let lexed = lambdawg_lexer::lex(source);
    let mut result = parse(lexed.tokens);
    let mut diagnostics = lexed.diagnostics;
    diagnostics.append(&mut result.diagnostics);
    result.diagnostics = diagnostics;
    result
}
