//! Recursive-descent parser for Lambdawg.
//!
//! The parser consumes the lexer's token vector and builds the plain AST
//! in [`crate::ast`]. Expression parsing uses a Pratt binding-power loop
//! (see [`expressions`]); declarations and statements are straight
//! recursive descent (see [`items`]).
//!
//! # Error Recovery
//!
//! On a parse error the parser records a diagnostic and calls
//! [`Parser::synchronize`], which advances until a closing brace or the
//! start of a declaration keyword. Parsing continues; the returned program
//! contains everything successfully recovered.
//!
//! # Rewind
//!
//! Function-literal disambiguation needs speculative parsing: after `(`,
//! the parser attempts a parameter list followed by `) =>` and rewinds to
//! the saved cursor on failure. [`Parser::save`] / [`Parser::restore`]
//! capture and restore the token position, diagnostic count, and node-id
//! counter so an abandoned attempt leaves no trace.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod patterns;
pub(crate) mod types;

use lambdawg_common::diagnostic::{codes, Diagnostic};
use lambdawg_common::span::Span;
use lambdawg_common::token::{Token, TokenKind};

use crate::ast::{Expr, ExprKind, NodeId};

/// A saved parser state for speculative parsing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    pos: usize,
    diagnostics_len: usize,
    next_id: NodeId,
}

/// Token-stream parser state.
pub(crate) struct Parser {
    /// All tokens from the lexer, terminated by `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Next expression node id to allocate.
    next_id: NodeId,
    /// Collected parse diagnostics, in production order.
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(
            tokens.last().map(|t| t.kind) == Some(TokenKind::Eof),
            "token stream must be Eof-terminated"
        );
        Self {
            tokens,
            pos: 0,
            next_id: 0,
            diagnostics: Vec::new(),
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// The current token index, used by callers to check for progress.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// The current token. Clamped to the trailing `Eof`.
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// The kind of the current token.
    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    /// The kind of the token `n` positions ahead.
    pub(crate) fn nth_kind(&self, n: usize) -> TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    /// The span of the current token.
    pub(crate) fn span(&self) -> Span {
        self.current().span
    }

    /// Whether the current token matches the given kind.
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Whether the current token matches any of the given kinds.
    pub(crate) fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind())
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// Consume and return the current token. Does not advance past `Eof`.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches; return whether it did.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or record a P001 diagnostic.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            return Some(self.advance());
        }
        self.error(
            codes::UNEXPECTED_TOKEN,
            format!(
                "expected {}, found {}",
                kind.describe(),
                self.kind().describe()
            ),
            self.span(),
        );
        None
    }

    /// Consume a closing delimiter or record the matching unclosed-delimiter
    /// diagnostic (P005/P006/P007) pointing at the opening token.
    pub(crate) fn expect_closing(&mut self, kind: TokenKind, open_span: Span) -> bool {
        if self.eat(kind) {
            return true;
        }
        let (code, what) = match kind {
            TokenKind::RParen => (codes::UNCLOSED_PAREN, "parenthesis"),
            TokenKind::RBrace => (codes::UNCLOSED_BRACE, "brace"),
            TokenKind::RBracket => (codes::UNCLOSED_BRACKET, "bracket"),
            _ => unreachable!("expect_closing only handles closing delimiters"),
        };
        self.error(code, format!("unclosed {what}"), open_span);
        false
    }

    /// Consume an identifier and return its text, or record P003.
    pub(crate) fn expect_ident(&mut self) -> Option<(String, Span)> {
        if self.at(TokenKind::Ident) {
            let tok = self.advance();
            return Some((tok.text, tok.span));
        }
        self.error(
            codes::EXPECTED_IDENT,
            format!("expected identifier, found {}", self.kind().describe()),
            self.span(),
        );
        None
    }

    // ── Diagnostics and recovery ───────────────────────────────────────

    pub(crate) fn error(&mut self, code: &'static str, message: impl Into<String>, span: Span) {
        self.diagnostics
            .push(Diagnostic::error(code, message, span));
    }

    /// Skip ahead to a statement boundary: a closing brace or the start of
    /// a declaration keyword. Always makes progress.
    pub(crate) fn synchronize(&mut self) {
        self.advance();
        while !self.at_eof() {
            if self.at_any(&[
                TokenKind::RBrace,
                TokenKind::Let,
                TokenKind::Private,
                TokenKind::Type,
                TokenKind::Module,
                TokenKind::Import,
            ]) {
                return;
            }
            self.advance();
        }
    }

    // ── Speculation ────────────────────────────────────────────────────

    /// Capture the current state for a speculative parse.
    pub(crate) fn save(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            diagnostics_len: self.diagnostics.len(),
            next_id: self.next_id,
        }
    }

    /// Rewind to a checkpoint, discarding any tokens consumed, diagnostics
    /// recorded, and node ids allocated since.
    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.diagnostics.truncate(checkpoint.diagnostics_len);
        self.next_id = checkpoint.next_id;
    }

    // ── Node construction ──────────────────────────────────────────────

    /// Allocate an expression node with a fresh id.
    pub(crate) fn mk_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = self.next_id;
        self.next_id += 1;
        Expr { id, span, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdawg_lexer::lex;

    fn parser_for(source: &str) -> Parser {
        Parser::new(lex(source).tokens)
    }

    #[test]
    fn advance_stops_at_eof() {
        let mut p = parser_for("let");
        assert_eq!(p.advance().kind, TokenKind::Let);
        assert_eq!(p.advance().kind, TokenKind::Eof);
        assert_eq!(p.advance().kind, TokenKind::Eof);
    }

    #[test]
    fn save_restore_discards_diagnostics() {
        let mut p = parser_for("let x");
        let cp = p.save();
        p.advance();
        p.error(codes::UNEXPECTED_TOKEN, "speculative", p.span());
        assert_eq!(p.diagnostics.len(), 1);
        p.restore(cp);
        assert_eq!(p.diagnostics.len(), 0);
        assert_eq!(p.kind(), TokenKind::Let);
    }

    #[test]
    fn synchronize_stops_at_declaration() {
        let mut p = parser_for("@ @ @ let x = 1");
        p.synchronize();
        assert_eq!(p.kind(), TokenKind::Let);
    }

    #[test]
    fn expr_ids_are_dense() {
        let mut p = parser_for("");
        let a = p.mk_expr(ExprKind::Placeholder, Span::new(0, 0));
        let b = p.mk_expr(ExprKind::Placeholder, Span::new(0, 0));
        assert_eq!(a.id + 1, b.id);
    }
}
