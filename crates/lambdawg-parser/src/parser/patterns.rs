//! Pattern parsing for Lambdawg.
//!
//! Patterns appear in function parameters, `let` destructuring inside do
//! blocks, and match arms: identifiers, literals, wildcard, lists with an
//! optional rest, records, constructors, and bare rests.

use lambdawg_common::diagnostic::codes;
use lambdawg_common::token::{LiteralValue, TokenKind};

use crate::ast::{Pattern, PatternKind, PatternLiteral, RecordFieldPattern, RestPattern};

use super::Parser;

/// Parse one pattern. Returns `None` (after recording P008) when the
/// current token cannot start a pattern, so speculative callers can rewind.
pub(crate) fn pattern(p: &mut Parser) -> Option<Pattern> {
    let start = p.span();

    match p.kind() {
        TokenKind::Ident => {
            let tok = p.advance();
            Some(Pattern {
                span: tok.span,
                kind: PatternKind::Identifier(tok.text),
            })
        }

        TokenKind::Underscore => {
            let tok = p.advance();
            Some(Pattern {
                span: tok.span,
                kind: PatternKind::Wildcard,
            })
        }

        TokenKind::Int => {
            let tok = p.advance();
            let value = match tok.value {
                Some(LiteralValue::Int(v)) => v,
                _ => 0,
            };
            Some(Pattern {
                span: tok.span,
                kind: PatternKind::Literal(PatternLiteral::Int(value)),
            })
        }
        TokenKind::Float => {
            let tok = p.advance();
            let value = match tok.value {
                Some(LiteralValue::Float(v)) => v,
                _ => 0.0,
            };
            Some(Pattern {
                span: tok.span,
                kind: PatternKind::Literal(PatternLiteral::Float(value)),
            })
        }
        TokenKind::Str => {
            let tok = p.advance();
            let value = match tok.value {
                Some(LiteralValue::Str(s)) => s,
                _ => String::new(),
            };
            Some(Pattern {
                span: tok.span,
                kind: PatternKind::Literal(PatternLiteral::Str(value)),
            })
        }
        TokenKind::Char => {
            let tok = p.advance();
            let value = match tok.value {
                Some(LiteralValue::Char(c)) => c,
                _ => '\0',
            };
            Some(Pattern {
                span: tok.span,
                kind: PatternKind::Literal(PatternLiteral::Char(value)),
            })
        }
        TokenKind::True | TokenKind::False => {
            let tok = p.advance();
            Some(Pattern {
                span: tok.span,
                kind: PatternKind::Literal(PatternLiteral::Bool(tok.kind == TokenKind::True)),
            })
        }

        // Constructor: `Name`, `Name { fields }`, or `Name(pattern)`.
        TokenKind::TypeIdent => {
            let tok = p.advance();
            let mut span = tok.span;
            let arg = if p.at(TokenKind::LBrace) {
                let record = record_pattern(p)?;
                span = span.merge(record.span);
                Some(Box::new(record))
            } else if p.at(TokenKind::LParen) {
                let open = p.span();
                p.advance(); // (
                let inner = pattern(p)?;
                let end = p.span();
                p.expect_closing(TokenKind::RParen, open);
                span = span.merge(end);
                Some(Box::new(inner))
            } else {
                None
            };
            Some(Pattern {
                span,
                kind: PatternKind::Constructor {
                    name: tok.text,
                    arg,
                },
            })
        }

        // List: `[p1, p2, ...rest?]`. The rest must come last.
        TokenKind::LBracket => {
            let open = p.span();
            p.advance(); // [
            let mut elements = Vec::new();
            let mut rest = None;
            while !p.at(TokenKind::RBracket) && !p.at_eof() {
                if p.at(TokenKind::DotDotDot) {
                    let r = rest_pattern(p);
                    if rest.is_some() || !p.at(TokenKind::RBracket) {
                        p.error(
                            codes::INVALID_PATTERN,
                            "a list pattern takes a single trailing rest",
                            r.span,
                        );
                    }
                    rest = Some(r);
                } else {
                    elements.push(pattern(p)?);
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = p.span();
            p.expect_closing(TokenKind::RBracket, open);
            Some(Pattern {
                span: start.merge(end),
                kind: PatternKind::List { elements, rest },
            })
        }

        TokenKind::LBrace => record_pattern(p),

        // Bare rest: `...name?`.
        TokenKind::DotDotDot => {
            let r = rest_pattern(p);
            Some(Pattern {
                span: r.span,
                kind: PatternKind::Rest(r),
            })
        }

        _ => {
            let span = p.span();
            p.error(
                codes::INVALID_PATTERN,
                format!("invalid pattern: {}", p.kind().describe()),
                span,
            );
            None
        }
    }
}

/// `{field[: pattern], ..., ...?}` — a field without a sub-pattern binds
/// under its own name; a trailing `...` tolerates remaining fields.
fn record_pattern(p: &mut Parser) -> Option<Pattern> {
    let open = p.span();
    p.advance(); // {

    let mut fields = Vec::new();
    let mut rest = false;
    while !p.at(TokenKind::RBrace) && !p.at_eof() {
        if p.at(TokenKind::DotDotDot) {
            p.advance();
            rest = true;
        } else {
            let Some((name, name_span)) = p.expect_ident() else {
                break;
            };
            let sub = if p.eat(TokenKind::Colon) {
                pattern(p)
            } else {
                None
            };
            let span = sub
                .as_ref()
                .map(|s| name_span.merge(s.span))
                .unwrap_or(name_span);
            fields.push(RecordFieldPattern {
                name,
                pattern: sub,
                span,
            });
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }

    let end = p.span();
    p.expect_closing(TokenKind::RBrace, open);
    Some(Pattern {
        span: open.merge(end),
        kind: PatternKind::Record { fields, rest },
    })
}

/// `...` with an optional capture name.
fn rest_pattern(p: &mut Parser) -> RestPattern {
    let start = p.span();
    p.advance(); // ...
    if p.at(TokenKind::Ident) {
        let tok = p.advance();
        RestPattern {
            name: Some(tok.text),
            span: start.merge(tok.span),
        }
    } else {
        RestPattern {
            name: None,
            span: start,
        }
    }
}
