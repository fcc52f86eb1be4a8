//! Type-expression parsing for Lambdawg annotations.
//!
//! Type expressions mirror the checker's types: named types (including
//! lowercase type variables), function types, record types, list types,
//! generic application by juxtaposition, and parenthesized types.

use lambdawg_common::diagnostic::codes;
use lambdawg_common::token::TokenKind;

use crate::ast::{FieldType, TypeExpr, TypeExprKind};

use super::Parser;

/// Parse a type expression, including `T -> R` function sugar on any
/// left-hand type.
pub(crate) fn type_expr(p: &mut Parser) -> Option<TypeExpr> {
    let first = type_app(p)?;

    if p.eat(TokenKind::Arrow) {
        let ret = type_expr(p)?;
        let span = first.span.merge(ret.span);
        return Some(TypeExpr {
            span,
            kind: TypeExprKind::Fun(vec![first], Box::new(ret)),
        });
    }

    Some(first)
}

/// Parse a type atom, plus juxtaposed arguments after an uppercase head:
/// `List Int`, `Result String e`.
fn type_app(p: &mut Parser) -> Option<TypeExpr> {
    if p.at(TokenKind::TypeIdent) {
        let tok = p.advance();
        let mut span = tok.span;
        let mut args = Vec::new();
        while starts_type_atom(p.kind()) {
            let arg = type_atom(p)?;
            span = span.merge(arg.span);
            args.push(arg);
        }
        let kind = if args.is_empty() {
            TypeExprKind::Named(tok.text)
        } else {
            TypeExprKind::App(tok.text, args)
        };
        return Some(TypeExpr { span, kind });
    }
    type_atom(p)
}

/// Whether a token can begin a type atom (used to end juxtaposition).
fn starts_type_atom(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::TypeIdent
            | TokenKind::Ident
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::LParen
    )
}

/// A single type atom: named, list, record, or parenthesized/function.
fn type_atom(p: &mut Parser) -> Option<TypeExpr> {
    let start = p.span();

    match p.kind() {
        TokenKind::TypeIdent | TokenKind::Ident => {
            let tok = p.advance();
            Some(TypeExpr {
                span: tok.span,
                kind: TypeExprKind::Named(tok.text),
            })
        }

        // `[T]`
        TokenKind::LBracket => {
            p.advance();
            let inner = type_expr(p)?;
            let end = p.span();
            p.expect_closing(TokenKind::RBracket, start);
            Some(TypeExpr {
                span: start.merge(end),
                kind: TypeExprKind::List(Box::new(inner)),
            })
        }

        // `{name: T, ...}`
        TokenKind::LBrace => {
            p.advance();
            let mut fields = Vec::new();
            while !p.at(TokenKind::RBrace) && !p.at_eof() {
                let Some((name, _)) = p.expect_ident() else {
                    break;
                };
                if p.expect(TokenKind::Colon).is_none() {
                    break;
                }
                let ty = type_expr(p)?;
                fields.push(FieldType { name, ty });
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = p.span();
            p.expect_closing(TokenKind::RBrace, start);
            Some(TypeExpr {
                span: start.merge(end),
                kind: TypeExprKind::Record(fields),
            })
        }

        // `(T)` or `(T1, T2) -> R` or `() -> R`
        TokenKind::LParen => {
            p.advance();
            let mut list = Vec::new();
            if !p.at(TokenKind::RParen) {
                loop {
                    let Some(ty) = type_expr(p) else { break };
                    list.push(ty);
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            let close = p.span();
            p.expect_closing(TokenKind::RParen, start);

            if p.eat(TokenKind::Arrow) {
                let ret = type_expr(p)?;
                let span = start.merge(ret.span);
                return Some(TypeExpr {
                    span,
                    kind: TypeExprKind::Fun(list, Box::new(ret)),
                });
            }

            match list.len() {
                1 => {
                    let inner = list.into_iter().next().unwrap();
                    Some(TypeExpr {
                        span: start.merge(close),
                        kind: TypeExprKind::Paren(Box::new(inner)),
                    })
                }
                _ => {
                    let span = start.merge(close);
                    p.error(
                        codes::EXPECTED_TYPE,
                        "expected `->` after a parameter type list",
                        span,
                    );
                    None
                }
            }
        }

        _ => {
            let span = p.span();
            p.error(
                codes::EXPECTED_TYPE,
                format!("expected type, found {}", p.kind().describe()),
                span,
            );
            None
        }
    }
}
