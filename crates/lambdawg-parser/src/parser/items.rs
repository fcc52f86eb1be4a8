//! Declaration and statement parsing for Lambdawg.
//!
//! Covers the top level (module declarations, statements), `let`
//! statements with ambient lists and annotations, `type` definitions
//! (sum types and aliases), and imports.

use lambdawg_common::diagnostic::codes;
use lambdawg_common::token::TokenKind;

use crate::ast::{
    AmbientParam, FieldType, Import, ImportItem, ImportItems, LetStatement, Module, Program,
    Statement, TypeDef, TypeDefBody, Variant,
};

use super::{expressions, types, Parser};

/// Parse a whole program: module declarations and top-level statements
/// in source order, resynchronizing after errors.
pub(crate) fn program(p: &mut Parser) -> Program {
    let mut modules = Vec::new();
    let mut statements = Vec::new();

    while !p.at_eof() {
        let before = p.position();
        if p.at(TokenKind::Module) {
            if let Some(module) = module_decl(p) {
                modules.push(module);
                continue;
            }
        } else if let Some(stmt) = statement(p) {
            statements.push(stmt);
            continue;
        }
        // Nothing parsed; make sure we move forward before trying again.
        if p.position() == before {
            p.synchronize();
        }
    }

    Program {
        modules,
        statements,
    }
}

/// `module name { statements }`
fn module_decl(p: &mut Parser) -> Option<Module> {
    let start = p.span();
    p.advance(); // `module`

    let (name, _) = p.expect_ident()?;

    let open = p.span();
    p.expect(TokenKind::LBrace)?;

    let mut statements = Vec::new();
    while !p.at(TokenKind::RBrace) && !p.at_eof() {
        let before = p.position();
        if let Some(stmt) = statement(p) {
            statements.push(stmt);
        } else if p.position() == before {
            p.synchronize();
        }
    }
    let end = p.span();
    p.expect_closing(TokenKind::RBrace, open);

    Some(Module {
        name,
        statements,
        span: start.merge(end),
    })
}

/// Parse one statement, chosen by the leading keyword; anything else is an
/// expression statement.
pub(crate) fn statement(p: &mut Parser) -> Option<Statement> {
    match p.kind() {
        TokenKind::Let | TokenKind::Private => let_statement(p).map(Statement::Let),
        TokenKind::Type => type_def(p).map(Statement::TypeDef),
        TokenKind::Import => import_decl(p).map(Statement::Import),
        _ => {
            let expr = expressions::expr(p)?;
            // `x = e` at statement level is not a thing; catch it early.
            if p.at(TokenKind::Eq) {
                let span = p.span();
                p.error(
                    codes::INVALID_ASSIGNMENT,
                    "invalid assignment; bindings are introduced with `let`",
                    span,
                );
                p.advance();
                let _ = expressions::expr(p);
            }
            Some(Statement::Expression(expr))
        }
    }
}

/// `[private] let name [with a[: T], ...] [: T] = expr`
fn let_statement(p: &mut Parser) -> Option<LetStatement> {
    let start = p.span();
    let private = p.eat(TokenKind::Private);
    p.expect(TokenKind::Let)?;

    let (name, name_span) = p.expect_ident()?;

    let mut ambients = Vec::new();
    if p.eat(TokenKind::With) {
        loop {
            let Some((ambient_name, ambient_span)) = p.expect_ident() else {
                break;
            };
            let annotation = if p.eat(TokenKind::Colon) {
                types::type_expr(p)
            } else {
                None
            };
            ambients.push(AmbientParam {
                name: ambient_name,
                annotation,
                span: ambient_span,
            });
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    let annotation = if p.eat(TokenKind::Colon) {
        types::type_expr(p)
    } else {
        None
    };

    p.expect(TokenKind::Eq)?;
    let value = expressions::expr(p)?;

    let span = start.merge(value.span);
    Some(LetStatement {
        private,
        name,
        name_span,
        ambients,
        annotation,
        value,
        span,
    })
}

/// `type Name a b = Variant { ... } | Variant | ...` or `type Name = T`
fn type_def(p: &mut Parser) -> Option<TypeDef> {
    let start = p.span();
    p.advance(); // `type`

    let name = if p.at(TokenKind::TypeIdent) {
        p.advance().text
    } else {
        let span = p.span();
        p.error(
            codes::EXPECTED_IDENT,
            format!("expected type name, found {}", p.kind().describe()),
            span,
        );
        return None;
    };

    let mut params = Vec::new();
    while p.at(TokenKind::Ident) {
        params.push(p.advance().text);
    }

    p.expect(TokenKind::Eq)?;

    // A leading `|`, or a type-ident followed by `|` or a field record,
    // means a sum type; anything else is an alias.
    let leading_bar = p.eat(TokenKind::Bar);
    let is_sum = leading_bar
        || (p.at(TokenKind::TypeIdent)
            && matches!(p.nth_kind(1), TokenKind::Bar | TokenKind::LBrace));

    let body = if is_sum {
        let mut variants = Vec::new();
        loop {
            let Some(variant) = variant(p) else { break };
            variants.push(variant);
            if !p.eat(TokenKind::Bar) {
                break;
            }
        }
        if variants.is_empty() {
            return None;
        }
        TypeDefBody::Sum(variants)
    } else {
        TypeDefBody::Alias(types::type_expr(p)?)
    };

    let end_span = match &body {
        TypeDefBody::Sum(vs) => vs.last().map(|v| v.span).unwrap_or(start),
        TypeDefBody::Alias(t) => t.span,
    };

    Some(TypeDef {
        name,
        params,
        body,
        span: start.merge(end_span),
    })
}

/// One sum-type variant: `Name` or `Name { field: T, ... }`.
fn variant(p: &mut Parser) -> Option<Variant> {
    if !p.at(TokenKind::TypeIdent) {
        let span = p.span();
        p.error(
            codes::EXPECTED_IDENT,
            format!("expected variant name, found {}", p.kind().describe()),
            span,
        );
        return None;
    }
    let tok = p.advance();
    let mut span = tok.span;

    let fields = if p.at(TokenKind::LBrace) {
        let open = p.span();
        p.advance(); // `{`
        let mut fields = Vec::new();
        while !p.at(TokenKind::RBrace) && !p.at_eof() {
            let Some((field_name, _)) = p.expect_ident() else {
                break;
            };
            if p.expect(TokenKind::Colon).is_none() {
                break;
            }
            let Some(ty) = types::type_expr(p) else { break };
            fields.push(FieldType {
                name: field_name,
                ty,
            });
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = p.span();
        p.expect_closing(TokenKind::RBrace, open);
        span = span.merge(end);
        Some(fields)
    } else {
        None
    };

    Some(Variant {
        name: tok.text,
        fields,
        span,
    })
}

/// `import [js] name [{ * | a, b as c }]`
fn import_decl(p: &mut Parser) -> Option<Import> {
    let start = p.span();
    p.advance(); // `import`

    let js = p.eat(TokenKind::Js);

    let module = match p.kind() {
        TokenKind::Ident | TokenKind::TypeIdent => p.advance().text,
        _ => {
            let span = p.span();
            p.error(
                codes::EXPECTED_IDENT,
                format!("expected module name, found {}", p.kind().describe()),
                span,
            );
            return None;
        }
    };

    let mut span = start;
    let items = if p.at(TokenKind::LBrace) {
        let open = p.span();
        p.advance(); // `{`

        let items = if p.at(TokenKind::Star) {
            p.advance();
            ImportItems::All
        } else {
            let mut named = Vec::new();
            while !p.at(TokenKind::RBrace) && !p.at_eof() {
                let item_span = p.span();
                let name = match p.kind() {
                    TokenKind::Ident | TokenKind::TypeIdent => p.advance().text,
                    _ => {
                        let span = p.span();
                        p.error(
                            codes::EXPECTED_IDENT,
                            format!("expected import name, found {}", p.kind().describe()),
                            span,
                        );
                        break;
                    }
                };
                let alias = if p.eat(TokenKind::As) {
                    match p.kind() {
                        TokenKind::Ident | TokenKind::TypeIdent => Some(p.advance().text),
                        _ => {
                            let span = p.span();
                            p.error(
                                codes::EXPECTED_IDENT,
                                format!("expected alias name, found {}", p.kind().describe()),
                                span,
                            );
                            None
                        }
                    }
                } else {
                    None
                };
                named.push(ImportItem {
                    name,
                    alias,
                    span: item_span,
                });
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            ImportItems::Named(named)
        };

        let end = p.span();
        p.expect_closing(TokenKind::RBrace, open);
        span = span.merge(end);
        Some(items)
    } else {
        None
    };

    Some(Import {
        js,
        module,
        items,
        span,
    })
}
